use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger, Wallet, goals, group_members, groups, wallets};

use super::Engine;

impl Engine {
    pub(super) async fn find_wallet_by_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultLedger<Option<wallets::Model>> {
        wallets::Entity::find()
            .filter(wallets::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_wallet_by_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultLedger<wallets::Model> {
        self.find_wallet_by_user(db, user_id)
            .await?
            .ok_or_else(|| LedgerError::WalletNotFound(user_id.to_string()))
    }

    /// Fetches the user's wallet, creating a zero-balance one on first access.
    pub(super) async fn get_or_create_wallet_tx(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultLedger<wallets::Model> {
        if let Some(model) = self.find_wallet_by_user(db, user_id).await? {
            return Ok(model);
        }
        let wallet = Wallet::new(user_id.to_string());
        let model = wallets::ActiveModel::from(&wallet).insert(db).await?;
        Ok(model)
    }

    pub(super) async fn require_goal(
        &self,
        db: &DatabaseTransaction,
        goal_id: Uuid,
    ) -> ResultLedger<goals::Model> {
        goals::Entity::find_by_id(goal_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::GoalNotFound(goal_id.to_string()))
    }

    pub(super) async fn require_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultLedger<groups::Model> {
        groups::Entity::find_by_id(group_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| LedgerError::GroupNotFound(group_id.to_string()))
    }

    pub(super) async fn find_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultLedger<Option<group_members::Model>> {
        group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id.to_string()))
            .filter(group_members::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_active_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultLedger<group_members::Model> {
        let member = self
            .find_member(db, group_id, user_id)
            .await?
            .filter(|m| m.active)
            .ok_or_else(|| {
                LedgerError::NotAMember(format!("\"{user_id}\" is not in group {group_id}"))
            })?;
        Ok(member)
    }
}
