//! The module contains the `Wallet` struct and its persistence model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, LedgerError, MoneyMinor,
    util::{model_currency, parse_uuid},
};

/// A per-user monetary account.
///
/// Exactly one wallet exists per user identity; it is created lazily on first
/// access and never deleted. The balance is only ever mutated by appending a
/// ledger transaction, so `balance` always equals the signed sum of the
/// wallet's `completed` entries plus its in-flight `pending` reservations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Stable identifier, generated once and persisted.
    pub id: Uuid,
    /// Opaque external user identity; uniqueness is enforced by storage.
    pub user_id: String,
    pub balance: MoneyMinor,
    pub currency: Currency,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    /// Creates a fresh zero-balance wallet for a user.
    pub fn new(user_id: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            balance: MoneyMinor::ZERO,
            currency: Currency::default(),
            active: true,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub balance_minor: i64,
    pub currency: String,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            balance_minor: ActiveValue::Set(value.balance.minor()),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            active: ActiveValue::Set(value.active),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "wallet")?,
            user_id: model.user_id,
            balance: MoneyMinor::new(model.balance_minor),
            currency: model_currency(&model.currency)?,
            active: model.active,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wallet_starts_empty_and_active() {
        let wallet = Wallet::new("alice".to_string());

        assert_eq!(wallet.user_id, "alice");
        assert_eq!(wallet.balance, MoneyMinor::ZERO);
        assert_eq!(wallet.currency, Currency::Ngn);
        assert!(wallet.active);
    }

    #[test]
    fn wallet_round_trips_through_model() {
        let wallet = Wallet::new("bob".to_string());
        let active: ActiveModel = (&wallet).into();
        let model = Model {
            id: match active.id {
                ActiveValue::Set(id) => id,
                _ => unreachable!(),
            },
            user_id: "bob".to_string(),
            balance_minor: 0,
            currency: "NGN".to_string(),
            active: true,
            created_at: wallet.created_at,
        };

        assert_eq!(Wallet::try_from(model).unwrap(), wallet);
    }
}
