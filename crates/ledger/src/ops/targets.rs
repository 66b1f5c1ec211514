//! Goal and group lifecycle: creation, membership and completion checks.

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    ContributionSchedule, Goal, Group, GroupMember, GroupRole, LedgerError, MoneyMinor,
    ResultLedger, ScheduleFrequency, TargetStatus, goals, group_members, groups,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Creates a personal savings goal, optionally with a recurring schedule.
    pub async fn create_goal(
        &self,
        user_id: &str,
        name: &str,
        target: MoneyMinor,
        schedule: Option<ContributionSchedule>,
    ) -> ResultLedger<Goal> {
        let name = normalize_required_name(name, "goal name")?;
        if let Some(schedule) = &schedule
            && schedule.frequency == ScheduleFrequency::Custom
            && schedule.custom_dates.is_empty()
        {
            return Err(LedgerError::InvalidSchedule(
                "custom schedule needs at least one date".to_string(),
            ));
        }
        let goal = Goal::new(user_id.to_string(), name, target, schedule)?;
        with_tx!(self, |db_tx| {
            let model = goal.to_active_model()?.insert(&db_tx).await?;
            Goal::try_from(model)
        })
    }

    pub async fn goal(&self, goal_id: Uuid) -> ResultLedger<Goal> {
        with_tx!(self, |db_tx| {
            let model = self.require_goal(&db_tx, goal_id).await?;
            Goal::try_from(model)
        })
    }

    /// Lists the user's goals, newest first.
    pub async fn list_goals_for_user(&self, user_id: &str) -> ResultLedger<Vec<Goal>> {
        with_tx!(self, |db_tx| {
            let rows = goals::Entity::find()
                .filter(goals::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(goals::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(Goal::try_from).collect()
        })
    }

    /// Creates a shared savings group.
    ///
    /// The creator becomes the owning member; `member_ids` are enrolled as
    /// plain members, duplicates and the creator's own id ignored.
    pub async fn create_group(
        &self,
        created_by: &str,
        name: &str,
        target: MoneyMinor,
        member_ids: &[String],
    ) -> ResultLedger<Group> {
        let name = normalize_required_name(name, "group name")?;
        let group = Group::new(created_by.to_string(), name, target)?;
        with_tx!(self, |db_tx| {
            let model = groups::ActiveModel::from(&group).insert(&db_tx).await?;

            let owner = GroupMember::new(group.id, created_by.to_string(), GroupRole::Owner);
            group_members::ActiveModel::from(&owner).insert(&db_tx).await?;

            let mut enrolled = vec![created_by.to_string()];
            for user_id in member_ids {
                if enrolled.contains(user_id) {
                    continue;
                }
                enrolled.push(user_id.clone());
                let member = GroupMember::new(group.id, user_id.clone(), GroupRole::Member);
                group_members::ActiveModel::from(&member).insert(&db_tx).await?;
            }

            Group::try_from(model)
        })
    }

    pub async fn group(&self, group_id: Uuid) -> ResultLedger<Group> {
        with_tx!(self, |db_tx| {
            let model = self.require_group(&db_tx, group_id).await?;
            Group::try_from(model)
        })
    }

    /// Enrols a user into a group, reactivating a previous membership if one
    /// exists. Joining an already-joined group is a no-op.
    pub async fn join_group(&self, group_id: Uuid, user_id: &str) -> ResultLedger<GroupMember> {
        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, group_id).await?;
            match TargetStatus::try_from(group.status.as_str())? {
                TargetStatus::Cancelled => Err(LedgerError::GroupCancelled(group.name)),
                TargetStatus::Completed => Err(LedgerError::GroupAlreadyCompleted(group.name)),
                TargetStatus::Active => {
                    let model = match self.find_member(&db_tx, group_id, user_id).await? {
                        Some(existing) if existing.active => existing,
                        Some(existing) => {
                            group_members::ActiveModel {
                                id: Set(existing.id),
                                active: Set(true),
                                ..Default::default()
                            }
                            .update(&db_tx)
                            .await?
                        }
                        None => {
                            let member =
                                GroupMember::new(group_id, user_id.to_string(), GroupRole::Member);
                            group_members::ActiveModel::from(&member).insert(&db_tx).await?
                        }
                    };
                    GroupMember::try_from(model)
                }
            }
        })
    }

    /// Lists a group's members in join order, inactive ones included.
    pub async fn group_members(&self, group_id: Uuid) -> ResultLedger<Vec<GroupMember>> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            let rows = group_members::Entity::find()
                .filter(group_members::Column::GroupId.eq(group_id.to_string()))
                .order_by_asc(group_members::Column::JoinedAt)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(GroupMember::try_from).collect()
        })
    }

    /// Re-checks a goal against its target and flips it to completed when the
    /// accumulated amount is there. Returns whether the flip happened.
    pub async fn check_goal_completion(&self, goal_id: Uuid) -> ResultLedger<bool> {
        with_tx!(self, |db_tx| {
            self.require_goal(&db_tx, goal_id).await?;
            self.flip_goal_completed_tx(&db_tx, goal_id).await
        })
    }

    /// The group flavour of [`check_goal_completion`](Engine::check_goal_completion).
    pub async fn check_group_completion(&self, group_id: Uuid) -> ResultLedger<bool> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            self.flip_group_completed_tx(&db_tx, group_id).await
        })
    }

    /// Conditional `active -> completed` flip; the amount comparison happens
    /// in SQL so concurrent contributions cannot complete a target twice.
    pub(super) async fn flip_goal_completed_tx(
        &self,
        db_tx: &DatabaseTransaction,
        goal_id: Uuid,
    ) -> ResultLedger<bool> {
        let result = goals::Entity::update_many()
            .col_expr(
                goals::Column::Status,
                Expr::value(TargetStatus::Completed.as_str()),
            )
            .col_expr(goals::Column::CompletedAt, Expr::value(Utc::now()))
            .filter(goals::Column::Id.eq(goal_id.to_string()))
            .filter(goals::Column::Status.eq(TargetStatus::Active.as_str()))
            .filter(
                Expr::col(goals::Column::CurrentMinor).gte(Expr::col(goals::Column::TargetMinor)),
            )
            .exec(db_tx)
            .await?;
        Ok(result.rows_affected == 1)
    }

    pub(super) async fn flip_group_completed_tx(
        &self,
        db_tx: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultLedger<bool> {
        let result = groups::Entity::update_many()
            .col_expr(
                groups::Column::Status,
                Expr::value(TargetStatus::Completed.as_str()),
            )
            .col_expr(groups::Column::CompletedAt, Expr::value(Utc::now()))
            .filter(groups::Column::Id.eq(group_id.to_string()))
            .filter(groups::Column::Status.eq(TargetStatus::Active.as_str()))
            .filter(
                Expr::col(groups::Column::CurrentMinor).gte(Expr::col(groups::Column::TargetMinor)),
            )
            .exec(db_tx)
            .await?;
        Ok(result.rows_affected == 1)
    }
}
