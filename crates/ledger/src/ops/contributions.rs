//! Applying contributions to goals and groups.
//!
//! A contribution is one transaction: debit the contributor's wallet, grow
//! the target's accumulated amount, check completion, write the audit
//! record. The inline release and the notification event run after the
//! commit so their failure can never roll back money movement.

use chrono::Utc;
use sea_orm::{
    ActiveValue::Set, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Contribution, ContributionStatus, Goal, Group, LedgerError, MoneyMinor, NotificationEvent,
    ResultLedger, TargetKind, TargetSnapshot, TargetStatus, TransactionKind, TransactionStatus,
    Wallet, contributions, goals, group_members, groups,
    transactions::TargetRef,
    util::model_currency,
};

use super::{Engine, EntrySpec, ReleaseOutcome, normalize_optional_text, with_tx};

/// Everything one contribution changed, in one return value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContributionReceipt {
    /// Contributor's wallet after the debit (and after the inline release,
    /// when the contributor is also the beneficiary).
    pub wallet: Wallet,
    pub contribution: Contribution,
    pub target: TargetSnapshot,
    /// Whether this contribution completed the target.
    pub completed: bool,
    /// Outcome of the inline release attempt; `None` while the target is
    /// still active, or when the attempt failed and is left to the sweep.
    pub release: Option<ReleaseOutcome>,
}

/// In-transaction result of an applied contribution.
type Applied = (Wallet, Contribution, TargetSnapshot, bool);

impl Engine {
    /// Moves `amount` from the user's wallet into a goal.
    ///
    /// Fails with `GoalAlreadyCompleted` / `GoalCancelled` on inactive goals
    /// and `InsufficientFunds` when the wallet cannot cover the amount; the
    /// insufficient-funds case still leaves a failed contribution record for
    /// the audit trail.
    pub async fn contribute_to_goal(
        &self,
        user_id: &str,
        goal_id: Uuid,
        amount: MoneyMinor,
        description: Option<&str>,
    ) -> ResultLedger<ContributionReceipt> {
        self.apply_goal_contribution(user_id, goal_id, amount, description, false)
            .await
    }

    /// Moves `amount` from the user's wallet into a group target.
    ///
    /// Same shape as [`contribute_to_goal`](Engine::contribute_to_goal), plus
    /// an active-membership requirement and the member's running total.
    pub async fn contribute_to_group(
        &self,
        user_id: &str,
        group_id: Uuid,
        amount: MoneyMinor,
        description: Option<&str>,
    ) -> ResultLedger<ContributionReceipt> {
        let outcome = with_tx!(self, |db_tx| {
            self.contribute_group_tx(&db_tx, user_id, group_id, amount, description)
                .await
        });
        self.settle_contribution(user_id, TargetKind::Group, group_id, amount, outcome)
            .await
    }

    /// The recurring path: applies a contribution and advances the goal's
    /// schedule bookkeeping in the same transaction.
    ///
    /// `amount` falls back to the schedule's configured amount;
    /// `InvalidSchedule` when neither is present. A goal without a schedule
    /// just applies the contribution and leaves the schedule columns alone.
    pub async fn contribute_to_goal_schedule(
        &self,
        user_id: &str,
        goal_id: Uuid,
        amount: Option<MoneyMinor>,
    ) -> ResultLedger<ContributionReceipt> {
        let goal = self.goal(goal_id).await?;
        let amount = match amount.or_else(|| goal.schedule.as_ref().and_then(|s| s.amount)) {
            Some(amount) => amount,
            None => {
                return Err(LedgerError::InvalidSchedule(
                    "schedule has no configured amount".to_string(),
                ));
            }
        };
        self.apply_goal_contribution(user_id, goal_id, amount, None, true)
            .await
    }

    /// Audit read: the user's contribution records, newest first.
    pub async fn list_contributions_for_user(
        &self,
        user_id: &str,
    ) -> ResultLedger<Vec<Contribution>> {
        with_tx!(self, |db_tx| {
            let rows = contributions::Entity::find()
                .filter(contributions::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(contributions::Column::OccurredAt)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(Contribution::try_from).collect()
        })
    }

    /// Audit read: every contribution recorded against one goal or group.
    pub async fn list_contributions_for_target(
        &self,
        kind: TargetKind,
        target_id: Uuid,
    ) -> ResultLedger<Vec<Contribution>> {
        with_tx!(self, |db_tx| {
            let rows = contributions::Entity::find()
                .filter(contributions::Column::TargetKind.eq(kind.as_str()))
                .filter(contributions::Column::TargetId.eq(target_id.to_string()))
                .order_by_desc(contributions::Column::OccurredAt)
                .all(&db_tx)
                .await?;
            rows.into_iter().map(Contribution::try_from).collect()
        })
    }

    async fn apply_goal_contribution(
        &self,
        user_id: &str,
        goal_id: Uuid,
        amount: MoneyMinor,
        description: Option<&str>,
        advance_schedule: bool,
    ) -> ResultLedger<ContributionReceipt> {
        let outcome = with_tx!(self, |db_tx| {
            let applied = self
                .contribute_goal_tx(&db_tx, user_id, goal_id, amount, description)
                .await;
            if advance_schedule && applied.is_ok() {
                self.advance_goal_schedule_tx(&db_tx, goal_id).await?;
            }
            applied
        });
        self.settle_contribution(user_id, TargetKind::Goal, goal_id, amount, outcome)
            .await
    }

    async fn contribute_goal_tx(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        goal_id: Uuid,
        amount: MoneyMinor,
        description: Option<&str>,
    ) -> ResultLedger<Applied> {
        let goal = Goal::try_from(self.require_goal(db_tx, goal_id).await?)?;
        match goal.status {
            TargetStatus::Completed => return Err(LedgerError::GoalAlreadyCompleted(goal.name)),
            TargetStatus::Cancelled => return Err(LedgerError::GoalCancelled(goal.name)),
            TargetStatus::Active => {}
        }

        let description = normalize_optional_text(description)
            .unwrap_or_else(|| format!("contribution to \u{201c}{}\u{201d}", goal.name));
        let spec = EntrySpec::new(TransactionKind::Contribution, amount, &description)
            .target(TargetRef::new(TargetKind::Goal, goal_id));
        let (wallet, _) = self
            .debit_entry_tx(db_tx, user_id, spec, TransactionStatus::Completed)
            .await?;

        goals::Entity::update_many()
            .col_expr(
                goals::Column::CurrentMinor,
                Expr::col(goals::Column::CurrentMinor).add(amount.minor()),
            )
            .filter(goals::Column::Id.eq(goal_id.to_string()))
            .exec(db_tx)
            .await?;
        let completed = self.flip_goal_completed_tx(db_tx, goal_id).await?;

        let record = Contribution::new(
            user_id.to_string(),
            TargetRef::new(TargetKind::Goal, goal_id),
            goal.name.clone(),
            amount,
            goal.currency,
            ContributionStatus::Completed,
        );
        contributions::ActiveModel::from(&record).insert(db_tx).await?;

        let refreshed = Goal::try_from(self.require_goal(db_tx, goal_id).await?)?;
        Ok((
            Wallet::try_from(wallet)?,
            record,
            TargetSnapshot::of(&refreshed),
            completed,
        ))
    }

    async fn contribute_group_tx(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        group_id: Uuid,
        amount: MoneyMinor,
        description: Option<&str>,
    ) -> ResultLedger<Applied> {
        let group = Group::try_from(self.require_group(db_tx, group_id).await?)?;
        match group.status {
            TargetStatus::Completed => return Err(LedgerError::GroupAlreadyCompleted(group.name)),
            TargetStatus::Cancelled => return Err(LedgerError::GroupCancelled(group.name)),
            TargetStatus::Active => {}
        }
        let member = self.require_active_member(db_tx, group_id, user_id).await?;

        let description = normalize_optional_text(description)
            .unwrap_or_else(|| format!("contribution to \u{201c}{}\u{201d}", group.name));
        let spec = EntrySpec::new(TransactionKind::Contribution, amount, &description)
            .target(TargetRef::new(TargetKind::Group, group_id));
        let (wallet, _) = self
            .debit_entry_tx(db_tx, user_id, spec, TransactionStatus::Completed)
            .await?;

        groups::Entity::update_many()
            .col_expr(
                groups::Column::CurrentMinor,
                Expr::col(groups::Column::CurrentMinor).add(amount.minor()),
            )
            .filter(groups::Column::Id.eq(group_id.to_string()))
            .exec(db_tx)
            .await?;
        group_members::Entity::update_many()
            .col_expr(
                group_members::Column::TotalContributedMinor,
                Expr::col(group_members::Column::TotalContributedMinor).add(amount.minor()),
            )
            .filter(group_members::Column::Id.eq(member.id))
            .exec(db_tx)
            .await?;
        let completed = self.flip_group_completed_tx(db_tx, group_id).await?;

        let record = Contribution::new(
            user_id.to_string(),
            TargetRef::new(TargetKind::Group, group_id),
            group.name.clone(),
            amount,
            group.currency,
            ContributionStatus::Completed,
        );
        contributions::ActiveModel::from(&record).insert(db_tx).await?;

        let refreshed = Group::try_from(self.require_group(db_tx, group_id).await?)?;
        Ok((
            Wallet::try_from(wallet)?,
            record,
            TargetSnapshot::of(&refreshed),
            completed,
        ))
    }

    /// Post-commit half of a contribution: inline release, wallet refresh,
    /// notification, failure audit record.
    async fn settle_contribution(
        &self,
        user_id: &str,
        kind: TargetKind,
        target_id: Uuid,
        amount: MoneyMinor,
        outcome: ResultLedger<Applied>,
    ) -> ResultLedger<ContributionReceipt> {
        let (wallet, contribution, snapshot, completed) = match outcome {
            Ok(applied) => applied,
            Err(err) => {
                if matches!(err, LedgerError::InsufficientFunds(_)) {
                    self.record_failed_contribution(user_id, kind, target_id, amount)
                        .await;
                }
                return Err(err);
            }
        };

        let release = if completed {
            let attempt = match kind {
                TargetKind::Goal => self.release_goal_funds(target_id).await,
                TargetKind::Group => self.release_group_funds(target_id).await,
            };
            match attempt {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    tracing::warn!(
                        target_id = %target_id,
                        error = %err,
                        "inline release failed; the reconciliation sweep will retry"
                    );
                    None
                }
            }
        } else {
            None
        };

        // A payout changes the beneficiary's wallet and the target's flags;
        // re-read both so the receipt reflects the released state.
        let (wallet, snapshot) = if matches!(release, Some(ReleaseOutcome::Released { .. })) {
            let wallet = self.wallet(user_id).await?;
            let snapshot = match kind {
                TargetKind::Goal => TargetSnapshot::of(&self.goal(target_id).await?),
                TargetKind::Group => TargetSnapshot::of(&self.group(target_id).await?),
            };
            (wallet, snapshot)
        } else {
            (wallet, snapshot)
        };

        self.notify(NotificationEvent::contribution(
            user_id,
            &snapshot.name,
            amount,
            &contribution.reference,
        ));

        Ok(ContributionReceipt {
            wallet,
            contribution,
            target: snapshot,
            completed,
            release,
        })
    }

    async fn advance_goal_schedule_tx(
        &self,
        db_tx: &DatabaseTransaction,
        goal_id: Uuid,
    ) -> ResultLedger<()> {
        let goal = Goal::try_from(self.require_goal(db_tx, goal_id).await?)?;
        let Some(schedule) = goal.schedule else {
            return Ok(());
        };
        let now = Utc::now();
        goals::ActiveModel {
            id: Set(goal_id.to_string()),
            schedule_last_contribution_at: Set(Some(now)),
            schedule_next_due_at: Set(schedule.advanced_due_date(now)),
            ..Default::default()
        }
        .update(db_tx)
        .await?;
        Ok(())
    }

    /// Best-effort audit record for a contribution the wallet could not
    /// cover. Runs in its own transaction after the failed one rolled back.
    async fn record_failed_contribution(
        &self,
        user_id: &str,
        kind: TargetKind,
        target_id: Uuid,
        amount: MoneyMinor,
    ) {
        if let Err(err) = self
            .try_record_failed_contribution(user_id, kind, target_id, amount)
            .await
        {
            tracing::warn!(
                target_id = %target_id,
                error = %err,
                "could not record failed contribution"
            );
        }
    }

    async fn try_record_failed_contribution(
        &self,
        user_id: &str,
        kind: TargetKind,
        target_id: Uuid,
        amount: MoneyMinor,
    ) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            let (name, currency) = match kind {
                TargetKind::Goal => {
                    let model = self.require_goal(&db_tx, target_id).await?;
                    (model.name, model_currency(&model.currency)?)
                }
                TargetKind::Group => {
                    let model = self.require_group(&db_tx, target_id).await?;
                    (model.name, model_currency(&model.currency)?)
                }
            };
            let record = Contribution::new(
                user_id.to_string(),
                TargetRef::new(kind, target_id),
                name,
                amount,
                currency,
                ContributionStatus::Failed,
            );
            contributions::ActiveModel::from(&record).insert(&db_tx).await?;
            Ok(())
        })
    }
}
