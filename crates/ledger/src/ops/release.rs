//! Exactly-once payout of completed targets.

use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Goal, Group, MoneyMinor, ResultLedger, TargetKind, TargetStatus, TransactionKind,
    fundable::{ReleasePrecheck, release_precheck},
    goals, groups,
    transactions::TargetRef,
};

use super::{Engine, EntrySpec, with_tx};

/// What a release attempt did.
///
/// `NotReady` and `AlreadyReleased` are ordinary outcomes, not errors; the
/// inline contribution path, the sweep and the manual trigger all race for
/// the same claim and only one of them can win it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReleaseOutcome {
    Released { amount: MoneyMinor },
    NotReady,
    AlreadyReleased,
}

impl Engine {
    /// Pays a completed goal's accumulated funds into the owner's wallet.
    pub async fn release_goal_funds(&self, goal_id: Uuid) -> ResultLedger<ReleaseOutcome> {
        with_tx!(self, |db_tx| {
            self.release_goal_funds_tx(&db_tx, goal_id).await
        })
    }

    /// Pays a completed group's accumulated funds into the creator's wallet.
    pub async fn release_group_funds(&self, group_id: Uuid) -> ResultLedger<ReleaseOutcome> {
        with_tx!(self, |db_tx| {
            self.release_group_funds_tx(&db_tx, group_id).await
        })
    }

    pub(super) async fn release_goal_funds_tx(
        &self,
        db_tx: &DatabaseTransaction,
        goal_id: Uuid,
    ) -> ResultLedger<ReleaseOutcome> {
        let goal = Goal::try_from(self.require_goal(db_tx, goal_id).await?)?;
        if let Some(precheck) = release_precheck(&goal) {
            return Ok(match precheck {
                ReleasePrecheck::NotReady => ReleaseOutcome::NotReady,
                ReleasePrecheck::AlreadyReleased => ReleaseOutcome::AlreadyReleased,
            });
        }

        // Conditional claim: the writer that flips the flag pays out, every
        // other racer sees zero rows and reports AlreadyReleased.
        let claim = goals::Entity::update_many()
            .col_expr(goals::Column::FundsReleased, Expr::value(true))
            .col_expr(goals::Column::FundsReleasedAt, Expr::value(Utc::now()))
            .filter(goals::Column::Id.eq(goal_id.to_string()))
            .filter(goals::Column::Status.eq(TargetStatus::Completed.as_str()))
            .filter(goals::Column::FundsReleased.eq(false))
            .exec(db_tx)
            .await?;
        if claim.rows_affected == 0 {
            return Ok(ReleaseOutcome::AlreadyReleased);
        }

        let spec = EntrySpec::new(
            TransactionKind::GoalRelease,
            goal.current,
            &format!("release of \u{201c}{}\u{201d}", goal.name),
        )
        .target(TargetRef::new(TargetKind::Goal, goal.id));
        self.credit_tx(db_tx, &goal.user_id, spec).await?;

        Ok(ReleaseOutcome::Released {
            amount: goal.current,
        })
    }

    pub(super) async fn release_group_funds_tx(
        &self,
        db_tx: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultLedger<ReleaseOutcome> {
        let group = Group::try_from(self.require_group(db_tx, group_id).await?)?;
        if let Some(precheck) = release_precheck(&group) {
            return Ok(match precheck {
                ReleasePrecheck::NotReady => ReleaseOutcome::NotReady,
                ReleasePrecheck::AlreadyReleased => ReleaseOutcome::AlreadyReleased,
            });
        }

        let claim = groups::Entity::update_many()
            .col_expr(groups::Column::FundsReleased, Expr::value(true))
            .col_expr(groups::Column::FundsReleasedAt, Expr::value(Utc::now()))
            .filter(groups::Column::Id.eq(group_id.to_string()))
            .filter(groups::Column::Status.eq(TargetStatus::Completed.as_str()))
            .filter(groups::Column::FundsReleased.eq(false))
            .exec(db_tx)
            .await?;
        if claim.rows_affected == 0 {
            return Ok(ReleaseOutcome::AlreadyReleased);
        }

        let spec = EntrySpec::new(
            TransactionKind::GroupRelease,
            group.current,
            &format!("release of \u{201c}{}\u{201d}", group.name),
        )
        .target(TargetRef::new(TargetKind::Group, group.id));
        self.credit_tx(db_tx, &group.created_by, spec).await?;

        Ok(ReleaseOutcome::Released {
            amount: group.current,
        })
    }
}
