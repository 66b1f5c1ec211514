//! Reconciliation sweep over completed-but-unpaid targets.

use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MoneyMinor, ResultLedger, TargetStatus, goals, groups, util::parse_uuid};

use super::{Engine, ReleaseOutcome, with_tx};

/// Per-entity-type tallies of one sweep run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepCounts {
    pub examined: u64,
    pub released: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Summary of one reconciliation sweep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub goals: SweepCounts,
    pub groups: SweepCounts,
    pub released_total: MoneyMinor,
    pub finished_at: DateTime<Utc>,
}

impl Engine {
    /// Pays out every completed target whose funds have not been released.
    ///
    /// Each target is released in its own transaction, so one failure cannot
    /// poison the rest of the run; failed targets keep their unreleased flag
    /// and are retried on the next sweep. Targets released by somebody else
    /// between the candidate query and the attempt count as skipped.
    pub async fn sweep_unreleased(&self) -> ResultLedger<SweepReport> {
        let goal_ids = self.unreleased_goal_ids().await?;
        let group_ids = self.unreleased_group_ids().await?;

        let mut goal_counts = SweepCounts::default();
        let mut group_counts = SweepCounts::default();
        let mut released_total = MoneyMinor::ZERO;

        for goal_id in goal_ids {
            goal_counts.examined += 1;
            match self.release_goal_funds(goal_id).await {
                Ok(ReleaseOutcome::Released { amount }) => {
                    goal_counts.released += 1;
                    released_total += amount;
                }
                Ok(_) => goal_counts.skipped += 1,
                Err(err) => {
                    goal_counts.failed += 1;
                    tracing::warn!(goal_id = %goal_id, error = %err, "sweep could not release goal");
                }
            }
        }

        for group_id in group_ids {
            group_counts.examined += 1;
            match self.release_group_funds(group_id).await {
                Ok(ReleaseOutcome::Released { amount }) => {
                    group_counts.released += 1;
                    released_total += amount;
                }
                Ok(_) => group_counts.skipped += 1,
                Err(err) => {
                    group_counts.failed += 1;
                    tracing::warn!(group_id = %group_id, error = %err, "sweep could not release group");
                }
            }
        }

        let report = SweepReport {
            goals: goal_counts,
            groups: group_counts,
            released_total,
            finished_at: Utc::now(),
        };
        tracing::info!(
            goals_released = report.goals.released,
            groups_released = report.groups.released,
            failed = report.goals.failed + report.groups.failed,
            released_total = %report.released_total,
            "reconciliation sweep finished"
        );
        Ok(report)
    }

    async fn unreleased_goal_ids(&self) -> ResultLedger<Vec<Uuid>> {
        with_tx!(self, |db_tx| {
            let rows = goals::Entity::find()
                .filter(goals::Column::Status.eq(TargetStatus::Completed.as_str()))
                .filter(goals::Column::FundsReleased.eq(false))
                .filter(goals::Column::CurrentMinor.gt(0i64))
                .all(&db_tx)
                .await?;
            rows.iter().map(|m| parse_uuid(&m.id, "goal")).collect()
        })
    }

    async fn unreleased_group_ids(&self) -> ResultLedger<Vec<Uuid>> {
        with_tx!(self, |db_tx| {
            let rows = groups::Entity::find()
                .filter(groups::Column::Status.eq(TargetStatus::Completed.as_str()))
                .filter(groups::Column::FundsReleased.eq(false))
                .filter(groups::Column::CurrentMinor.gt(0i64))
                .all(&db_tx)
                .await?;
            rows.iter().map(|m| parse_uuid(&m.id, "group")).collect()
        })
    }
}
