//! Individual savings goals.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ContributionSchedule, Currency, FundableTarget, LedgerError, MoneyMinor, ResultLedger,
    TargetKind, TargetStatus,
    util::{model_currency, parse_uuid},
};

/// A personal savings target owned by a single user.
///
/// Contributions accumulate in `current` until it reaches `target`; the goal
/// then transitions to `Completed` and its funds are released to the owner's
/// wallet exactly once. A goal is never deleted once money has moved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub target: MoneyMinor,
    pub current: MoneyMinor,
    pub currency: Currency,
    pub status: TargetStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub funds_released: bool,
    pub funds_released_at: Option<DateTime<Utc>>,
    pub schedule: Option<ContributionSchedule>,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(
        user_id: String,
        name: String,
        target: MoneyMinor,
        schedule: Option<ContributionSchedule>,
    ) -> ResultLedger<Self> {
        if !target.is_positive() {
            return Err(LedgerError::InvalidAmount(
                "target_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            target,
            current: MoneyMinor::ZERO,
            currency: Currency::default(),
            status: TargetStatus::Active,
            completed_at: None,
            funds_released: false,
            funds_released_at: None,
            schedule,
            created_at: Utc::now(),
        })
    }
}

impl FundableTarget for Goal {
    fn fundable_id(&self) -> Uuid {
        self.id
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Goal
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn target_amount(&self) -> MoneyMinor {
        self.target
    }

    fn current_amount(&self) -> MoneyMinor {
        self.current
    }

    fn status(&self) -> TargetStatus {
        self.status
    }

    fn funds_released(&self) -> bool {
        self.funds_released
    }

    fn currency(&self) -> Currency {
        self.currency
    }

    fn beneficiary(&self) -> &str {
        &self.user_id
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub target_minor: i64,
    pub current_minor: i64,
    pub currency: String,
    pub status: String,
    pub completed_at: Option<DateTimeUtc>,
    pub funds_released: bool,
    pub funds_released_at: Option<DateTimeUtc>,
    pub schedule_frequency: Option<String>,
    pub schedule_amount_minor: Option<i64>,
    pub schedule_custom_dates: Option<String>,
    pub schedule_next_due_at: Option<DateTimeUtc>,
    pub schedule_last_contribution_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Goal {
    /// Builds an insertable model; fails only when a custom schedule cannot
    /// be encoded.
    pub(crate) fn to_active_model(&self) -> ResultLedger<ActiveModel> {
        let (frequency, amount, custom, next_due, last) = match &self.schedule {
            None => (None, None, None, None, None),
            Some(schedule) => (
                Some(schedule.frequency.as_str().to_string()),
                schedule.amount.map(MoneyMinor::minor),
                schedule.encode_custom_dates()?,
                schedule.next_due_at,
                schedule.last_contribution_at,
            ),
        };
        Ok(ActiveModel {
            id: ActiveValue::Set(self.id.to_string()),
            user_id: ActiveValue::Set(self.user_id.clone()),
            name: ActiveValue::Set(self.name.clone()),
            target_minor: ActiveValue::Set(self.target.minor()),
            current_minor: ActiveValue::Set(self.current.minor()),
            currency: ActiveValue::Set(self.currency.code().to_string()),
            status: ActiveValue::Set(self.status.as_str().to_string()),
            completed_at: ActiveValue::Set(self.completed_at),
            funds_released: ActiveValue::Set(self.funds_released),
            funds_released_at: ActiveValue::Set(self.funds_released_at),
            schedule_frequency: ActiveValue::Set(frequency),
            schedule_amount_minor: ActiveValue::Set(amount),
            schedule_custom_dates: ActiveValue::Set(custom),
            schedule_next_due_at: ActiveValue::Set(next_due),
            schedule_last_contribution_at: ActiveValue::Set(last),
            created_at: ActiveValue::Set(self.created_at),
        })
    }
}

impl TryFrom<Model> for Goal {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "goal")?,
            user_id: model.user_id,
            name: model.name,
            target: MoneyMinor::new(model.target_minor),
            current: MoneyMinor::new(model.current_minor),
            currency: model_currency(&model.currency)?,
            status: TargetStatus::try_from(model.status.as_str())?,
            completed_at: model.completed_at,
            funds_released: model.funds_released,
            funds_released_at: model.funds_released_at,
            schedule: ContributionSchedule::from_columns(
                model.schedule_frequency.as_deref(),
                model.schedule_amount_minor,
                model.schedule_custom_dates.as_deref(),
                model.schedule_next_due_at,
                model.schedule_last_contribution_at,
            )?,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ScheduleFrequency;

    use super::*;

    #[test]
    fn new_goal_rejects_non_positive_target() {
        assert!(Goal::new("alice".to_string(), "Rent".to_string(), MoneyMinor::ZERO, None).is_err());
        assert!(
            Goal::new(
                "alice".to_string(),
                "Rent".to_string(),
                MoneyMinor::new(-100),
                None
            )
            .is_err()
        );
    }

    #[test]
    fn goal_round_trips_through_model() {
        let schedule = ContributionSchedule::new(ScheduleFrequency::Weekly, Some(MoneyMinor::new(5_000)));
        let goal = Goal::new(
            "alice".to_string(),
            "Rent".to_string(),
            MoneyMinor::new(60_000),
            Some(schedule),
        )
        .unwrap();

        let active = goal.to_active_model().unwrap();
        let model = Model {
            id: match active.id {
                ActiveValue::Set(id) => id,
                _ => unreachable!(),
            },
            user_id: "alice".to_string(),
            name: "Rent".to_string(),
            target_minor: 60_000,
            current_minor: 0,
            currency: "NGN".to_string(),
            status: "active".to_string(),
            completed_at: None,
            funds_released: false,
            funds_released_at: None,
            schedule_frequency: Some("weekly".to_string()),
            schedule_amount_minor: Some(5_000),
            schedule_custom_dates: None,
            schedule_next_due_at: None,
            schedule_last_contribution_at: None,
            created_at: goal.created_at,
        };

        assert_eq!(Goal::try_from(model).unwrap(), goal);
    }
}
