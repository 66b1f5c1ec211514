//! Recurring contribution schedules attached to goals.

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{LedgerError, MoneyMinor, ResultLedger};

/// How often a scheduled contribution recurs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleFrequency {
    Daily,
    Weekly,
    Monthly,
    /// Explicit list of dates instead of a fixed period.
    Custom,
}

impl ScheduleFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Custom => "custom",
        }
    }
}

impl TryFrom<&str> for ScheduleFrequency {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "custom" => Ok(Self::Custom),
            other => Err(LedgerError::InvalidSchedule(format!(
                "invalid frequency: {other}"
            ))),
        }
    }
}

/// Recurring contribution plan for a goal.
///
/// `next_due_at` is advanced after every scheduled contribution; a `None`
/// value means the schedule is exhausted (custom frequency only) or was never
/// primed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionSchedule {
    pub frequency: ScheduleFrequency,
    /// Suggested amount per occurrence; callers may contribute a different one.
    pub amount: Option<MoneyMinor>,
    /// Only meaningful for `Custom`; the list need not be sorted.
    pub custom_dates: Vec<DateTime<Utc>>,
    pub next_due_at: Option<DateTime<Utc>>,
    pub last_contribution_at: Option<DateTime<Utc>>,
}

impl ContributionSchedule {
    pub fn new(frequency: ScheduleFrequency, amount: Option<MoneyMinor>) -> Self {
        Self {
            frequency,
            amount,
            custom_dates: Vec::new(),
            next_due_at: None,
            last_contribution_at: None,
        }
    }

    /// Computes the due date that follows a contribution made at `now`.
    ///
    /// Fixed frequencies advance from the current `next_due_at` (or `now`
    /// when the schedule was never primed): daily adds one day, weekly seven
    /// days, monthly one calendar month with end-of-month clamping
    /// (`Jan 31 + 1 month = Feb 28/29`). `Custom` picks the earliest
    /// configured date strictly greater than `now`, and returns `None` once
    /// the list is exhausted.
    #[must_use]
    pub fn advanced_due_date(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let base = self.next_due_at.unwrap_or(now);
        match self.frequency {
            ScheduleFrequency::Daily => base.checked_add_signed(TimeDelta::days(1)),
            ScheduleFrequency::Weekly => base.checked_add_signed(TimeDelta::days(7)),
            ScheduleFrequency::Monthly => base.checked_add_months(Months::new(1)),
            ScheduleFrequency::Custom => {
                self.custom_dates.iter().filter(|d| **d > now).min().copied()
            }
        }
    }

    /// Serializes the custom date list for storage (`None` when empty).
    pub(crate) fn encode_custom_dates(&self) -> ResultLedger<Option<String>> {
        if self.custom_dates.is_empty() {
            return Ok(None);
        }
        serde_json::to_string(&self.custom_dates)
            .map(Some)
            .map_err(|_| LedgerError::InvalidSchedule("unencodable custom dates".to_string()))
    }

    /// Parses a stored custom date list.
    pub(crate) fn decode_custom_dates(raw: Option<&str>) -> ResultLedger<Vec<DateTime<Utc>>> {
        match raw {
            None => Ok(Vec::new()),
            Some(text) => serde_json::from_str(text)
                .map_err(|_| LedgerError::InvalidSchedule("invalid custom dates".to_string())),
        }
    }

    /// Rebuilds a schedule from its storage columns.
    ///
    /// Returns `Ok(None)` when no frequency is stored (the goal has no
    /// schedule).
    pub(crate) fn from_columns(
        frequency: Option<&str>,
        amount_minor: Option<i64>,
        custom_dates: Option<&str>,
        next_due_at: Option<DateTime<Utc>>,
        last_contribution_at: Option<DateTime<Utc>>,
    ) -> ResultLedger<Option<Self>> {
        let Some(frequency) = frequency else {
            return Ok(None);
        };
        Ok(Some(Self {
            frequency: ScheduleFrequency::try_from(frequency)?,
            amount: amount_minor.map(MoneyMinor::new),
            custom_dates: Self::decode_custom_dates(custom_dates)?,
            next_due_at,
            last_contribution_at,
        }))
    }
}
