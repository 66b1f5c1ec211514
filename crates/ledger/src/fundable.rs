//! Generic view over the two entities that accumulate contributions.
//!
//! Goals and groups share the same completion and fund-release rules. The
//! [`FundableTarget`] trait exposes the fields those rules need, and the free
//! functions in this module hold the decisions themselves, so the completion
//! detector and the release service are written once for both entity types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, LedgerError, MoneyMinor};

/// Which kind of fundable target an id refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Goal,
    Group,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::Group => "group",
        }
    }

    pub(crate) fn not_found_error(self, id: Uuid) -> LedgerError {
        match self {
            Self::Goal => LedgerError::GoalNotFound(id.to_string()),
            Self::Group => LedgerError::GroupNotFound(id.to_string()),
        }
    }

    pub(crate) fn already_completed_error(self, name: &str) -> LedgerError {
        match self {
            Self::Goal => LedgerError::GoalAlreadyCompleted(name.to_string()),
            Self::Group => LedgerError::GroupAlreadyCompleted(name.to_string()),
        }
    }

    pub(crate) fn cancelled_error(self, name: &str) -> LedgerError {
        match self {
            Self::Goal => LedgerError::GoalCancelled(name.to_string()),
            Self::Group => LedgerError::GroupCancelled(name.to_string()),
        }
    }
}

impl TryFrom<&str> for TargetKind {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "goal" => Ok(Self::Goal),
            "group" => Ok(Self::Group),
            other => Err(LedgerError::InvalidId(format!(
                "invalid target kind: {other}"
            ))),
        }
    }
}

/// Lifecycle state of a fundable target.
///
/// Completion is decided by `status` alone: a target counts as completed only
/// once it has been transitioned to `Completed`, never implicitly from its
/// amounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl TargetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for TargetStatus {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(LedgerError::InvalidId(format!(
                "invalid target status: {other}"
            ))),
        }
    }
}

/// Common capability of goals and groups: accumulate contributions toward a
/// target amount, then release the accumulated funds to a beneficiary wallet.
pub trait FundableTarget {
    fn fundable_id(&self) -> Uuid;
    fn kind(&self) -> TargetKind;
    fn display_name(&self) -> &str;
    fn target_amount(&self) -> MoneyMinor;
    fn current_amount(&self) -> MoneyMinor;
    fn status(&self) -> TargetStatus;
    fn funds_released(&self) -> bool;
    fn currency(&self) -> Currency;
    /// User whose wallet receives the funds on release.
    fn beneficiary(&self) -> &str;
}

/// Whether a target should transition to `Completed` now.
///
/// Idempotent by construction: already completed or cancelled targets never
/// transition again, regardless of their amounts.
pub fn completion_due(target: &impl FundableTarget) -> bool {
    target.status() == TargetStatus::Active && target.current_amount() >= target.target_amount()
}

/// No-op outcomes of a release attempt, decided before any write.
///
/// Returns `None` when the release should proceed.
pub(crate) fn release_precheck(target: &impl FundableTarget) -> Option<ReleasePrecheck> {
    if target.status() != TargetStatus::Completed {
        return Some(ReleasePrecheck::NotReady);
    }
    if target.funds_released() {
        return Some(ReleasePrecheck::AlreadyReleased);
    }
    None
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReleasePrecheck {
    NotReady,
    AlreadyReleased,
}

/// Point-in-time view of a target, detached from its entity type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSnapshot {
    pub id: Uuid,
    pub kind: TargetKind,
    pub name: String,
    pub status: TargetStatus,
    pub current: MoneyMinor,
    pub target: MoneyMinor,
    pub funds_released: bool,
}

impl TargetSnapshot {
    pub fn of(target: &impl FundableTarget) -> Self {
        Self {
            id: target.fundable_id(),
            kind: target.kind(),
            name: target.display_name().to_string(),
            status: target.status(),
            current: target.current_amount(),
            target: target.target_amount(),
            funds_released: target.funds_released(),
        }
    }
}
