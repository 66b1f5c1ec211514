use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Ngn,
}

pub mod target {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TargetKind {
        Goal,
        Group,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TargetStatus {
        Active,
        Completed,
        Cancelled,
    }

    /// Snapshot of a goal or group as it was after an operation.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TargetView {
        pub id: Uuid,
        pub kind: TargetKind,
        pub name: String,
        pub target_minor: i64,
        pub current_minor: i64,
        pub status: TargetStatus,
        pub funds_released: bool,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WalletView {
        pub id: Uuid,
        pub user_id: String,
        pub balance_minor: i64,
        pub currency: Currency,
        pub active: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositNew {
        /// Amount in minor units (kobo). Must be > 0.
        pub amount_minor: i64,
        /// External payment reference, stored on the entry verbatim.
        pub reference: Option<String>,
        pub description: Option<String>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Deposit,
        Withdrawal,
        Contribution,
        GoalRelease,
        GroupRelease,
        Fee,
        Refund,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Pending,
        Completed,
        Failed,
    }

    /// Query parameters for listing wallet transactions.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        /// Inclusive lower bound (RFC3339 UTC).
        pub from: Option<DateTime<Utc>>,
        /// Exclusive upper bound (RFC3339 UTC).
        pub to: Option<DateTime<Utc>>,
        /// Comma-separated allow-list of kinds, e.g. `deposit,contribution`.
        pub kinds: Option<String>,
        pub status: Option<TransactionStatus>,
        /// Substring match over description, reference and id.
        pub search: Option<String>,
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from a previous response's
        /// `next_cursor`.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        /// Signed amount in minor units; positive entries increase the balance.
        pub amount_minor: i64,
        pub currency: Currency,
        pub description: String,
        pub status: TransactionStatus,
        pub reference: Option<String>,
        pub occurred_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }
}

pub mod withdrawal {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawalNew {
        /// Amount in minor units (kobo). Must be > 0.
        pub amount_minor: i64,
        /// Where the payout should go (e.g. a bank account label).
        pub destination: String,
    }
}

pub mod goal {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ScheduleFrequency {
        Daily,
        Weekly,
        Monthly,
        Custom,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScheduleNew {
        pub frequency: ScheduleFrequency,
        /// Default contribution amount for the recurring path.
        pub amount_minor: Option<i64>,
        /// Required (non-empty) when `frequency` is `custom`.
        pub custom_dates: Option<Vec<DateTime<Utc>>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ScheduleView {
        pub frequency: ScheduleFrequency,
        pub amount_minor: Option<i64>,
        pub custom_dates: Vec<DateTime<Utc>>,
        pub next_due_at: Option<DateTime<Utc>>,
        pub last_contribution_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        /// Target amount in minor units. Must be > 0.
        pub target_minor: i64,
        pub schedule: Option<ScheduleNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalView {
        pub id: Uuid,
        pub user_id: String,
        pub name: String,
        pub target_minor: i64,
        pub current_minor: i64,
        pub currency: Currency,
        pub status: target::TargetStatus,
        pub completed_at: Option<DateTime<Utc>>,
        pub funds_released: bool,
        pub funds_released_at: Option<DateTime<Utc>>,
        pub schedule: Option<ScheduleView>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalsResponse {
        pub goals: Vec<GoalView>,
    }
}

pub mod group {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum GroupRole {
        Owner,
        Member,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        /// Target amount in minor units. Must be > 0.
        pub target_minor: i64,
        /// Users to enrol alongside the creator.
        #[serde(default)]
        pub member_ids: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub created_by: String,
        pub name: String,
        pub target_minor: i64,
        pub current_minor: i64,
        pub currency: Currency,
        pub status: target::TargetStatus,
        pub completed_at: Option<DateTime<Utc>>,
        pub funds_released: bool,
        pub funds_released_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
    }

    /// A member with their enrolment state and running total.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub user_id: String,
        pub role: GroupRole,
        pub active: bool,
        pub total_contributed_minor: i64,
        pub joined_at: DateTime<Utc>,
    }

    /// Response body for listing members.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }
}

pub mod contribution {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentMethod {
        Wallet,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ContributionStatus {
        Completed,
        Failed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionNew {
        /// Amount in minor units (kobo). Must be > 0.
        pub amount_minor: i64,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionView {
        pub id: Uuid,
        pub user_id: String,
        pub target_kind: target::TargetKind,
        pub target_id: Uuid,
        pub target_name: String,
        pub amount_minor: i64,
        pub currency: Currency,
        pub payment_method: PaymentMethod,
        pub status: ContributionStatus,
        pub reference: String,
        pub occurred_at: DateTime<Utc>,
    }

    /// Everything one contribution changed, in one response.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionReceipt {
        pub wallet: wallet::WalletView,
        pub contribution: ContributionView,
        pub target: target::TargetView,
        /// Whether this contribution completed the target.
        pub completed: bool,
        /// Outcome of the inline release attempt, when one ran.
        pub release: Option<release::ReleaseOutcome>,
    }
}

pub mod release {
    use super::*;

    /// What a release attempt did. `not_ready` and `already_released` are
    /// ordinary outcomes, not errors.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "outcome", rename_all = "snake_case")]
    pub enum ReleaseOutcome {
        Released { amount_minor: i64 },
        NotReady,
        AlreadyReleased,
    }
}

pub mod reconciliation {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SweepCounts {
        pub examined: u64,
        pub released: u64,
        pub skipped: u64,
        pub failed: u64,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SweepReport {
        pub goals: SweepCounts,
        pub groups: SweepCounts,
        pub released_total_minor: i64,
        pub finished_at: DateTime<Utc>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ReconcilerStatus {
        pub running: bool,
        pub runs: u64,
        pub last_run_at: Option<DateTime<Utc>>,
        pub last_report: Option<SweepReport>,
    }
}
