//! Savings-club wallet ledger: append-only wallet accounting, goal and group
//! contributions, completion detection and exactly-once fund release, plus
//! the periodic reconciliation loop that sweeps for unpaid targets.

pub use contributions::{Contribution, ContributionStatus, PaymentMethod};
pub use currency::Currency;
pub use error::LedgerError;
pub use fundable::{FundableTarget, TargetKind, TargetSnapshot, TargetStatus, completion_due};
pub use goals::Goal;
pub use group_members::{GroupMember, GroupRole};
pub use groups::Group;
pub use money::MoneyMinor;
pub use notify::{LogNotifier, NotificationEvent, NotificationMeta, Notifier};
pub use ops::{
    BalanceAudit, ContributionReceipt, Engine, EngineBuilder, EntrySpec, ReleaseOutcome,
    SweepCounts, SweepReport, TransactionListFilter,
};
pub use reconciler::{DEFAULT_SWEEP_INTERVAL, Reconciler, ReconcilerStatus};
pub use schedule::{ContributionSchedule, ScheduleFrequency};
pub use transactions::{TargetRef, Transaction, TransactionKind, TransactionStatus};
pub use wallets::Wallet;

mod contributions;
mod currency;
mod error;
mod fundable;
mod goals;
mod group_members;
mod groups;
mod money;
mod notify;
mod ops;
mod reconciler;
mod schedule;
mod transactions;
mod util;
mod wallets;

/// Crate-wide result alias.
pub type ResultLedger<T> = Result<T, LedgerError>;
