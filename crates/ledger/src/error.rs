//! The module contains the errors the ledger can throw.
//!
//! Validation errors ([`InvalidAmount`], [`InsufficientFunds`], the not-found
//! family) are expected, user-recoverable rejections. [`Database`] wraps the
//! storage layer and is the transient class callers may retry.
//!
//!  [`InvalidAmount`]: LedgerError::InvalidAmount
//!  [`InsufficientFunds`]: LedgerError::InsufficientFunds
//!  [`Database`]: LedgerError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("wallet for \"{0}\" not found!")]
    WalletNotFound(String),
    #[error("goal \"{0}\" not found!")]
    GoalNotFound(String),
    #[error("group \"{0}\" not found!")]
    GroupNotFound(String),
    #[error("goal \"{0}\" is already completed")]
    GoalAlreadyCompleted(String),
    #[error("group \"{0}\" is already completed")]
    GroupAlreadyCompleted(String),
    #[error("goal \"{0}\" is cancelled")]
    GoalCancelled(String),
    #[error("group \"{0}\" is cancelled")]
    GroupCancelled(String),
    #[error("Not a member: {0}")]
    NotAMember(String),
    #[error("transaction \"{0}\" not found!")]
    TransactionNotFound(String),
    #[error("transaction \"{0}\" is not pending")]
    TransactionNotPending(String),
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::WalletNotFound(a), Self::WalletNotFound(b)) => a == b,
            (Self::GoalNotFound(a), Self::GoalNotFound(b)) => a == b,
            (Self::GroupNotFound(a), Self::GroupNotFound(b)) => a == b,
            (Self::GoalAlreadyCompleted(a), Self::GoalAlreadyCompleted(b)) => a == b,
            (Self::GroupAlreadyCompleted(a), Self::GroupAlreadyCompleted(b)) => a == b,
            (Self::GoalCancelled(a), Self::GoalCancelled(b)) => a == b,
            (Self::GroupCancelled(a), Self::GroupCancelled(b)) => a == b,
            (Self::NotAMember(a), Self::NotAMember(b)) => a == b,
            (Self::TransactionNotFound(a), Self::TransactionNotFound(b)) => a == b,
            (Self::TransactionNotPending(a), Self::TransactionNotPending(b)) => a == b,
            (Self::InvalidSchedule(a), Self::InvalidSchedule(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
