use axum::{Json, http::StatusCode, response::IntoResponse};
use ledger::LedgerError;

use serde::Serialize;
pub use server::{ServerState, UserIdent, router, run_with_listener};

mod goals;
mod groups;
mod reconciliation;
mod server;
mod views;
mod wallet;

pub mod types {
    pub mod wallet {
        pub use api_types::wallet::{DepositNew, WalletView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionCreated, TransactionKind, TransactionListQuery, TransactionListResponse,
            TransactionStatus, TransactionView,
        };
    }

    pub mod withdrawal {
        pub use api_types::withdrawal::WithdrawalNew;
    }

    pub mod goal {
        pub use api_types::goal::{
            GoalNew, GoalView, GoalsResponse, ScheduleFrequency, ScheduleNew, ScheduleView,
        };
    }

    pub mod group {
        pub use api_types::group::{GroupNew, GroupRole, GroupView, MemberView, MembersResponse};
    }

    pub mod contribution {
        pub use api_types::contribution::{ContributionNew, ContributionReceipt, ContributionView};
    }

    pub mod target {
        pub use api_types::target::{TargetKind, TargetStatus, TargetView};
    }

    pub mod release {
        pub use api_types::release::ReleaseOutcome;
    }

    pub mod reconciliation {
        pub use api_types::reconciliation::{ReconcilerStatus, SweepCounts, SweepReport};
    }
}

pub enum ServerError {
    Ledger(LedgerError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_ledger_error(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotAMember(_) => StatusCode::FORBIDDEN,
        LedgerError::WalletNotFound(_)
        | LedgerError::GoalNotFound(_)
        | LedgerError::GroupNotFound(_)
        | LedgerError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::GoalAlreadyCompleted(_)
        | LedgerError::GroupAlreadyCompleted(_)
        | LedgerError::TransactionNotPending(_) => StatusCode::CONFLICT,
        LedgerError::Database(_) | LedgerError::InvalidId(_) => StatusCode::INTERNAL_SERVER_ERROR,
        LedgerError::InvalidAmount(_)
        | LedgerError::InsufficientFunds(_)
        | LedgerError::GoalCancelled(_)
        | LedgerError::GroupCancelled(_)
        | LedgerError::InvalidSchedule(_)
        | LedgerError::InvalidCursor(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_ledger_error(err: LedgerError) -> String {
    match err {
        LedgerError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        // A stored value failed to parse; the caller cannot fix that.
        LedgerError::InvalidId(detail) => {
            tracing::error!("corrupt stored record: {detail}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Ledger(err) => (status_for_ledger_error(&err), message_for_ledger_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<LedgerError> for ServerError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}
