//! Outbound notification seam.
//!
//! The engine reports money movement to a [`Notifier`] after the surrounding
//! database transaction has committed. Delivery is fire-and-forget: a failing
//! or slow notifier must never affect the financial operation, so the trait is
//! synchronous and infallible and implementations are expected to hand off
//! internally if they need to do real work.

use serde::{Deserialize, Serialize};

use crate::{MoneyMinor, transactions::TransactionKind};

/// Machine-readable part of an event, alongside the human title/body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMeta {
    pub kind: TransactionKind,
    pub amount: MoneyMinor,
    pub reference: Option<String>,
}

/// A single user-facing event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub meta: NotificationMeta,
}

impl NotificationEvent {
    pub fn deposit(user_id: &str, amount: MoneyMinor, reference: Option<&str>) -> Self {
        Self {
            user_id: user_id.to_string(),
            title: "Deposit received".to_string(),
            body: format!("{amount} was added to your wallet."),
            meta: NotificationMeta {
                kind: TransactionKind::Deposit,
                amount,
                reference: reference.map(str::to_string),
            },
        }
    }

    pub fn withdrawal_requested(user_id: &str, amount: MoneyMinor) -> Self {
        Self {
            user_id: user_id.to_string(),
            title: "Withdrawal requested".to_string(),
            body: format!("Your withdrawal of {amount} is awaiting review."),
            meta: NotificationMeta {
                kind: TransactionKind::Withdrawal,
                amount,
                reference: None,
            },
        }
    }

    pub fn contribution(
        user_id: &str,
        target_name: &str,
        amount: MoneyMinor,
        reference: &str,
    ) -> Self {
        Self {
            user_id: user_id.to_string(),
            title: "Contribution applied".to_string(),
            body: format!("You put {amount} towards \u{201c}{target_name}\u{201d}."),
            meta: NotificationMeta {
                kind: TransactionKind::Contribution,
                amount,
                reference: Some(reference.to_string()),
            },
        }
    }
}

/// Delivery seam. Implementations must be cheap and must not panic.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: NotificationEvent);
}

/// Default notifier: writes events to the log and nothing else.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: NotificationEvent) {
        tracing::info!(
            user_id = %event.user_id,
            kind = event.meta.kind.as_str(),
            amount = %event.meta.amount,
            title = %event.title,
            "notification"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_event_carries_amount_and_reference() {
        let event = NotificationEvent::deposit("user-1", MoneyMinor::new(25_000), Some("ref-9"));
        assert_eq!(event.meta.kind, TransactionKind::Deposit);
        assert_eq!(event.meta.reference.as_deref(), Some("ref-9"));
        assert!(event.body.contains("₦250.00"));
    }
}
