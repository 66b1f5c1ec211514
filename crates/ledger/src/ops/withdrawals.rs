//! The withdrawal request/approve/reject pipeline.

use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    MoneyMinor, NotificationEvent, ResultLedger, Transaction, TransactionKind, TransactionStatus,
};

use super::{Engine, EntrySpec, normalize_required_name, with_tx};

impl Engine {
    /// Reserves `amount` for a withdrawal to `destination`.
    ///
    /// The funds leave the spendable balance immediately; the pending entry
    /// then waits for [`approve_withdrawal`](Engine::approve_withdrawal) or
    /// [`reject_withdrawal`](Engine::reject_withdrawal). The destination is
    /// kept in the entry's metadata for the payout operator.
    pub async fn request_withdrawal(
        &self,
        user_id: &str,
        amount: MoneyMinor,
        destination: &str,
    ) -> ResultLedger<Transaction> {
        let destination = normalize_required_name(destination, "destination")?;
        let spec = EntrySpec::new(TransactionKind::Withdrawal, amount, "wallet withdrawal")
            .metadata(serde_json::json!({ "destination": destination }));

        let entry = with_tx!(self, |db_tx| {
            let (_, entry) = self
                .debit_entry_tx(&db_tx, user_id, spec, TransactionStatus::Pending)
                .await?;
            Ok::<_, crate::LedgerError>(entry)
        })?;

        self.notify(NotificationEvent::withdrawal_requested(user_id, amount));
        Ok(entry)
    }

    /// Marks a pending withdrawal as paid out. No balance change; the
    /// deduction happened at request time.
    pub async fn approve_withdrawal(&self, transaction_id: Uuid) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            self.finalize_reserved_tx(&db_tx, transaction_id, Some(TransactionKind::Withdrawal))
                .await
        })
    }

    /// Cancels a pending withdrawal and puts the reserved funds back.
    pub async fn reject_withdrawal(&self, transaction_id: Uuid) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            self.reverse_reserved_tx(&db_tx, transaction_id, Some(TransactionKind::Withdrawal))
                .await
        })
    }
}
