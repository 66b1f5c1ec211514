use sea_orm::{ActiveValue::Set, QueryFilter, TransactionTrait, prelude::*};
use serde::Serialize;

use crate::{
    MoneyMinor, NotificationEvent, ResultLedger, Transaction, TransactionKind, TransactionStatus,
    Wallet, transactions, wallets,
};

use super::{Engine, EntrySpec, normalize_optional_text, with_tx};

/// Result of replaying a wallet's entries against its stored balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceAudit {
    /// Balance column as it was before the audit.
    pub stored: MoneyMinor,
    /// Signed sum of the wallet's completed and pending entries.
    pub recomputed: MoneyMinor,
}

impl BalanceAudit {
    pub fn drifted(&self) -> bool {
        self.stored != self.recomputed
    }
}

impl Engine {
    /// Returns the user's wallet, creating an empty one on first access.
    pub async fn get_or_create_wallet(&self, user_id: &str) -> ResultLedger<Wallet> {
        with_tx!(self, |db_tx| {
            let model = self.get_or_create_wallet_tx(&db_tx, user_id).await?;
            Wallet::try_from(model)
        })
    }

    /// Returns the user's wallet or `WalletNotFound`.
    pub async fn wallet(&self, user_id: &str) -> ResultLedger<Wallet> {
        with_tx!(self, |db_tx| {
            let model = self.require_wallet_by_user(&db_tx, user_id).await?;
            Wallet::try_from(model)
        })
    }

    /// Credits the user's wallet and records a completed `deposit` entry.
    ///
    /// The wallet is created on the fly for first-time depositors. An external
    /// payment reference, when provided, is stored on the entry verbatim.
    pub async fn deposit(
        &self,
        user_id: &str,
        amount: MoneyMinor,
        reference: Option<&str>,
        description: Option<&str>,
    ) -> ResultLedger<Transaction> {
        let description =
            normalize_optional_text(description).unwrap_or_else(|| "wallet deposit".to_string());
        let mut spec = EntrySpec::new(TransactionKind::Deposit, amount, &description);
        if let Some(reference) = normalize_optional_text(reference) {
            spec = spec.reference(&reference);
        }

        let entry = with_tx!(self, |db_tx| {
            let (_, entry) = self.credit_tx(&db_tx, user_id, spec).await?;
            Ok::<_, crate::LedgerError>(entry)
        })?;

        self.notify(NotificationEvent::deposit(
            user_id,
            entry.amount,
            entry.reference.as_deref(),
        ));
        Ok(entry)
    }

    /// Rebuilds the stored balance from the wallet's entries.
    ///
    /// Completed and pending entries both count: reservations carry a negative
    /// amount and are already deducted from the balance. When the stored value
    /// disagrees with the replay, the replayed sum wins and the drift is
    /// logged.
    pub async fn recompute_wallet_balance(&self, user_id: &str) -> ResultLedger<BalanceAudit> {
        with_tx!(self, |db_tx| {
            let wallet = self.require_wallet_by_user(&db_tx, user_id).await?;

            let rows = transactions::Entity::find()
                .filter(transactions::Column::WalletId.eq(wallet.id.clone()))
                .filter(transactions::Column::Status.is_in([
                    TransactionStatus::Completed.as_str(),
                    TransactionStatus::Pending.as_str(),
                ]))
                .all(&db_tx)
                .await?;

            let mut recomputed = MoneyMinor::ZERO;
            for row in &rows {
                recomputed += MoneyMinor::new(row.amount_minor);
            }

            let audit = BalanceAudit {
                stored: MoneyMinor::new(wallet.balance_minor),
                recomputed,
            };
            if audit.drifted() {
                wallets::ActiveModel {
                    id: Set(wallet.id),
                    balance_minor: Set(recomputed.minor()),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
                tracing::warn!(
                    user_id,
                    stored = %audit.stored,
                    recomputed = %audit.recomputed,
                    "wallet balance drifted from its entries; rewrote from replay"
                );
            }

            Ok(audit)
        })
    }
}
