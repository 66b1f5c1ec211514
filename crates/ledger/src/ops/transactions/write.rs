//! Balance-mutating ledger operations.
//!
//! Every balance change goes through here: an atomic column update on the
//! wallet row plus an appended `wallet_transactions` entry, inside one
//! database transaction. The guarded decrement (`balance >= amount`) is what
//! keeps balances non-negative under concurrent debits.

use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    LedgerError, MoneyMinor, ResultLedger, Transaction, TransactionKind, TransactionStatus,
    transactions::{self, TargetRef},
    util::{model_currency, parse_uuid},
    wallets,
};

use super::super::{Engine, with_tx};

/// One entry to append: a positive magnitude plus bookkeeping fields. The
/// operation decides the sign (credits store `+amount`, debits `-amount`).
#[derive(Clone, Debug)]
pub struct EntrySpec {
    pub kind: TransactionKind,
    pub amount: MoneyMinor,
    pub description: String,
    pub target: Option<TargetRef>,
    pub reference: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl EntrySpec {
    pub fn new(kind: TransactionKind, amount: MoneyMinor, description: &str) -> Self {
        Self {
            kind,
            amount,
            description: description.to_string(),
            target: None,
            reference: None,
            metadata: None,
        }
    }

    pub fn target(mut self, target: TargetRef) -> Self {
        self.target = Some(target);
        self
    }

    pub fn reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl Engine {
    /// Appends a completed `+amount` entry and increases the balance.
    ///
    /// Creates the wallet lazily, so deposits work on first contact.
    pub async fn credit(&self, user_id: &str, spec: EntrySpec) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            let (_, entry) = self.credit_tx(&db_tx, user_id, spec).await?;
            Ok(entry)
        })
    }

    /// Appends a completed `-amount` entry and decreases the balance.
    ///
    /// Fails with `InsufficientFunds` when the balance cannot cover the
    /// amount, with `WalletNotFound` when the user has no wallet yet.
    pub async fn debit(&self, user_id: &str, spec: EntrySpec) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            let (_, entry) = self
                .debit_entry_tx(&db_tx, user_id, spec, TransactionStatus::Completed)
                .await?;
            Ok(entry)
        })
    }

    /// Like [`debit`](Engine::debit), but the appended entry stays `pending`:
    /// the funds leave the spendable balance immediately and wait for
    /// [`finalize_reserved`](Engine::finalize_reserved) or
    /// [`reverse_reserved`](Engine::reverse_reserved).
    pub async fn reserve(&self, user_id: &str, spec: EntrySpec) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            let (_, entry) = self
                .debit_entry_tx(&db_tx, user_id, spec, TransactionStatus::Pending)
                .await?;
            Ok(entry)
        })
    }

    /// Transitions a pending entry to completed. No balance change; the
    /// funds were already deducted at reservation time.
    pub async fn finalize_reserved(&self, transaction_id: Uuid) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            self.finalize_reserved_tx(&db_tx, transaction_id, None).await
        })
    }

    /// Transitions a pending entry to failed and credits the reserved amount
    /// back, restoring the balance exactly.
    pub async fn reverse_reserved(&self, transaction_id: Uuid) -> ResultLedger<Transaction> {
        with_tx!(self, |db_tx| {
            self.reverse_reserved_tx(&db_tx, transaction_id, None).await
        })
    }

    pub(crate) async fn credit_tx(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        spec: EntrySpec,
    ) -> ResultLedger<(wallets::Model, Transaction)> {
        if !spec.amount.is_positive() {
            return Err(LedgerError::InvalidAmount(format!(
                "credit amount must be positive, got {}",
                spec.amount
            )));
        }
        let wallet = self.get_or_create_wallet_tx(db_tx, user_id).await?;

        wallets::Entity::update_many()
            .col_expr(
                wallets::Column::BalanceMinor,
                Expr::col(wallets::Column::BalanceMinor).add(spec.amount.minor()),
            )
            .filter(wallets::Column::Id.eq(wallet.id.clone()))
            .exec(db_tx)
            .await?;

        let amount = spec.amount;
        let entry = self
            .insert_entry(db_tx, &wallet, spec, amount, TransactionStatus::Completed)
            .await?;
        let wallet = self.require_wallet_by_user(db_tx, user_id).await?;
        Ok((wallet, entry))
    }

    pub(crate) async fn debit_entry_tx(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        spec: EntrySpec,
        status: TransactionStatus,
    ) -> ResultLedger<(wallets::Model, Transaction)> {
        if !spec.amount.is_positive() {
            return Err(LedgerError::InvalidAmount(format!(
                "debit amount must be positive, got {}",
                spec.amount
            )));
        }
        let wallet = self.require_wallet_by_user(db_tx, user_id).await?;

        // Guarded decrement: zero rows affected means the balance check lost,
        // not that the wallet vanished.
        let taken = wallets::Entity::update_many()
            .col_expr(
                wallets::Column::BalanceMinor,
                Expr::col(wallets::Column::BalanceMinor).sub(spec.amount.minor()),
            )
            .filter(wallets::Column::Id.eq(wallet.id.clone()))
            .filter(wallets::Column::BalanceMinor.gte(spec.amount.minor()))
            .exec(db_tx)
            .await?;
        if taken.rows_affected == 0 {
            return Err(LedgerError::InsufficientFunds(format!(
                "balance cannot cover {}",
                spec.amount
            )));
        }

        let amount = spec.amount;
        let entry = self
            .insert_entry(db_tx, &wallet, spec, -amount, status)
            .await?;
        let wallet = self.require_wallet_by_user(db_tx, user_id).await?;
        Ok((wallet, entry))
    }

    pub(crate) async fn finalize_reserved_tx(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
        expected_kind: Option<TransactionKind>,
    ) -> ResultLedger<Transaction> {
        let model = self
            .require_entry(db_tx, transaction_id, expected_kind)
            .await?;

        let flipped = transactions::Entity::update_many()
            .col_expr(
                transactions::Column::Status,
                Expr::value(TransactionStatus::Completed.as_str()),
            )
            .filter(transactions::Column::Id.eq(transaction_id.to_string()))
            .filter(transactions::Column::Status.eq(TransactionStatus::Pending.as_str()))
            .exec(db_tx)
            .await?;
        if flipped.rows_affected == 0 {
            return Err(LedgerError::TransactionNotPending(
                transaction_id.to_string(),
            ));
        }

        let mut entry = Transaction::try_from(model)?;
        entry.status = TransactionStatus::Completed;
        Ok(entry)
    }

    pub(crate) async fn reverse_reserved_tx(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
        expected_kind: Option<TransactionKind>,
    ) -> ResultLedger<Transaction> {
        let model = self
            .require_entry(db_tx, transaction_id, expected_kind)
            .await?;

        let flipped = transactions::Entity::update_many()
            .col_expr(
                transactions::Column::Status,
                Expr::value(TransactionStatus::Failed.as_str()),
            )
            .filter(transactions::Column::Id.eq(transaction_id.to_string()))
            .filter(transactions::Column::Status.eq(TransactionStatus::Pending.as_str()))
            .exec(db_tx)
            .await?;
        if flipped.rows_affected == 0 {
            return Err(LedgerError::TransactionNotPending(
                transaction_id.to_string(),
            ));
        }

        // Reservations store a negative amount; subtracting it puts the
        // reserved funds back.
        wallets::Entity::update_many()
            .col_expr(
                wallets::Column::BalanceMinor,
                Expr::col(wallets::Column::BalanceMinor).sub(model.amount_minor),
            )
            .filter(wallets::Column::Id.eq(model.wallet_id.clone()))
            .exec(db_tx)
            .await?;

        let mut entry = Transaction::try_from(model)?;
        entry.status = TransactionStatus::Failed;
        Ok(entry)
    }

    async fn require_entry(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
        expected_kind: Option<TransactionKind>,
    ) -> ResultLedger<transactions::Model> {
        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id.to_string()))?;
        if let Some(kind) = expected_kind
            && model.kind != kind.as_str()
        {
            return Err(LedgerError::TransactionNotFound(transaction_id.to_string()));
        }
        Ok(model)
    }

    async fn insert_entry(
        &self,
        db_tx: &DatabaseTransaction,
        wallet: &wallets::Model,
        spec: EntrySpec,
        signed_amount: MoneyMinor,
        status: TransactionStatus,
    ) -> ResultLedger<Transaction> {
        let entry = Transaction::new(
            parse_uuid(&wallet.id, "wallet")?,
            spec.kind,
            signed_amount,
            model_currency(&wallet.currency)?,
            spec.description,
            status,
            spec.target,
            spec.reference,
            spec.metadata,
            Utc::now(),
        )?;
        transactions::ActiveModel::from(&entry).insert(db_tx).await?;
        Ok(entry)
    }
}
