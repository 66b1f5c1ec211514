use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{
    LedgerError, ResultLedger, Transaction, TransactionKind, TransactionStatus, transactions,
};

use super::super::{Engine, with_tx};

/// Filters for listing wallet transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// If present, acts as an allow-list of kinds to return.
    pub kinds: Option<Vec<TransactionKind>>,
    pub status: Option<TransactionStatus>,
    /// Substring match over description, reference and id.
    pub search: Option<String>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultLedger<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(LedgerError::InvalidAmount(
            "invalid range: from must be < to".to_string(),
        ));
    }
    if filter.kinds.as_ref().is_some_and(|k| k.is_empty()) {
        return Err(LedgerError::InvalidAmount(
            "kinds must not be empty".to_string(),
        ));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::OccurredAt.lt(to));
        }
        if let Some(kinds) = &filter.kinds {
            let kinds: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();
            self = self.filter(transactions::Column::Kind.is_in(kinds));
        }
        if let Some(status) = filter.status {
            self = self.filter(transactions::Column::Status.eq(status.as_str()));
        }
        if let Some(term) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            self = self.filter(
                Condition::any()
                    .add(transactions::Column::Description.contains(term))
                    .add(transactions::Column::Reference.contains(term))
                    .add(transactions::Column::Id.contains(term)),
            );
        }
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TransactionsCursor {
    occurred_at: DateTime<Utc>,
    transaction_id: String,
}

impl TransactionsCursor {
    fn encode(&self) -> ResultLedger<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| LedgerError::InvalidCursor("invalid transactions cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultLedger<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| LedgerError::InvalidCursor("invalid transactions cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| LedgerError::InvalidCursor("invalid transactions cursor".to_string()))
    }
}

impl Engine {
    /// Lists the newest entries of the user's wallet.
    pub async fn list_wallet_transactions(
        &self,
        user_id: &str,
        limit: u64,
        filter: &TransactionListFilter,
    ) -> ResultLedger<Vec<Transaction>> {
        let (items, _next) = self
            .list_wallet_transactions_page(user_id, limit, None, filter)
            .await?;
        Ok(items)
    }

    /// Lists the user's wallet entries with cursor-based pagination.
    ///
    /// Pages run newest to oldest, ordered by `(occurred_at, id)` descending.
    pub async fn list_wallet_transactions_page(
        &self,
        user_id: &str,
        limit: u64,
        cursor: Option<&str>,
        filter: &TransactionListFilter,
    ) -> ResultLedger<(Vec<Transaction>, Option<String>)> {
        with_tx!(self, |db_tx| {
            let wallet = self.require_wallet_by_user(&db_tx, user_id).await?;
            validate_list_filter(filter)?;

            let limit_plus_one = limit.saturating_add(1);
            let mut query = transactions::Entity::find()
                .filter(transactions::Column::WalletId.eq(wallet.id.clone()))
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit_plus_one);

            if let Some(cursor) = cursor {
                let cursor = TransactionsCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(transactions::Column::OccurredAt.lt(cursor.occurred_at))
                        .add(
                            Condition::all()
                                .add(transactions::Column::OccurredAt.eq(cursor.occurred_at))
                                .add(transactions::Column::Id.lt(cursor.transaction_id)),
                        ),
                );
            }
            query = query.apply_tx_filters(filter);

            let rows: Vec<transactions::Model> = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let mut out: Vec<Transaction> = Vec::with_capacity(rows.len().min(limit as usize));
            for model in rows.into_iter().take(limit as usize) {
                out.push(Transaction::try_from(model)?);
            }

            let next_cursor = out.last().map(|tx| TransactionsCursor {
                occurred_at: tx.occurred_at,
                transaction_id: tx.id.to_string(),
            });
            let next_cursor = if has_more {
                next_cursor.map(|c| c.encode()).transpose()?
            } else {
                None
            };

            Ok((out, next_cursor))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_round_trips() {
        let cursor = TransactionsCursor {
            occurred_at: Utc::now(),
            transaction_id: "0192aa00-0000-7000-8000-000000000001".to_string(),
        };
        let encoded = cursor.encode().ok();
        let decoded = encoded.as_deref().and_then(|e| TransactionsCursor::decode(e).ok());
        assert_eq!(
            decoded.map(|c| (c.occurred_at, c.transaction_id)),
            Some((cursor.occurred_at, cursor.transaction_id))
        );
    }

    #[test]
    fn garbage_cursor_is_rejected() {
        assert!(matches!(
            TransactionsCursor::decode("not a cursor"),
            Err(LedgerError::InvalidCursor(_))
        ));
    }

    #[test]
    fn empty_kind_list_is_rejected() {
        let filter = TransactionListFilter {
            kinds: Some(Vec::new()),
            ..Default::default()
        };
        assert!(validate_list_filter(&filter).is_err());
    }
}
