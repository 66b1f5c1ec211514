use std::fmt;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use unicode_normalization::UnicodeNormalization;

use crate::{
    LedgerError, ResultLedger,
    notify::{LogNotifier, Notifier},
};

mod access;
mod contributions;
mod release;
mod sweep;
mod targets;
mod transactions;
mod wallets;
mod withdrawals;

pub use contributions::ContributionReceipt;
pub use release::ReleaseOutcome;
pub use sweep::{SweepCounts, SweepReport};
pub use transactions::{EntrySpec, TransactionListFilter};
pub use wallets::BalanceAudit;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Stateless handle over the ledger database.
///
/// Every operation opens its own transaction; the engine itself holds no
/// mutable state, so it can be shared freely behind an `Arc`.
pub struct Engine {
    database: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) fn notify(&self, event: crate::notify::NotificationEvent) {
        self.notifier.notify(event);
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultLedger<String> {
    let mut collapsed = String::new();
    for token in value.split_whitespace() {
        if !collapsed.is_empty() {
            collapsed.push(' ');
        }
        collapsed.push_str(token);
    }
    let normalized: String = collapsed.nfc().collect();
    if normalized.is_empty() {
        return Err(LedgerError::InvalidAmount(format!(
            "{label} must not be empty"
        )));
    }
    Ok(normalized)
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.nfc().collect())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    notifier: Option<Arc<dyn Notifier>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Install a notifier; defaults to [`LogNotifier`] when omitted.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> EngineBuilder {
        self.notifier = Some(notifier);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultLedger<Engine> {
        Ok(Engine {
            database: self.database,
            notifier: self
                .notifier
                .unwrap_or_else(|| Arc::new(LogNotifier)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_collapsed() {
        assert_eq!(
            normalize_required_name("  Rent   fund ", "goal name").ok(),
            Some("Rent fund".to_string())
        );
        assert!(normalize_required_name("   ", "goal name").is_err());
    }

    #[test]
    fn optional_text_drops_blanks() {
        assert_eq!(normalize_optional_text(Some("  note ")), Some("note".to_string()));
        assert_eq!(normalize_optional_text(Some("   ")), None);
        assert_eq!(normalize_optional_text(None), None);
    }
}
