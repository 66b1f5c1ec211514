//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the ledger enforces consistent invariants.

use uuid::Uuid;

use crate::{Currency, LedgerError, ResultLedger};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultLedger<Uuid> {
    Uuid::parse_str(value).map_err(|_| LedgerError::InvalidId(format!("invalid {label} id")))
}

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
pub(crate) fn model_currency(value: &str) -> ResultLedger<Currency> {
    Currency::try_from(value)
        .map_err(|_| LedgerError::InvalidId(format!("stored currency \"{value}\"")))
}

/// Parse an optional JSON metadata column.
pub(crate) fn parse_metadata(raw: Option<&str>) -> ResultLedger<Option<serde_json::Value>> {
    match raw {
        None => Ok(None),
        Some(text) => serde_json::from_str(text)
            .map(Some)
            .map_err(|_| LedgerError::InvalidId("invalid transaction metadata".to_string())),
    }
}

/// Serialize optional JSON metadata for storage.
pub(crate) fn encode_metadata(value: Option<&serde_json::Value>) -> Option<String> {
    value.map(ToString::to_string)
}
