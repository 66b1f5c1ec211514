use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// ISO-like currency code shared by wallets, goals and groups.
///
/// Only `NGN` exists today, but every row stores its code explicitly and
/// every read re-validates it.
///
/// Monetary values are an `i64` number of **minor units** (see `MoneyMinor`);
/// `minor_units()` says how many fraction digits separate major from minor,
/// e.g. `10.50 NGN` is stored as `1050` kobo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Ngn,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Ngn => "NGN",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    ///
    /// Example: NGN uses 2 fraction digits (kobo).
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Ngn => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "NGN" => Ok(Currency::Ngn),
            other => Err(LedgerError::InvalidAmount(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}
