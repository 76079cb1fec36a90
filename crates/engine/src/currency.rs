use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code shared by a group (or entity fleet) and its money
/// values.
///
/// Every computation is mono-currency: the engine never converts between
/// currencies, it only refuses mixed inputs. Currency is still modeled
/// explicitly to keep the data model future-proof.
///
/// ## Minor units
///
/// The engine stores monetary values as an `i64` number of **minor units**
/// (see [`MoneyCents`](crate::MoneyCents)). `minor_units()` returns how many
/// decimal digits are used when converting between:
/// - major units (human input/output, e.g. `10.50 EUR`)
/// - minor units (stored integers, e.g. `1050`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Eur | Currency::Usd => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            other => Err(EngineError::CurrencyMismatch(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

/// Ensure an item's currency matches the currency of its group or fleet.
pub(crate) fn ensure_currency(expected: Currency, actual: Currency) -> Result<(), EngineError> {
    if expected != actual {
        return Err(EngineError::CurrencyMismatch(format!(
            "expected {}, got {}",
            expected.code(),
            actual.code()
        )));
    }
    Ok(())
}
