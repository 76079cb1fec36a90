use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine};

/// Signed money amount represented as **integer minor units** (cents).
///
/// Use this type for **all** monetary values in the engine (expense totals,
/// split shares, balances, entity cash) to avoid floating-point drift. Every
/// sum and comparison is integer-exact; fractional input is only accepted at
/// the parse boundary ([`MoneyCents::from_major`], [`FromStr`]) and rounded
/// to the nearest cent there.
///
/// The value is signed:
/// - positive = owed money / cash inflow
/// - negative = owing money / cash outflow
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, MoneyCents};
///
/// let amount = MoneyCents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// assert_eq!(amount.format(Currency::Eur), "12.34 EUR");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more than 2 decimals):
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value.
    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_sub(rhs.0).map(MoneyCents)
    }

    /// Converts a major-unit amount supplied by a caller (e.g. `10.50` read
    /// from a form or an upstream float field) into integer cents, rounding
    /// to the nearest cent.
    ///
    /// This is the only place floating input enters the engine; everything
    /// downstream of this conversion is integer-exact.
    pub fn from_major(value: f64) -> ResultEngine<Self> {
        if !value.is_finite() {
            return Err(EngineError::InvalidAmount(
                "amount must be a finite number".to_string(),
            ));
        }
        let cents = (value * 100.0).round();
        if cents.abs() >= i64::MAX as f64 {
            return Err(EngineError::InvalidAmount("amount too large".to_string()));
        }
        Ok(Self(cents as i64))
    }

    /// Multiplies by the exact ratio `num / den`, rounding half away from
    /// zero. `den` must be positive.
    ///
    /// Intermediate math is done in 128 bits, so no overflow occurs for any
    /// realistic amount/ratio combination.
    #[must_use]
    pub fn scale_ratio(self, num: i64, den: i64) -> Self {
        debug_assert!(den > 0, "scale_ratio denominator must be positive");
        Self(div_round_half_away(
            self.0 as i128 * num as i128,
            den as i128,
        ))
    }

    /// Divides the amount evenly over `n` positions.
    ///
    /// `base = floor(total / n)`; the first `total - base * n` positions (in
    /// order) receive `base + 1` cent, the rest receive `base`. The returned
    /// amounts always sum to `self` exactly. Splitting `100.00` three ways
    /// yields `[33.34, 33.33, 33.33]`.
    ///
    /// Returns an empty vector for `n == 0`; callers validate participant
    /// counts before splitting.
    #[must_use]
    pub fn split_even(self, n: usize) -> Vec<MoneyCents> {
        if n == 0 {
            return Vec::new();
        }
        let n_i64 = n as i64;
        let base = self.0.div_euclid(n_i64);
        let remainder = (self.0 - base * n_i64) as usize;
        (0..n)
            .map(|position| {
                if position < remainder {
                    MoneyCents(base + 1)
                } else {
                    MoneyCents(base)
                }
            })
            .collect()
    }

    /// Distributes the amount across `weights` proportionally.
    ///
    /// Each position receives `round(total * weight / total_weight)` (half
    /// away from zero); the rounding remainder `total - sum` is assigned to
    /// the **last** position so the returned amounts sum to `self` exactly.
    pub fn allocate_proportionally(self, weights: &[u64]) -> ResultEngine<Vec<MoneyCents>> {
        let total_weight: u128 = weights.iter().map(|w| u128::from(*w)).sum();
        if total_weight == 0 {
            return Err(EngineError::InvalidAmount(
                "total weight must be greater than zero".to_string(),
            ));
        }

        let mut amounts: Vec<MoneyCents> = weights
            .iter()
            .map(|weight| {
                MoneyCents(div_round_half_away(
                    self.0 as i128 * *weight as i128,
                    total_weight as i128,
                ))
            })
            .collect();

        let allocated: i64 = amounts.iter().map(|a| a.0).sum();
        if let Some(last) = amounts.last_mut() {
            last.0 += self.0 - allocated;
        }
        Ok(amounts)
    }

    /// Formats the amount with its currency code, e.g. `12.34 EUR`.
    #[must_use]
    pub fn format(self, currency: Currency) -> String {
        format!("{self} {}", currency.code())
    }
}

/// `num / den` rounded half away from zero. `den` must be positive.
fn div_round_half_away(num: i128, den: i128) -> i64 {
    let rounded = if num >= 0 {
        (2 * num + den) / (2 * den)
    } else {
        (2 * num - den) / (2 * den)
    };
    rounded as i64
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let major = abs / 100;
        let minor = abs % 100;
        write!(f, "{sign}{major}.{minor:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl Mul<i64> for MoneyCents {
    type Output = MoneyCents;

    fn mul(self, rhs: i64) -> Self::Output {
        MoneyCents(self.0 * rhs)
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        MoneyCents(iter.map(|m| m.0).sum())
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading
    /// `+`/`-`. Rejects empty strings and more than 2 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidAmount("empty amount".to_string()));
        }

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let rest = rest.replace(',', ".");
        let (major_str, minor_str) = match rest.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (rest.as_str(), ""),
        };

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if minor_str.len() > 2 || !minor_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(EngineError::InvalidAmount("too many decimals".to_string()));
        }

        let major: i64 = major_str.parse().map_err(|_| invalid())?;
        let minor: i64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => minor_str.parse().map_err(|_| invalid())?,
        };

        let total = major
            .checked_mul(100)
            .and_then(|v| v.checked_add(minor))
            .ok_or_else(overflow)?;

        Ok(MoneyCents(if negative { -total } else { total }))
    }
}
