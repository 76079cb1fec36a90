//! The module contains the `Entity` record for the cashflow path.

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, MoneyCents, ResultEngine};

/// Months of runway reported when an entity has no burn.
pub const RUNWAY_SENTINEL_MONTHS: f64 = 999.0;

/// An independent business entity in a cashflow fleet.
///
/// Carries actual cash plus the trailing monthly burn; runway is derived,
/// never stored. The fleet equivalent of a group member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub cash: MoneyCents,
    pub monthly_burn: MoneyCents,
    pub currency: Currency,
}

impl Entity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cash: MoneyCents,
        monthly_burn: MoneyCents,
        currency: Currency,
    ) -> ResultEngine<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EngineError::InvalidAmount(
                "entity id must not be empty".to_string(),
            ));
        }
        if monthly_burn.is_negative() {
            return Err(EngineError::InvalidAmount(
                "monthly burn must not be negative".to_string(),
            ));
        }
        Ok(Self {
            id,
            name: name.into(),
            cash,
            monthly_burn,
            currency,
        })
    }

    /// Months of cash left at the current burn rate.
    ///
    /// Clamped to [`RUNWAY_SENTINEL_MONTHS`] — an entity that burns nothing
    /// reports the sentinel instead of dividing by zero.
    #[must_use]
    pub fn runway_months(&self) -> f64 {
        if !self.monthly_burn.is_positive() {
            return RUNWAY_SENTINEL_MONTHS;
        }
        let months = self.cash.cents() as f64 / self.monthly_burn.cents() as f64;
        months.min(RUNWAY_SENTINEL_MONTHS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runway_is_cash_over_burn() {
        let entity = Entity::new(
            "ops",
            "Ops GmbH",
            MoneyCents::new(60_000_00),
            MoneyCents::new(10_000_00),
            Currency::Eur,
        )
        .unwrap();
        assert!((entity.runway_months() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_burn_reports_the_sentinel() {
        let entity = Entity::new(
            "hold",
            "Holding",
            MoneyCents::new(1_00),
            MoneyCents::ZERO,
            Currency::Eur,
        )
        .unwrap();
        assert_eq!(entity.runway_months(), RUNWAY_SENTINEL_MONTHS);
    }

    #[test]
    fn negative_burn_is_rejected() {
        let err = Entity::new(
            "ops",
            "Ops GmbH",
            MoneyCents::ZERO,
            MoneyCents::new(-1),
            Currency::Eur,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("monthly burn must not be negative".to_string())
        );
    }
}
