//! Fleet cashflow allocation.
//!
//! Generalizes debt netting to independent business entities: instead of
//! balances, each entity's excess or need is computed relative to a
//! goal-specific target, then the same largest-to-largest matching as the
//! peer settlement path applies.
//!
//! Every strategy respects two constraints: no donor is drawn below
//! `min_cash_per_entity`, and no transfer below `min_transfer` is proposed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, Entity, MoneyCents, ResultEngine,
    currency::ensure_currency,
    netting::{MatchedTransfer, NetPosition, match_positions},
};

/// Runway below which an entity needs rescuing.
const CRITICAL_RUNWAY_MONTHS: i64 = 3;
/// Where a rescue tops a critical entity up to under `MaximizeRunway`.
const RESCUE_TARGET_MONTHS: i64 = 6;
/// Runway above which an entity can donate under `MaximizeRunway`.
const DONOR_RUNWAY_MONTHS: i64 = 12;
/// Donors are never drawn below this many months of burn.
const DONOR_RESERVE_MONTHS: i64 = 9;
/// Runway above which an entity can donate under `Balanced`.
const BALANCED_DONOR_MONTHS: i64 = 9;

/// What the allocator optimizes for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationGoal {
    MaximizeRunway,
    MinimizeRisk,
    Balanced,
}

impl AllocationGoal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MaximizeRunway => "maximize_runway",
            Self::MinimizeRisk => "minimize_risk",
            Self::Balanced => "balanced",
        }
    }
}

impl TryFrom<&str> for AllocationGoal {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "maximize_runway" => Ok(Self::MaximizeRunway),
            "minimize_risk" => Ok(Self::MinimizeRisk),
            "balanced" => Ok(Self::Balanced),
            other => Err(EngineError::InvalidAllocation(format!(
                "invalid allocation goal: {other}"
            ))),
        }
    }
}

/// Hard limits every proposed transfer respects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationConstraints {
    /// Cash every entity keeps no matter what.
    pub min_cash_per_entity: MoneyCents,
    /// Transfers below this are not worth the administrative overhead.
    pub min_transfer: MoneyCents,
}

/// Machine-readable justification attached to a proposed transfer.
///
/// The engine never phrases prose; the recommendation layer downstream may
/// turn these payloads into sentences.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferReason {
    /// The recipient sat below the critical runway threshold; the payload is
    /// its pre-transfer runway.
    CriticalRescue { runway_months: f64 },
    /// The recipient sat below the fleet's blended cash target by this much.
    RiskRebalance { shortfall: MoneyCents },
}

/// A proposed cash move between two entities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityTransfer {
    pub from_id: String,
    pub to_id: String,
    pub amount: MoneyCents,
    pub reason: TransferReason,
}

/// Proposes cash transfers across the fleet for the given goal.
///
/// Single-shot pure computation: nothing is retried or persisted. Fails with
/// a validation error on fewer than two entities, duplicate ids or mixed
/// currencies.
pub fn allocate(
    entities: &[Entity],
    goal: AllocationGoal,
    constraints: &AllocationConstraints,
) -> ResultEngine<Vec<EntityTransfer>> {
    if entities.len() < 2 {
        return Err(EngineError::InvalidAllocation(
            "at least two entities are required".to_string(),
        ));
    }
    for (index, entity) in entities.iter().enumerate() {
        if entities[..index].iter().any(|e| e.id == entity.id) {
            return Err(EngineError::InvalidAllocation(format!(
                "duplicate entity id: {}",
                entity.id
            )));
        }
    }
    let currency = entities[0].currency;
    for entity in entities {
        ensure_currency(currency, entity.currency)?;
    }

    let transfers = match goal {
        AllocationGoal::MaximizeRunway => rescue_pass(
            entities,
            constraints,
            DONOR_RUNWAY_MONTHS,
            RESCUE_TARGET_MONTHS,
        ),
        AllocationGoal::Balanced => rescue_pass(
            entities,
            constraints,
            BALANCED_DONOR_MONTHS,
            CRITICAL_RUNWAY_MONTHS,
        ),
        AllocationGoal::MinimizeRisk => risk_pass(entities, constraints),
    };

    tracing::debug!(
        goal = goal.as_str(),
        entities = entities.len(),
        transfers = transfers.len(),
        "cash allocation computed"
    );
    Ok(transfers)
}

/// Critical-rescue matching: entities under [`CRITICAL_RUNWAY_MONTHS`] are
/// topped up to `target_months` of burn, drawing on entities above
/// `donor_months` (down to [`DONOR_RESERVE_MONTHS`], never below the
/// configured minimum cash).
fn rescue_pass(
    entities: &[Entity],
    constraints: &AllocationConstraints,
    donor_months: i64,
    target_months: i64,
) -> Vec<EntityTransfer> {
    let mut positions = Vec::new();
    let mut recipient_runway: HashMap<&str, f64> = HashMap::new();

    for entity in entities {
        if entity.monthly_burn.is_positive()
            && entity.cash < entity.monthly_burn * CRITICAL_RUNWAY_MONTHS
        {
            let need = entity.monthly_burn * target_months - entity.cash;
            recipient_runway.insert(entity.id.as_str(), entity.runway_months());
            positions.push(NetPosition {
                id: entity.id.clone(),
                net: need,
            });
        } else if entity.cash > entity.monthly_burn * donor_months {
            let reserve =
                (entity.monthly_burn * DONOR_RESERVE_MONTHS).max(constraints.min_cash_per_entity);
            let surplus = entity.cash - reserve;
            if surplus.is_positive() {
                positions.push(NetPosition {
                    id: entity.id.clone(),
                    net: -surplus,
                });
            }
        }
    }

    with_reasons(
        match_positions(positions, constraints.min_transfer),
        |recipient_id| TransferReason::CriticalRescue {
            runway_months: recipient_runway.get(recipient_id).copied().unwrap_or(0.0),
        },
    )
}

/// Blended-target matching: the fleet-wide target runway is
/// `total_cash / total_burn`; entities hold `burn * target` and any
/// deviation beyond the transfer floor is leveled out.
fn risk_pass(entities: &[Entity], constraints: &AllocationConstraints) -> Vec<EntityTransfer> {
    let total_cash: MoneyCents = entities.iter().map(|e| e.cash).sum();
    let total_burn: MoneyCents = entities.iter().map(|e| e.monthly_burn).sum();
    if !total_burn.is_positive() {
        // Nothing burns, so there is no blended target to level towards.
        return Vec::new();
    }

    let mut positions = Vec::new();
    let mut shortfalls: HashMap<&str, MoneyCents> = HashMap::new();

    for entity in entities {
        let target = entity
            .monthly_burn
            .scale_ratio(total_cash.cents(), total_burn.cents());
        let deviation = entity.cash - target;
        if deviation > constraints.min_transfer {
            let spare = deviation.min(entity.cash - constraints.min_cash_per_entity);
            if spare.is_positive() {
                positions.push(NetPosition {
                    id: entity.id.clone(),
                    net: -spare,
                });
            }
        } else if deviation < -constraints.min_transfer {
            shortfalls.insert(entity.id.as_str(), -deviation);
            positions.push(NetPosition {
                id: entity.id.clone(),
                net: -deviation,
            });
        }
    }

    with_reasons(
        match_positions(positions, constraints.min_transfer),
        |recipient_id| TransferReason::RiskRebalance {
            shortfall: shortfalls
                .get(recipient_id)
                .copied()
                .unwrap_or(MoneyCents::ZERO),
        },
    )
}

fn with_reasons(
    transfers: Vec<MatchedTransfer>,
    reason_for: impl Fn(&str) -> TransferReason,
) -> Vec<EntityTransfer> {
    transfers
        .into_iter()
        .map(|transfer| {
            let reason = reason_for(transfer.to_id.as_str());
            EntityTransfer {
                from_id: transfer.from_id,
                to_id: transfer.to_id,
                amount: transfer.amount,
                reason,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::Currency;

    use super::*;

    fn entity(id: &str, cash: i64, burn: i64) -> Entity {
        Entity::new(
            id,
            id.to_uppercase(),
            MoneyCents::new(cash),
            MoneyCents::new(burn),
            Currency::Eur,
        )
        .unwrap()
    }

    fn constraints(min_cash: i64, min_transfer: i64) -> AllocationConstraints {
        AllocationConstraints {
            min_cash_per_entity: MoneyCents::new(min_cash),
            min_transfer: MoneyCents::new(min_transfer),
        }
    }

    #[test]
    fn requires_two_entities() {
        let err = allocate(
            &[entity("solo", 100_00, 10_00)],
            AllocationGoal::MaximizeRunway,
            &constraints(0, 0),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAllocation("at least two entities are required".to_string())
        );
    }

    #[test]
    fn rescue_tops_critical_entity_up_to_six_months() {
        // donor: 20 months of runway; critical: 1 month.
        let fleet = [
            entity("donor", 200_000_00, 10_000_00),
            entity("crit", 10_000_00, 10_000_00),
        ];

        let transfers = allocate(
            &fleet,
            AllocationGoal::MaximizeRunway,
            &constraints(5_000_00, 1_000_00),
        )
        .unwrap();

        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].from_id, "donor");
        assert_eq!(transfers[0].to_id, "crit");
        // need = burn * 6 - cash = 50_000.00
        assert_eq!(transfers[0].amount, MoneyCents::new(50_000_00));
        assert!(matches!(
            transfers[0].reason,
            TransferReason::CriticalRescue { runway_months } if (runway_months - 1.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn donor_is_never_drawn_below_min_cash() {
        let fleet = [
            entity("donor", 100_000_00, 5_000_00),
            entity("crit", 1_000_00, 10_000_00),
        ];

        let transfers = allocate(
            &fleet,
            AllocationGoal::MaximizeRunway,
            &constraints(95_000_00, 1_00),
        )
        .unwrap();

        // The donor can spare only 5_000.00 above its configured minimum,
        // even though the critical entity needs 59_000.00.
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].amount, MoneyCents::new(5_000_00));
    }

    #[test]
    fn transfers_below_the_floor_are_suppressed() {
        let fleet = [
            entity("donor", 200_000_00, 10_000_00),
            entity("crit", 29_999_00, 10_000_00),
        ];

        // need = 30_001.00, but the floor is higher.
        let transfers = allocate(
            &fleet,
            AllocationGoal::MaximizeRunway,
            &constraints(0, 50_000_00),
        )
        .unwrap();
        assert!(transfers.is_empty());
    }

    #[test]
    fn balanced_rescues_to_three_months_with_nearer_donors() {
        let fleet = [
            entity("donor", 100_000_00, 10_000_00), // 10 months
            entity("crit", 20_000_00, 10_000_00),   // 2 months
        ];

        // Under MaximizeRunway a 10-month donor does not qualify.
        let maximize = allocate(
            &fleet,
            AllocationGoal::MaximizeRunway,
            &constraints(0, 1_00),
        )
        .unwrap();
        assert!(maximize.is_empty());

        // Balanced accepts donors above nine months and only tops up to
        // three months of burn.
        let balanced = allocate(&fleet, AllocationGoal::Balanced, &constraints(0, 1_00)).unwrap();
        assert_eq!(balanced.len(), 1);
        assert_eq!(balanced[0].amount, MoneyCents::new(10_000_00));
    }

    #[test]
    fn minimize_risk_levels_toward_the_blended_target() {
        let fleet = [
            entity("a", 100_000_00, 10_000_00),
            entity("b", 20_000_00, 10_000_00),
        ];

        // Blended runway = 120_000 / 20_000 = 6 months; both targets are
        // 60_000.00.
        let transfers = allocate(
            &fleet,
            AllocationGoal::MinimizeRisk,
            &constraints(10_000_00, 1_000_00),
        )
        .unwrap();

        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].from_id, "a");
        assert_eq!(transfers[0].to_id, "b");
        assert_eq!(transfers[0].amount, MoneyCents::new(40_000_00));
        assert_eq!(
            transfers[0].reason,
            TransferReason::RiskRebalance {
                shortfall: MoneyCents::new(40_000_00)
            }
        );
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let mut fleet = vec![
            entity("a", 100_000_00, 10_000_00),
            entity("b", 20_000_00, 10_000_00),
        ];
        fleet[1].currency = Currency::Usd;

        let err = allocate(
            &fleet,
            AllocationGoal::MinimizeRisk,
            &constraints(0, 0),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::CurrencyMismatch(_)));
    }

    #[test]
    fn duplicate_entity_ids_are_rejected() {
        let fleet = [
            entity("a", 100_00, 10_00),
            entity("a", 200_00, 10_00),
        ];
        let err = allocate(&fleet, AllocationGoal::Balanced, &constraints(0, 0)).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAllocation("duplicate entity id: a".to_string())
        );
    }

    #[test]
    fn zero_burn_entities_never_go_critical() {
        let fleet = [
            entity("idle", -5_000_00, 0),
            entity("donor", 200_000_00, 10_000_00),
        ];

        let transfers = allocate(
            &fleet,
            AllocationGoal::MaximizeRunway,
            &constraints(0, 1_00),
        )
        .unwrap();
        assert!(transfers.is_empty());
    }
}
