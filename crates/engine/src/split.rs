//! Expense splitting.
//!
//! [`split`] turns `(total, method, participants)` into the exact per-member
//! owed amounts. Whatever the method, the returned shares sum to the input
//! total in minor units — no cent is ever lost or invented:
//!
//! - `equal`: `base = floor(total / n)`; the first `total - base * n`
//!   participants (input order) pay one cent more.
//! - `exact`: every participant states their amount; a one-cent input residue
//!   is folded into the last participant.
//! - `percentage` / `shares`: per-member `round(total * weight)`, with the
//!   rounding remainder assigned to the last participant.
//!
//! Percentages arrive as floats from the caller and are converted to basis
//! points here; all arithmetic past that conversion is integer-exact.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine};

/// Tolerance for participant-supplied percentage sums: one basis point
/// (0.01%).
const PERCENTAGE_TOLERANCE_BPS: i64 = 1;
const FULL_PERCENTAGE_BPS: i64 = 10_000;

/// Tolerance for participant-supplied exact amounts: one minor unit.
const EXACT_TOLERANCE: MoneyCents = MoneyCents::new(1);

/// How an expense total is divided among its participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethod {
    Equal,
    Exact,
    Percentage,
    Shares,
}

impl SplitMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Exact => "exact",
            Self::Percentage => "percentage",
            Self::Shares => "shares",
        }
    }
}

impl TryFrom<&str> for SplitMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "equal" => Ok(Self::Equal),
            "exact" => Ok(Self::Exact),
            "percentage" => Ok(Self::Percentage),
            "shares" => Ok(Self::Shares),
            other => Err(EngineError::InvalidSplit(format!(
                "invalid split method: {other}"
            ))),
        }
    }
}

/// One participant of a split.
///
/// Which optional field is read depends on the [`SplitMethod`]: `amount` for
/// exact splits, `percentage` for percentage splits, `shares` for share
/// splits. `equal` reads none of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticipantInput {
    pub member_id: String,
    pub amount: Option<MoneyCents>,
    pub percentage: Option<f64>,
    pub shares: Option<u32>,
}

impl ParticipantInput {
    pub fn equal(member_id: impl Into<String>) -> Self {
        Self {
            member_id: member_id.into(),
            amount: None,
            percentage: None,
            shares: None,
        }
    }

    pub fn exact(member_id: impl Into<String>, amount: MoneyCents) -> Self {
        Self {
            amount: Some(amount),
            ..Self::equal(member_id)
        }
    }

    pub fn percentage(member_id: impl Into<String>, percentage: f64) -> Self {
        Self {
            percentage: Some(percentage),
            ..Self::equal(member_id)
        }
    }

    pub fn shares(member_id: impl Into<String>, shares: u32) -> Self {
        Self {
            shares: Some(shares),
            ..Self::equal(member_id)
        }
    }
}

/// One member's owed amount within an expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitShare {
    pub member_id: String,
    pub amount: MoneyCents,
}

/// Divides `total` among `participants` according to `method`.
///
/// Pure function: no side effects, deterministic in input order. Fails with a
/// validation error (never panics) on inconsistent input; error messages are
/// written in user terms.
pub fn split(
    total: MoneyCents,
    method: SplitMethod,
    participants: &[ParticipantInput],
) -> ResultEngine<Vec<SplitShare>> {
    if !total.is_positive() {
        return Err(EngineError::InvalidSplit(
            "expense total must be greater than zero".to_string(),
        ));
    }
    if participants.is_empty() {
        return Err(EngineError::InvalidSplit(
            "at least one participant is required".to_string(),
        ));
    }
    let mut seen = HashSet::with_capacity(participants.len());
    for participant in participants {
        if !seen.insert(participant.member_id.as_str()) {
            return Err(EngineError::InvalidSplit(format!(
                "duplicate participant: {}",
                participant.member_id
            )));
        }
    }

    let amounts = match method {
        SplitMethod::Equal => total.split_even(participants.len()),
        SplitMethod::Exact => exact_amounts(total, participants)?,
        SplitMethod::Percentage => percentage_amounts(total, participants)?,
        SplitMethod::Shares => share_amounts(total, participants)?,
    };

    debug_assert_eq!(amounts.iter().copied().sum::<MoneyCents>(), total);

    Ok(participants
        .iter()
        .zip(amounts)
        .map(|(participant, amount)| SplitShare {
            member_id: participant.member_id.clone(),
            amount,
        })
        .collect())
}

fn exact_amounts(
    total: MoneyCents,
    participants: &[ParticipantInput],
) -> ResultEngine<Vec<MoneyCents>> {
    let mut amounts = Vec::with_capacity(participants.len());
    for participant in participants {
        let amount = participant.amount.ok_or_else(|| {
            EngineError::InvalidSplit(format!(
                "participant \"{}\" is missing an amount for an exact split",
                participant.member_id
            ))
        })?;
        amounts.push(amount);
    }

    let allocated: MoneyCents = amounts.iter().copied().sum();
    if (allocated - total).abs() > EXACT_TOLERANCE {
        return Err(EngineError::InvalidSplit(
            "amounts must sum to the expense total".to_string(),
        ));
    }
    if let Some(last) = amounts.last_mut() {
        *last += total - allocated;
    }
    Ok(amounts)
}

fn percentage_amounts(
    total: MoneyCents,
    participants: &[ParticipantInput],
) -> ResultEngine<Vec<MoneyCents>> {
    let mut basis_points = Vec::with_capacity(participants.len());
    for participant in participants {
        let percentage = participant.percentage.ok_or_else(|| {
            EngineError::InvalidSplit(format!(
                "participant \"{}\" is missing a percentage",
                participant.member_id
            ))
        })?;
        if !percentage.is_finite() || !(0.0..=100.0).contains(&percentage) {
            return Err(EngineError::InvalidSplit(
                "percentages must be numbers between 0 and 100".to_string(),
            ));
        }
        basis_points.push((percentage * 100.0).round() as i64);
    }

    let total_bps: i64 = basis_points.iter().sum();
    if (total_bps - FULL_PERCENTAGE_BPS).abs() > PERCENTAGE_TOLERANCE_BPS {
        return Err(EngineError::InvalidSplit(
            "percentages must sum to 100".to_string(),
        ));
    }

    let mut amounts: Vec<MoneyCents> = basis_points
        .iter()
        .map(|bps| total.scale_ratio(*bps, FULL_PERCENTAGE_BPS))
        .collect();
    let allocated: MoneyCents = amounts.iter().copied().sum();
    if let Some(last) = amounts.last_mut() {
        *last += total - allocated;
    }
    Ok(amounts)
}

fn share_amounts(
    total: MoneyCents,
    participants: &[ParticipantInput],
) -> ResultEngine<Vec<MoneyCents>> {
    let mut weights = Vec::with_capacity(participants.len());
    for participant in participants {
        let shares = participant.shares.ok_or_else(|| {
            EngineError::InvalidSplit(format!(
                "participant \"{}\" is missing a share count",
                participant.member_id
            ))
        })?;
        weights.push(u64::from(shares));
    }

    if weights.iter().sum::<u64>() == 0 {
        return Err(EngineError::InvalidSplit(
            "total shares must be greater than zero".to_string(),
        ));
    }
    total.allocate_proportionally(&weights)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn cents(values: &[i64]) -> Vec<MoneyCents> {
        values.iter().copied().map(MoneyCents::new).collect()
    }

    #[rstest]
    #[case::equal_remainder_front_loaded(
        100_00,
        SplitMethod::Equal,
        vec![
            ParticipantInput::equal("a"),
            ParticipantInput::equal("b"),
            ParticipantInput::equal("c"),
        ],
        &[33_34, 33_33, 33_33]
    )]
    #[case::exact_amounts_pass_through(
        90_00,
        SplitMethod::Exact,
        vec![
            ParticipantInput::exact("a", MoneyCents::new(60_00)),
            ParticipantInput::exact("b", MoneyCents::new(30_00)),
        ],
        &[60_00, 30_00]
    )]
    #[case::percentage_remainder_goes_last(
        1000_00,
        SplitMethod::Percentage,
        vec![
            ParticipantInput::percentage("a", 33.33),
            ParticipantInput::percentage("b", 33.33),
            ParticipantInput::percentage("c", 33.34),
        ],
        &[333_30, 333_30, 333_40]
    )]
    #[case::shares_two_to_one(
        30_00,
        SplitMethod::Shares,
        vec![
            ParticipantInput::shares("a", 2),
            ParticipantInput::shares("b", 1),
        ],
        &[20_00, 10_00]
    )]
    fn split_cases(
        #[case] total: i64,
        #[case] method: SplitMethod,
        #[case] participants: Vec<ParticipantInput>,
        #[case] expected: &[i64],
    ) {
        let shares = split(MoneyCents::new(total), method, &participants).unwrap();

        let amounts: Vec<MoneyCents> = shares.iter().map(|s| s.amount).collect();
        assert_eq!(amounts, cents(expected));
        assert_eq!(
            amounts.into_iter().sum::<MoneyCents>(),
            MoneyCents::new(total)
        );
    }

    #[test]
    fn equal_split_requires_participants() {
        let err = split(MoneyCents::new(100), SplitMethod::Equal, &[]).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidSplit("at least one participant is required".to_string())
        );
    }

    #[test]
    fn percentages_must_sum_to_one_hundred() {
        let participants = [
            ParticipantInput::percentage("a", 50.0),
            ParticipantInput::percentage("b", 40.0),
        ];
        let err = split(MoneyCents::new(100_00), SplitMethod::Percentage, &participants)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidSplit("percentages must sum to 100".to_string())
        );
    }

    #[test]
    fn percentage_sum_tolerates_one_basis_point() {
        // 33.33 * 3 = 99.99, inside the 0.01 tolerance.
        let participants = [
            ParticipantInput::percentage("a", 33.33),
            ParticipantInput::percentage("b", 33.33),
            ParticipantInput::percentage("c", 33.33),
        ];
        let shares = split(MoneyCents::new(100_00), SplitMethod::Percentage, &participants)
            .unwrap();
        let sum: MoneyCents = shares.iter().map(|s| s.amount).sum();
        assert_eq!(sum, MoneyCents::new(100_00));
    }

    #[test]
    fn exact_amounts_must_match_total() {
        let participants = [
            ParticipantInput::exact("a", MoneyCents::new(10_00)),
            ParticipantInput::exact("b", MoneyCents::new(10_00)),
        ];
        let err = split(MoneyCents::new(30_00), SplitMethod::Exact, &participants).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidSplit("amounts must sum to the expense total".to_string())
        );
    }

    #[test]
    fn exact_one_cent_residue_lands_on_last_participant() {
        let participants = [
            ParticipantInput::exact("a", MoneyCents::new(10_00)),
            ParticipantInput::exact("b", MoneyCents::new(9_99)),
        ];
        let shares = split(MoneyCents::new(20_00), SplitMethod::Exact, &participants).unwrap();
        assert_eq!(shares[0].amount, MoneyCents::new(10_00));
        assert_eq!(shares[1].amount, MoneyCents::new(10_00));
    }

    #[test]
    fn zero_total_shares_is_rejected() {
        let participants = [
            ParticipantInput::shares("a", 0),
            ParticipantInput::shares("b", 0),
        ];
        let err = split(MoneyCents::new(10_00), SplitMethod::Shares, &participants).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidSplit("total shares must be greater than zero".to_string())
        );
    }

    #[test]
    fn duplicate_participants_are_rejected() {
        let participants = [
            ParticipantInput::equal("a"),
            ParticipantInput::equal("a"),
        ];
        let err = split(MoneyCents::new(10_00), SplitMethod::Equal, &participants).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidSplit("duplicate participant: a".to_string())
        );
    }

    #[test]
    fn missing_method_field_is_reported_per_participant() {
        let participants = [ParticipantInput::equal("a")];
        let err = split(MoneyCents::new(10_00), SplitMethod::Exact, &participants).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidSplit(
                "participant \"a\" is missing an amount for an exact split".to_string()
            )
        );
    }
}
