//! Balance derivation.
//!
//! Recomputes per-member balances for a group from the ledger (open expenses
//! plus recorded settlements). Positive = the member is owed money, negative
//! = the member owes money.
//!
//! Balances are a **derivation**, never stored state: the same immutable
//! inputs always produce the same map, and the engine never mutates a stored
//! balance. Callers that cache the result own the invalidation, and callers
//! that persist settlements must serialize writes per group — two
//! concurrently confirmed settlements for one group race at the storage
//! layer, not here.

use std::collections::BTreeMap;

use crate::{
    EngineError, Expense, Group, MoneyCents, ResultEngine, Settlement,
    currency::ensure_currency,
};

/// Signed balance contributions of one expense: the payer advanced the full
/// total, every participant owes their share. A payer who is also a
/// participant nets out naturally.
pub fn expense_deltas(expense: &Expense) -> Vec<(&str, MoneyCents)> {
    let mut deltas = Vec::with_capacity(expense.shares.len() + 1);
    deltas.push((expense.payer_id.as_str(), expense.total));
    for share in &expense.shares {
        deltas.push((share.member_id.as_str(), -share.amount));
    }
    deltas
}

/// Signed balance contributions of one recorded settlement: paying
/// discharges what `from` owed (credit), and cancels what `to` was owed
/// (debit).
pub fn settlement_deltas(settlement: &Settlement) -> [(&str, MoneyCents); 2] {
    [
        (settlement.from_id.as_str(), settlement.amount),
        (settlement.to_id.as_str(), -settlement.amount),
    ]
}

/// Folds expenses and settlements into a net balance per group member.
///
/// - Settled expenses are skipped.
/// - Items from another group, in another currency, or referencing unknown
///   members are rejected as validation errors.
/// - Post-condition: balances sum to zero within one minor unit per member.
///   A violation means a defect in the engine (or hand-built inputs that
///   bypassed validation) and is returned as
///   [`EngineError::InvariantViolation`] after being logged.
pub fn compute_balances(
    group: &Group,
    expenses: &[Expense],
    settlements: &[Settlement],
) -> ResultEngine<BTreeMap<String, MoneyCents>> {
    let mut balances: BTreeMap<String, MoneyCents> = group
        .members
        .iter()
        .map(|member| (member.id.clone(), MoneyCents::ZERO))
        .collect();

    for expense in expenses {
        if expense.group_id != group.id {
            return Err(EngineError::GroupMismatch(format!(
                "expense {} does not belong to group {}",
                expense.id, group.id
            )));
        }
        ensure_currency(group.currency, expense.currency)?;
        if expense.settled {
            continue;
        }
        for (member_id, delta) in expense_deltas(expense) {
            apply(&mut balances, member_id, delta)?;
        }
    }

    for settlement in settlements {
        if settlement.group_id != group.id {
            return Err(EngineError::GroupMismatch(format!(
                "settlement {} does not belong to group {}",
                settlement.id, group.id
            )));
        }
        ensure_currency(group.currency, settlement.currency)?;
        for (member_id, delta) in settlement_deltas(settlement) {
            apply(&mut balances, member_id, delta)?;
        }
    }

    check_conservation(group, &balances)?;
    Ok(balances)
}

fn apply(
    balances: &mut BTreeMap<String, MoneyCents>,
    member_id: &str,
    delta: MoneyCents,
) -> ResultEngine<()> {
    match balances.get_mut(member_id) {
        Some(balance) => {
            *balance += delta;
            Ok(())
        }
        None => Err(EngineError::UnknownMember(member_id.to_string())),
    }
}

/// Balances must conserve to zero; the tolerance of one minor unit per
/// member absorbs a single rounding remainder per split.
fn check_conservation(
    group: &Group,
    balances: &BTreeMap<String, MoneyCents>,
) -> ResultEngine<()> {
    let residual: i64 = balances.values().map(|balance| balance.cents()).sum();
    let tolerance = balances.len() as i64;
    if residual.abs() > tolerance {
        tracing::error!(
            group_id = %group.id,
            residual_cents = residual,
            member_count = balances.len(),
            "balance conservation violated"
        );
        return Err(EngineError::InvariantViolation(format!(
            "group {} balances sum to {} cents",
            group.id, residual
        )));
    }
    Ok(())
}
