//! Debt simplification for a group.
//!
//! Turns a balance map into a short list of suggested payments that, if all
//! executed, discharge every debt. Suggestions are ephemeral: the calling
//! layer decides whether a user confirms one, records the resulting
//! [`Settlement`](crate::Settlement), and recomputes balances.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    MoneyCents,
    netting::{NetPosition, match_positions},
};

/// A suggested payment between two members. Engine output only — no id, no
/// timestamp, no prose; the annotation and persistence layers add their own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedSettlement {
    pub from_id: String,
    pub to_id: String,
    pub amount: MoneyCents,
}

/// Reduces a balance map to a minimal-count list of payments.
///
/// Greedy largest-debtor-to-largest-creditor matching: deterministic, at
/// most `members with nonzero balance - 1` transfers, every balance
/// discharged to zero. The true global minimum is a stated non-goal.
pub fn suggest_settlements(balances: &BTreeMap<String, MoneyCents>) -> Vec<SuggestedSettlement> {
    let positions = balances
        .iter()
        .map(|(id, net)| NetPosition {
            id: id.clone(),
            net: *net,
        })
        .collect();

    let transfers = match_positions(positions, MoneyCents::new(1));
    tracing::debug!(
        members = balances.len(),
        transfers = transfers.len(),
        "settlement suggestion computed"
    );

    transfers
        .into_iter()
        .map(|transfer| SuggestedSettlement {
            from_id: transfer.from_id,
            to_id: transfer.to_id,
            amount: transfer.amount,
        })
        .collect()
}
