//! Expense and settlement records.
//!
//! An [`Expense`] is an atomic shared cost: one payer fronted the total and
//! every split share says what a participant owes for it. Expenses are
//! immutable once created except for the `settled` flag.
//!
//! A [`Settlement`] is a *recorded* payment between two members, produced by
//! the calling layer after a user confirmed a suggestion; it feeds back into
//! the ledger and discharges what `from` owed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, MoneyCents, ResultEngine, SplitShare};

/// A shared expense.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: String,
    pub total: MoneyCents,
    pub currency: Currency,
    pub payer_id: String,
    pub shares: Vec<SplitShare>,
    pub settled: bool,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_by: String,
}

impl Expense {
    /// Creates an expense from an already-computed split.
    ///
    /// Validates the pieces against each other: positive total, at least one
    /// share, no duplicate share member, and shares summing to the total
    /// exactly (the split calculator guarantees the latter; re-checking here
    /// keeps deserialized or hand-built expenses honest).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        group_id: String,
        total: MoneyCents,
        currency: Currency,
        payer_id: String,
        shares: Vec<SplitShare>,
        occurred_at: DateTime<Utc>,
        note: Option<String>,
        created_by: String,
    ) -> ResultEngine<Self> {
        if !total.is_positive() {
            return Err(EngineError::InvalidAmount(
                "expense total must be greater than zero".to_string(),
            ));
        }
        if shares.is_empty() {
            return Err(EngineError::InvalidSplit(
                "an expense needs at least one split share".to_string(),
            ));
        }
        for (index, share) in shares.iter().enumerate() {
            if shares[..index].iter().any(|s| s.member_id == share.member_id) {
                return Err(EngineError::InvalidSplit(format!(
                    "duplicate participant: {}",
                    share.member_id
                )));
            }
        }
        let allocated: MoneyCents = shares.iter().map(|s| s.amount).sum();
        if allocated != total {
            return Err(EngineError::InvalidSplit(
                "split shares must sum to the expense total".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            total,
            currency,
            payer_id,
            shares,
            settled: false,
            occurred_at,
            note,
            created_by,
        })
    }

    /// Marks the expense as settled; settled expenses no longer contribute
    /// to balances.
    pub fn mark_settled(&mut self) {
        self.settled = true;
    }
}

/// A recorded payment between two members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: Uuid,
    pub group_id: String,
    pub from_id: String,
    pub to_id: String,
    pub amount: MoneyCents,
    pub currency: Currency,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl Settlement {
    pub fn new(
        group_id: String,
        from_id: String,
        to_id: String,
        amount: MoneyCents,
        currency: Currency,
        occurred_at: DateTime<Utc>,
        note: Option<String>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "settlement amount must be greater than zero".to_string(),
            ));
        }
        if from_id == to_id {
            return Err(EngineError::InvalidAmount(
                "from and to must be different members".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            from_id,
            to_id,
            amount,
            currency,
            occurred_at,
            note,
        })
    }
}
