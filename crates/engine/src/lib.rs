//! Ledger & settlement engine.
//!
//! Pure computation over shared expenses and entity cashflows: splitting an
//! expense into exact per-member amounts ([`split`]), folding expenses and
//! recorded settlements into zero-sum balances ([`compute_balances`]),
//! reducing balances to a short list of payments ([`suggest_settlements`]),
//! and allocating cash across business entities under an optimization goal
//! ([`allocate`]).
//!
//! Every function is synchronous, deterministic and free of I/O; independent
//! groups and fleets share no state, so computations may run in parallel.
//! The engine has no transactional primitive: a caller that lets users
//! confirm settlements concurrently must serialize the
//! recompute-confirm-persist cycle per group (single-writer queue or an
//! optimistic version check) on its side.

pub use allocation::{
    AllocationConstraints, AllocationGoal, EntityTransfer, TransferReason, allocate,
};
pub use balances::{compute_balances, expense_deltas, settlement_deltas};
pub use currency::Currency;
pub use entities::{Entity, RUNWAY_SENTINEL_MONTHS};
pub use error::EngineError;
pub use expenses::{Expense, Settlement};
pub use members::{Group, Member};
pub use money::MoneyCents;
pub use settlement::{SuggestedSettlement, suggest_settlements};
pub use split::{ParticipantInput, SplitMethod, SplitShare, split};

mod allocation;
mod balances;
mod currency;
mod entities;
mod error;
mod expenses;
mod members;
mod money;
mod netting;
mod settlement;
mod split;

type ResultEngine<T> = Result<T, EngineError>;
