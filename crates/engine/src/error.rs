//! The module contains the error the engine can throw.
//!
//! Two families exist:
//!
//! - validation errors ([`InvalidAmount`], [`InvalidSplit`],
//!   [`InvalidAllocation`], [`UnknownMember`], [`GroupMismatch`],
//!   [`CurrencyMismatch`]): malformed or inconsistent caller input. Messages
//!   are written in user terms and may be surfaced verbatim.
//! - [`InvariantViolation`]: a post-condition failed. This is a defect inside
//!   the engine, never a user error; it is logged at error level before being
//!   returned.
//!
//! [`InvalidAmount`]: EngineError::InvalidAmount
//! [`InvalidSplit`]: EngineError::InvalidSplit
//! [`InvalidAllocation`]: EngineError::InvalidAllocation
//! [`UnknownMember`]: EngineError::UnknownMember
//! [`GroupMismatch`]: EngineError::GroupMismatch
//! [`CurrencyMismatch`]: EngineError::CurrencyMismatch
//! [`InvariantViolation`]: EngineError::InvariantViolation
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),
    #[error("\"{0}\" member not found!")]
    UnknownMember(String),
    #[error("Group mismatch: {0}")]
    GroupMismatch(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl EngineError {
    /// Returns `true` when the error was caused by caller input.
    ///
    /// Validation errors are safe to surface to end users; an
    /// [`InvariantViolation`](EngineError::InvariantViolation) is not — it
    /// signals an internal defect and should be treated as fatal to the
    /// operation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::InvariantViolation(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidSplit(a), Self::InvalidSplit(b)) => a == b,
            (Self::InvalidAllocation(a), Self::InvalidAllocation(b)) => a == b,
            (Self::UnknownMember(a), Self::UnknownMember(b)) => a == b,
            (Self::GroupMismatch(a), Self::GroupMismatch(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::InvariantViolation(a), Self::InvariantViolation(b)) => a == b,
            _ => false,
        }
    }
}
