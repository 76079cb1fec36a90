//! The module contains the `Member` and `Group` records.
//!
//! A member is an opaque identifier plus a display name and carries no
//! behavior; the id is what every balance map and transfer refers to. A group
//! is the unit of computation for the peer-settlement path: the roster of
//! members plus the single currency all of its expenses and settlements use.

use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine};

/// A group member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
}

impl Member {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A group of members sharing expenses.
///
/// The engine treats the group as read-only input: membership changes,
/// persistence and authorization belong to the calling layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub currency: Currency,
    pub members: Vec<Member>,
}

impl Group {
    /// Builds a group, rejecting duplicate or empty member ids.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        currency: Currency,
        members: Vec<Member>,
    ) -> ResultEngine<Self> {
        for (index, member) in members.iter().enumerate() {
            if member.id.trim().is_empty() {
                return Err(EngineError::InvalidAmount(
                    "member id must not be empty".to_string(),
                ));
            }
            if members[..index].iter().any(|m| m.id == member.id) {
                return Err(EngineError::InvalidAmount(format!(
                    "duplicate member id: {}",
                    member.id
                )));
            }
        }
        Ok(Self {
            id: id.into(),
            name: name.into(),
            currency,
            members,
        })
    }

    /// Looks up a member by id.
    #[must_use]
    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    /// Returns `true` when the given id belongs to this group.
    #[must_use]
    pub fn contains(&self, member_id: &str) -> bool {
        self.member(member_id).is_some()
    }
}
