//! Participants and the fixed roster of approvers.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{StorePath, ValidationError};

/// League owners who approve trades when no roster is configured.
pub const DEFAULT_PARTICIPANTS: [&str; 5] = ["JCort", "Troy", "Tristan", "Charmin", "Kade"];

/// Identifier of one approver.
///
/// Only [`ParticipantRoster`] hands these out, so holding one proves
/// membership in the roster it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered, duplicate-free set of participants shared by every client.
///
/// # Invariants
///
/// - at least one participant
/// - identifiers are non-empty, unique, and usable as store path segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRoster {
    participants: Arc<[ParticipantId]>,
}

impl ParticipantRoster {
    /// Builds a roster from names in display order.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if no names are given or a name is blank
    /// - `InvalidFormat` if a name cannot be a store path segment
    /// - `Duplicate` if a name appears twice
    pub fn new<I, S>(names: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut participants = Vec::new();

        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(ValidationError::empty_field("participants"));
            }
            StorePath::validate_segment(name).map_err(|_| {
                ValidationError::invalid_format(
                    "participants",
                    format!("'{}' cannot be used as a store key", name),
                )
            })?;
            if !seen.insert(name.to_string()) {
                return Err(ValidationError::duplicate("participants", name));
            }
            participants.push(ParticipantId(name.to_string()));
        }

        if participants.is_empty() {
            return Err(ValidationError::empty_field("participants"));
        }

        Ok(Self {
            participants: participants.into(),
        })
    }

    /// Looks up a participant by exact name.
    pub fn get(&self, name: &str) -> Option<&ParticipantId> {
        self.participants.iter().find(|p| p.as_str() == name)
    }

    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.participants.contains(participant)
    }

    /// Participants in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &ParticipantId> {
        self.participants.iter()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

impl Default for ParticipantRoster {
    fn default() -> Self {
        Self {
            participants: DEFAULT_PARTICIPANTS
                .iter()
                .map(|name| ParticipantId((*name).to_string()))
                .collect(),
        }
    }
}
