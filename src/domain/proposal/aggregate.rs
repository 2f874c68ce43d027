//! Proposal aggregate - the single shared trade record.
//!
//! The store owns the authoritative document; a `Proposal` is either one
//! about to be written or a decoded read replica of the latest snapshot.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::foundation::{Timestamp, ValidationError};

use super::participant::{ParticipantId, ParticipantRoster};

/// Document key of the outbound description.
pub const OUTBOUND_FIELD: &str = "weSend";
/// Document key of the inbound description.
pub const INBOUND_FIELD: &str = "weReceive";
/// Document key of the approvals map.
pub const APPROVALS_FIELD: &str = "approvals";
/// Document key of the creation instant.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Stored shape of a freshly created proposal.
#[derive(Debug, Serialize)]
struct ProposalDocument<'a> {
    #[serde(rename = "weSend")]
    description_outbound: &'a str,
    #[serde(rename = "weReceive")]
    description_inbound: &'a str,
    approvals: Map<String, Value>,
    #[serde(rename = "createdAt")]
    created_at: Timestamp,
}

/// One participant's approval flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub participant: ParticipantId,
    pub approved: bool,
}

/// The shared trade proposal.
///
/// # Invariants
///
/// - `approvals` holds exactly the roster's participants, in roster order
/// - descriptions are non-empty when present
///
/// Proposals built with [`Proposal::new`] always carry both descriptions and
/// a creation time. Decoded proposals may lack them when the stored document
/// was only partially written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    description_outbound: Option<String>,
    description_inbound: Option<String>,
    approvals: Vec<Approval>,
    created_at: Option<Timestamp>,
}

impl Proposal {
    /// Creates a proposal with every approval reset to `false`.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if either description is blank after trimming
    pub fn new(
        outbound: &str,
        inbound: &str,
        roster: &ParticipantRoster,
        created_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        let outbound = outbound.trim();
        let inbound = inbound.trim();

        if outbound.is_empty() {
            return Err(ValidationError::empty_field(OUTBOUND_FIELD));
        }
        if inbound.is_empty() {
            return Err(ValidationError::empty_field(INBOUND_FIELD));
        }

        Ok(Self {
            description_outbound: Some(outbound.to_string()),
            description_inbound: Some(inbound.to_string()),
            approvals: roster
                .iter()
                .map(|participant| Approval {
                    participant: participant.clone(),
                    approved: false,
                })
                .collect(),
            created_at: Some(created_at),
        })
    }

    /// Decodes a stored document, reconciling its approvals against `roster`.
    ///
    /// Missing approval keys and non-boolean values count as `false`; keys
    /// outside the roster are ignored. Descriptions are kept verbatim. Returns `None` for `null` and for
    /// values that are not JSON objects.
    pub fn from_document(document: &Value, roster: &ParticipantRoster) -> Option<Self> {
        let object = match document {
            Value::Object(object) => object,
            Value::Null => return None,
            other => {
                tracing::warn!(kind = value_kind(other), "Ignoring non-object proposal document");
                return None;
            }
        };

        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let stored_approvals = object.get(APPROVALS_FIELD).and_then(Value::as_object);
        let approvals = roster
            .iter()
            .map(|participant| Approval {
                participant: participant.clone(),
                approved: stored_approvals
                    .and_then(|a| a.get(participant.as_str()))
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            })
            .collect();

        let created_at = object
            .get(CREATED_AT_FIELD)
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .and_then(Timestamp::from_unix_millis);

        Some(Self {
            description_outbound: text(OUTBOUND_FIELD),
            description_inbound: text(INBOUND_FIELD),
            approvals,
            created_at,
        })
    }

    /// Full document for a store write.
    pub fn to_document(&self) -> Value {
        let approvals = self
            .approvals
            .iter()
            .map(|a| (a.participant.to_string(), Value::Bool(a.approved)))
            .collect();

        let document = ProposalDocument {
            description_outbound: self.description_outbound.as_deref().unwrap_or_default(),
            description_inbound: self.description_inbound.as_deref().unwrap_or_default(),
            approvals,
            created_at: self.created_at.unwrap_or_default(),
        };

        // A struct of strings, bools and an integer always serializes.
        serde_json::to_value(document).unwrap_or(Value::Null)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// What we send.
    pub fn description_outbound(&self) -> Option<&str> {
        self.description_outbound.as_deref()
    }

    /// What we receive.
    pub fn description_inbound(&self) -> Option<&str> {
        self.description_inbound.as_deref()
    }

    /// Approvals in roster order.
    pub fn approvals(&self) -> &[Approval] {
        &self.approvals
    }

    pub fn is_approved_by(&self, participant: &ParticipantId) -> bool {
        self.approvals
            .iter()
            .any(|a| &a.participant == participant && a.approved)
    }

    pub fn created_at(&self) -> Option<Timestamp> {
        self.created_at
    }

    /// False when the stored document lacked a description or creation time.
    pub fn is_complete(&self) -> bool {
        self.description_outbound.is_some()
            && self.description_inbound.is_some()
            && self.created_at.is_some()
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
