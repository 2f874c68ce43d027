//! Proposal-specific error types.

use crate::domain::foundation::{ErrorCode, ValidationError};

/// Errors raised by proposal operations.
///
/// None of these are fatal; every one is recovered by the user retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalError {
    /// A required text field was blank. No write was attempted.
    Validation { field: String, message: String },
    /// The named participant is not in the roster.
    UnknownParticipant(String),
    /// The store rejected or failed a write. Not retried.
    StoreWrite(String),
    /// A one-shot read of the stored proposal failed.
    StoreRead(String),
    /// The change notification stream failed. Not reconnected.
    StoreSubscription(String),
}

impl ProposalError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ProposalError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn unknown_participant(name: impl Into<String>) -> Self {
        ProposalError::UnknownParticipant(name.into())
    }
    pub fn store_write(message: impl Into<String>) -> Self {
        ProposalError::StoreWrite(message.into())
    }
    pub fn store_read(message: impl Into<String>) -> Self {
        ProposalError::StoreRead(message.into())
    }
    pub fn store_subscription(message: impl Into<String>) -> Self {
        ProposalError::StoreSubscription(message.into())
    }
    pub fn code(&self) -> ErrorCode {
        match self {
            ProposalError::Validation { .. } => ErrorCode::ValidationFailed,
            ProposalError::UnknownParticipant(_) => ErrorCode::ParticipantNotFound,
            ProposalError::StoreWrite(_) => ErrorCode::StoreWriteFailed,
            ProposalError::StoreRead(_) => ErrorCode::StoreReadFailed,
            ProposalError::StoreSubscription(_) => ErrorCode::SubscriptionFailed,
        }
    }
    pub fn message(&self) -> String {
        match self {
            ProposalError::Validation { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            ProposalError::UnknownParticipant(name) => format!("Unknown participant: {}", name),
            ProposalError::StoreWrite(msg) => format!("Store write failed: {}", msg),
            ProposalError::StoreRead(msg) => format!("Store read failed: {}", msg),
            ProposalError::StoreSubscription(msg) => format!("Store subscription failed: {}", msg),
        }
    }
}

impl std::fmt::Display for ProposalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ProposalError {}

impl From<ValidationError> for ProposalError {
    fn from(err: ValidationError) -> Self {
        ProposalError::validation(err.field().to_string(), err.to_string())
    }
}
