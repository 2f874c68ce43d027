//! Shared proposal configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::StorePath;
use crate::domain::proposal::{ParticipantRoster, DEFAULT_PARTICIPANTS};

/// Where the proposal lives and who approves it
#[derive(Debug, Clone, Deserialize)]
pub struct ProposalConfig {
    /// Store path of the proposal document
    #[serde(default = "default_path")]
    pub path: String,

    /// Approving participants, in display order
    #[serde(default = "default_participants")]
    pub participants: Vec<String>,
}

impl ProposalConfig {
    pub fn store_path(&self) -> Result<StorePath, ValidationError> {
        StorePath::parse(&self.path)
            .map_err(|e| ValidationError::InvalidProposalPath(e.to_string()))
    }

    pub fn roster(&self) -> Result<ParticipantRoster, ValidationError> {
        ParticipantRoster::new(&self.participants)
            .map_err(|e| ValidationError::InvalidParticipants(e.to_string()))
    }

    /// Validate proposal configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.store_path()?;
        self.roster()?;
        Ok(())
    }
}

impl Default for ProposalConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            participants: default_participants(),
        }
    }
}

fn default_path() -> String {
    "dynasty5/currentTrade".to_string()
}

fn default_participants() -> Vec<String> {
    DEFAULT_PARTICIPANTS.iter().map(|s| s.to_string()).collect()
}
