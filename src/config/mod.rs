//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TRADE_APPROVALS` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use trade_approvals::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod error;
mod proposal;
mod server;
mod store;

pub use error::{ConfigError, ValidationError};
pub use proposal::ProposalConfig;
pub use server::{Environment, ServerConfig};
pub use store::{StoreBackend, StoreConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// single-process setup. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Document store configuration (memory or Redis)
    #[serde(default)]
    pub store: StoreConfig,

    /// Proposal location and participant roster
    #[serde(default)]
    pub proposal: ProposalConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TRADE_APPROVALS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Splits the participant list on commas
    ///
    /// # Environment Variable Format
    ///
    /// - `TRADE_APPROVALS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `TRADE_APPROVALS__STORE__BACKEND=redis` -> `store.backend = redis`
    /// - `TRADE_APPROVALS__PROPOSAL__PARTICIPANTS=Ann,Bob` -> `proposal.participants`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TRADE_APPROVALS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("proposal.participants")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.store.validate()?;
        self.proposal.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
