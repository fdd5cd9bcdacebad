//! notify-relay - OAuth token lifecycle manager with a scheduled notification dispatcher
//!
//! This crate keeps per-user OAuth credentials in memory and periodically
//! sends notifications on each user's behalf:
//! - Login and bot authorization callbacks that register users
//! - Access token verification with proactive refresh near expiry
//! - Refresh token revocation on logout
//! - A fixed-delay background dispatcher that self-heals expired tokens
//! - A history of dispatcher runs
//! - REST API

pub mod api;
pub mod config;
pub mod notify;
pub mod provider;
pub mod storage;
#[cfg(test)]
pub mod testutil;
pub mod tokens;

use tokio::sync::Mutex;

use config::Config;
use provider::{ProviderClient, ProviderError};
use storage::{HistoryLog, UserRegistry};

/// Shared application state
pub struct AppState {
    pub config: Config,
    /// Serializes dispatcher runs; never held by request handlers
    pub dispatch_guard: Mutex<()>,
    pub history: HistoryLog,
    pub provider: ProviderClient,
    pub registry: UserRegistry,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ProviderError> {
        let provider = ProviderClient::new(config.provider.clone())?;
        Ok(Self::with_provider(config, provider))
    }

    pub fn with_provider(config: Config, provider: ProviderClient) -> Self {
        Self {
            config,
            dispatch_guard: Mutex::new(()),
            history: HistoryLog::new(),
            provider,
            registry: UserRegistry::new(),
        }
    }
}
