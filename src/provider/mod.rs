pub mod client;
pub mod id_token;

use thiserror::Error;

pub use client::{Profile, ProviderClient, TokenInfo, TokenResponse};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Provider returned status {status}")]
    Status { status: u16, body: String },
    #[error("Malformed provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid id token: {0}")]
    InvalidIdToken(String),
}

impl ProviderError {
    /// The upstream HTTP status, when the provider answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The verify endpoint answers 400 for expired or unknown tokens
    pub fn is_expired_token(&self) -> bool {
        self.status() == Some(400)
    }
}
