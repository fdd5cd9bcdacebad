//! Primary token lifecycle: verification, refresh and revocation.
//!
//! Every operation works on a caller-owned copy of a [`UserRecord`]. Callers
//! write changed credentials back through the registry.
//!
//! [`UserRecord`]: crate::storage::models::UserRecord

pub mod refresher;
pub mod revocation;
pub mod verifier;

use std::fmt;

use thiserror::Error;

use crate::provider::ProviderError;

pub use refresher::{refresh, try_refresh};
pub use revocation::revoke;
pub use verifier::{check, verify, Verification};

/// Why a verified token is unacceptable regardless of its lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    ClientMismatch { client_id: String },
    ScopeMismatch { scope: String },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::ClientMismatch { client_id } => {
                write!(f, "token was issued to client {client_id}")
            }
            RejectReason::ScopeMismatch { scope } => write!(f, "unexpected scope {scope:?}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("User is not logged in")]
    NotAuthenticated,
    #[error("Access token rejected: {0}")]
    Rejected(RejectReason),
    #[error("Token refresh failed")]
    RefreshFailed { status: Option<u16> },
    #[error("Token verification failed")]
    VerificationFailed { status: Option<u16> },
    #[error("Provider unreachable: {0}")]
    Transport(String),
}

impl TokenError {
    /// Stable machine-readable code for API error objects
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::NotAuthenticated => "not_authenticated",
            TokenError::Rejected(_) => "token_rejected",
            TokenError::RefreshFailed { .. } => "refresh_failed",
            TokenError::VerificationFailed { .. } => "verification_failed",
            TokenError::Transport(_) => "transport_failure",
        }
    }

    /// Status code the provider answered with, if any
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            TokenError::RefreshFailed { status } | TokenError::VerificationFailed { status } => {
                *status
            }
            _ => None,
        }
    }

    fn refresh(e: ProviderError) -> Self {
        match e {
            ProviderError::Transport(e) => TokenError::Transport(e.to_string()),
            other => TokenError::RefreshFailed {
                status: other.status(),
            },
        }
    }

    fn verification(e: ProviderError) -> Self {
        match e {
            ProviderError::Transport(e) => TokenError::Transport(e.to_string()),
            other => TokenError::VerificationFailed {
                status: other.status(),
            },
        }
    }
}
