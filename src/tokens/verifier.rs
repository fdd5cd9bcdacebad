use tracing::{info, warn};

use super::{refresher, RejectReason, TokenError};
use crate::config::TokenPolicy;
use crate::provider::ProviderClient;
use crate::storage::models::UserRecord;

/// How a successful verification was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The stored access token is usable as-is
    Valid,
    /// The credentials were refreshed and `user` now holds the new triple
    Refreshed,
}

/// Check the user's primary access token with the provider.
///
/// Tokens bound to the wrong scope or client are rejected without a refresh.
/// Tokens the provider no longer recognizes, or that expire within the
/// freshness threshold, are refreshed once.
pub async fn check(
    provider: &ProviderClient,
    policy: &TokenPolicy,
    user: &mut UserRecord,
) -> Result<Verification, TokenError> {
    info!(user_id = %user.user_id, "Verifying access token");

    let info = match provider
        .verify_access_token(&user.credentials.access_token)
        .await
    {
        Ok(info) => info,
        Err(e) if e.is_expired_token() => {
            info!(user_id = %user.user_id, "Access token expired, refreshing");
            refresher::try_refresh(provider, user).await?;
            return Ok(Verification::Refreshed);
        }
        Err(e) => {
            warn!(user_id = %user.user_id, error = %e, "Access token verification failed");
            return Err(TokenError::verification(e));
        }
    };

    if info.scope != policy.expected_scope {
        warn!(user_id = %user.user_id, scope = %info.scope, "Access token has unexpected scope");
        return Err(TokenError::Rejected(RejectReason::ScopeMismatch {
            scope: info.scope,
        }));
    }

    if info.client_id != provider.client_id() {
        warn!(user_id = %user.user_id, client_id = %info.client_id, "Access token issued to another client");
        return Err(TokenError::Rejected(RejectReason::ClientMismatch {
            client_id: info.client_id,
        }));
    }

    if info.expires_in < policy.freshness_threshold_seconds {
        info!(
            user_id = %user.user_id,
            expires_in = info.expires_in,
            "Access token almost expired, refreshing"
        );
        refresher::try_refresh(provider, user).await?;
        return Ok(Verification::Refreshed);
    }

    Ok(Verification::Valid)
}

pub async fn verify(provider: &ProviderClient, policy: &TokenPolicy, user: &mut UserRecord) -> bool {
    check(provider, policy, user).await.is_ok()
}
