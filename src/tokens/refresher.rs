use tracing::{info, warn};

use super::TokenError;
use crate::provider::ProviderClient;
use crate::storage::models::UserRecord;

/// Exchange the user's refresh token for a new credential triple.
///
/// On success the whole triple is replaced in one assignment. On failure the
/// record is left untouched. Registry membership is never changed here.
pub async fn try_refresh(provider: &ProviderClient, user: &mut UserRecord) -> Result<(), TokenError> {
    info!(user_id = %user.user_id, "Refreshing access token");

    match provider.refresh(&user.credentials.refresh_token).await {
        Ok(credentials) => {
            user.credentials = credentials;
            info!(user_id = %user.user_id, "Access token refreshed");
            Ok(())
        }
        Err(e) => {
            warn!(user_id = %user.user_id, error = %e, "Access token refresh failed");
            Err(TokenError::refresh(e))
        }
    }
}

pub async fn refresh(provider: &ProviderClient, user: &mut UserRecord) -> bool {
    try_refresh(provider, user).await.is_ok()
}
