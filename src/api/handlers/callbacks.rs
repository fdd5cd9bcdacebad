use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::response::{ApiError, AppQuery};
use crate::provider::id_token;
use crate::storage::models::UserRecord;
use crate::AppState;

pub const LOGIN_CALLBACK_PATH: &str = "/v1/login/callback";
pub const BOT_CALLBACK_PATH: &str = "/v1/bot/callback";

// ============================================================================
// Types
// ============================================================================

/// Query parameters of an OAuth redirect back to this service
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl CallbackParams {
    /// The authorization code, or the error the provider redirected with
    fn code(&self) -> Result<&str, ApiError> {
        if let Some(error) = &self.error {
            tracing::info!(error = %error, description = ?self.error_description, "Authorization was not granted");
            return Err(ApiError::new(
                axum::http::StatusCode::BAD_REQUEST,
                error.clone(),
                self.error_description.clone().unwrap_or_default(),
            ));
        }
        match self.code.as_deref() {
            Some(code) if !code.trim().is_empty() => Ok(code),
            _ => Err(ApiError::bad_request("code is required")),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Complete the primary login flow and register (or re-register) the user
pub async fn login_callback(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<CallbackParams>,
) -> Result<Redirect, ApiError> {
    let code = params.code()?;
    tracing::info!("Received login authorization code");

    let redirect_uri = format!("{}{}", state.config.server.backend_uri, LOGIN_CALLBACK_PATH);
    let tokens = state
        .provider
        .exchange_code(code, &redirect_uri)
        .await
        .map_err(|e| ApiError::from_provider("token", e))?;

    let credentials = tokens.credentials();
    let profile = state
        .provider
        .fetch_profile(&credentials)
        .await
        .map_err(|e| ApiError::from_provider("profile", e))?;
    if profile.user_id.trim().is_empty() {
        tracing::warn!("Provider returned a profile without a user id");
        return Err(ApiError::new(
            axum::http::StatusCode::BAD_GATEWAY,
            "profile_failed",
            "Profile response did not include a user id.",
        ));
    }

    let mut user = UserRecord::new(&profile.user_id, profile.display_name, credentials);
    user.token_issuer = match tokens.id_token.as_deref().map(id_token::decode_claims) {
        Some(Ok(claims)) => claims.iss,
        Some(Err(e)) => {
            tracing::warn!(user_id = %user.user_id, error = %e, "Ignoring undecodable id token");
            None
        }
        None => {
            tracing::debug!(user_id = %user.user_id, "No id token issued");
            None
        }
    };
    // Re-login keeps an existing notification opt-in.
    user.bot_access_token = state
        .registry
        .get(&user.user_id)
        .and_then(|existing| existing.bot_access_token);

    state.registry.put(&profile.user_id, user);
    tracing::info!(user_id = %profile.user_id, "User logged in");

    Ok(Redirect::temporary(&format!(
        "{}/#callback=login&userid={}",
        state.config.server.frontend_uri,
        urlencoding::encode(&profile.user_id)
    )))
}

/// Complete the bot authorization flow. `state` carries the user id.
pub async fn bot_callback(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<CallbackParams>,
) -> Result<Redirect, ApiError> {
    let code = params.code()?;
    let user_id = params.state.as_deref().unwrap_or_default();
    tracing::info!(user_id = %user_id, "Received bot authorization code");

    if state.registry.get(user_id).is_none() {
        return Err(ApiError::not_authenticated());
    }

    let redirect_uri = format!("{}{}", state.config.server.backend_uri, BOT_CALLBACK_PATH);
    let bot_token = state
        .provider
        .exchange_bot_code(code, &redirect_uri)
        .await
        .map_err(|e| ApiError::from_provider("token", e))?;

    if !state.registry.set_bot_token(user_id, Some(bot_token)) {
        // Logged out while the exchange was in flight.
        return Err(ApiError::not_authenticated());
    }
    tracing::info!(user_id = %user_id, "User subscribed to notifications");

    Ok(Redirect::temporary(&format!(
        "{}/#callback=bot",
        state.config.server.frontend_uri
    )))
}
