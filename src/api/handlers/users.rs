use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::storage::models::UserRecord;
use crate::tokens::{self, TokenError, Verification};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DisplayNameResponse {
    /// Empty when the user is not logged in
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    /// Whether the provider confirmed the revocation
    pub revoked: bool,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub refreshed: bool,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn get_display_name(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<JSend<DisplayNameResponse>> {
    let user = state.registry.get(&user_id);
    tracing::debug!(user_id = %user_id, exists = user.is_some(), "Display name lookup");

    JSend::success(DisplayNameResponse {
        display_name: user.map(|u| u.display_name).unwrap_or_default(),
    })
}

/// Log out. Unknown users are a no-op.
pub async fn revoke_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<JSend<RevokeResponse>> {
    tracing::info!(user_id = %user_id, "Logout requested");

    let revoked = match state.registry.get(&user_id) {
        Some(user) => tokens::revoke(&state.provider, &state.registry, &user).await,
        None => false,
    };
    JSend::success(RevokeResponse { revoked })
}

/// Verify the primary token now, refreshing it if needed
pub async fn verify_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<JSend<VerifyResponse>>, ApiError> {
    let mut user = require_user(&state, &user_id)?;
    let previous = user.credentials.clone();

    let outcome = tokens::check(&state.provider, &state.config.tokens, &mut user).await?;
    if outcome == Verification::Refreshed
        && !state
            .registry
            .update_credentials(&user.user_id, &previous, user.credentials.clone())
    {
        tracing::debug!(user_id = %user.user_id, "Credentials changed during verification, keeping newer ones");
    }

    Ok(JSend::success(VerifyResponse {
        refreshed: outcome == Verification::Refreshed,
    }))
}

/// Notification subscription status, as reported by the provider
pub async fn bot_status(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<JSend<serde_json::Value>>, ApiError> {
    let bot_token = require_bot_token(&state, &user_id)?;

    let status = state
        .provider
        .bot_status(&bot_token)
        .await
        .map_err(|e| ApiError::from_provider("status", e))?;
    Ok(JSend::success(status))
}

/// Unsubscribe from notifications
pub async fn revoke_bot(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<JSend<serde_json::Value>>, ApiError> {
    tracing::info!(user_id = %user_id, "Notification unsubscribe requested");
    let bot_token = require_bot_token(&state, &user_id)?;

    let result = state
        .provider
        .revoke_bot(&bot_token)
        .await
        .map_err(|e| ApiError::from_provider("revoke", e))?;

    state.registry.set_bot_token(&user_id, None);
    Ok(JSend::success(result))
}

// ============================================================================
// Helpers
// ============================================================================

fn require_user(state: &AppState, user_id: &str) -> Result<UserRecord, ApiError> {
    state
        .registry
        .get(user_id)
        .ok_or_else(|| TokenError::NotAuthenticated.into())
}

fn require_bot_token(state: &AppState, user_id: &str) -> Result<String, ApiError> {
    require_user(state, user_id)?.bot_access_token.ok_or_else(|| {
        ApiError::new(
            axum::http::StatusCode::NOT_FOUND,
            "not_subscribed",
            "User has not subscribed to notifications.",
        )
    })
}
