//! Shared test helpers for the crate's `#[cfg(test)]` modules

use std::sync::Arc;

use crate::config::{Config, NotifyConfig, ProviderConfig, ServerConfig, TokenPolicy};
use crate::provider::ProviderClient;
use crate::storage::models::{Credentials, UserRecord};
use crate::AppState;

/// A `Config` whose provider endpoints all point at `base_uri`
/// (normally a `wiremock::MockServer`).
pub fn test_config(base_uri: &str) -> Config {
    Config {
        notify: NotifyConfig::default(),
        provider: ProviderConfig {
            bot_auth_base: base_uri.to_string(),
            bot_client_id: "test-bot-client".to_string(),
            bot_client_secret: "test-bot-secret".to_string(),
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            login_api_base: base_uri.to_string(),
            notify_api_base: base_uri.to_string(),
            request_timeout_seconds: 5,
        },
        server: ServerConfig {
            backend_uri: "http://backend.test".to_string(),
            bind_address: "127.0.0.1:8080".to_string(),
            frontend_uri: "http://frontend.test".to_string(),
        },
        tokens: TokenPolicy::default(),
    }
}

/// A `ProviderClient` for `base_uri` with proxy disabled
/// (system proxies must not intercept mock server traffic).
pub fn test_provider(base_uri: &str) -> ProviderClient {
    let config = test_config(base_uri).provider;
    let http = reqwest::Client::builder()
        .no_proxy()
        .timeout(config.request_timeout())
        .build()
        .unwrap();
    ProviderClient::with_http_client(config, http)
}

/// Build a full `Arc<AppState>` with empty registry and history.
pub fn test_state(base_uri: &str) -> Arc<AppState> {
    Arc::new(AppState::with_provider(
        test_config(base_uri),
        test_provider(base_uri),
    ))
}

/// Credentials `access-{suffix}` / `refresh-{suffix}` of type `Bearer`.
pub fn make_credentials(suffix: &str) -> Credentials {
    Credentials {
        access_token: format!("access-{suffix}"),
        refresh_token: format!("refresh-{suffix}"),
        token_type: "Bearer".to_string(),
    }
}

/// A logged-in user without a bot token
pub fn make_user(user_id: &str, display_name: &str) -> UserRecord {
    UserRecord::new(user_id, display_name, make_credentials("1"))
}

/// A logged-in user with bot token `bot-{user_id}`
pub fn make_subscribed_user(user_id: &str, display_name: &str) -> UserRecord {
    let mut user = make_user(user_id, display_name);
    user.bot_access_token = Some(format!("bot-{user_id}"));
    user
}
