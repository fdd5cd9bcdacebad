use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub notify: NotifyConfig,
    pub provider: ProviderConfig,
    pub server: ServerConfig,
    pub tokens: TokenPolicy,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Public base URL of this service, used to build OAuth redirect URIs
    pub backend_uri: String,
    pub bind_address: String,
    /// Where browsers are sent after a callback completes
    pub frontend_uri: String,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the bot authorization server (`/oauth/token`)
    pub bot_auth_base: String,
    pub bot_client_id: String,
    pub bot_client_secret: String,
    pub client_id: String,
    pub client_secret: String,
    /// Base URL of the login API (verify, refresh, revoke, profile, token)
    pub login_api_base: String,
    /// Base URL of the notification API (notify, status, revoke)
    pub notify_api_base: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Delay between the end of one dispatcher run and the start of the next
    pub interval_seconds: u64,
    /// Message prefix; the send timestamp is appended
    pub message: String,
}

/// Acceptance rules applied to a verified access token
#[derive(Debug, Clone)]
pub struct TokenPolicy {
    pub expected_scope: String,
    /// Tokens with less remaining lifetime than this are refreshed proactively
    pub freshness_threshold_seconds: i64,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            expected_scope: "P".to_string(),
            freshness_threshold_seconds: 3600,
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 10,
            message: "Test Message".to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl NotifyConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let client_id = required("CLIENT_ID")?;
        let client_secret = required("CLIENT_SECRET")?;

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let backend_uri =
            std::env::var("BACKEND_URI").unwrap_or_else(|_| "http://localhost:8080".to_string());
        let frontend_uri =
            std::env::var("FRONTEND_URI").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let notify_defaults = NotifyConfig::default();
        let token_defaults = TokenPolicy::default();

        let config = Config {
            notify: NotifyConfig {
                interval_seconds: parsed("NOTIFY_INTERVAL_SECONDS")
                    .unwrap_or(notify_defaults.interval_seconds),
                message: std::env::var("NOTIFY_MESSAGE").unwrap_or(notify_defaults.message),
            },
            provider: ProviderConfig {
                bot_auth_base: base_url("BOT_AUTH_BASE", "https://notify-bot.line.me"),
                bot_client_id: std::env::var("BOT_CLIENT_ID").unwrap_or_default(),
                bot_client_secret: std::env::var("BOT_CLIENT_SECRET").unwrap_or_default(),
                client_id,
                client_secret,
                login_api_base: base_url("LOGIN_API_BASE", "https://api.line.me"),
                notify_api_base: base_url("NOTIFY_API_BASE", "https://notify-api.line.me"),
                request_timeout_seconds: parsed("REQUEST_TIMEOUT_SECONDS").unwrap_or(60),
            },
            server: ServerConfig {
                backend_uri: backend_uri.trim_end_matches('/').to_string(),
                bind_address,
                frontend_uri: frontend_uri.trim_end_matches('/').to_string(),
            },
            tokens: TokenPolicy {
                expected_scope: std::env::var("EXPECTED_SCOPE")
                    .unwrap_or(token_defaults.expected_scope),
                freshness_threshold_seconds: parsed("FRESHNESS_THRESHOLD_SECONDS")
                    .unwrap_or(token_defaults.freshness_threshold_seconds),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notify.interval_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "NOTIFY_INTERVAL_SECONDS must be greater than 0".to_string(),
            ));
        }
        if self.provider.request_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "REQUEST_TIMEOUT_SECONDS must be greater than 0".to_string(),
            ));
        }
        if self.tokens.freshness_threshold_seconds < 0 {
            return Err(ConfigError::ValidationError(
                "FRESHNESS_THRESHOLD_SECONDS cannot be negative".to_string(),
            ));
        }

        if self.provider.bot_client_id.is_empty() || self.provider.bot_client_secret.is_empty() {
            tracing::warn!(
                "BOT_CLIENT_ID or BOT_CLIENT_SECRET is not set. \
                 Users will not be able to opt in to notifications."
            );
        }

        Ok(())
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

fn base_url(name: &str, default: &str) -> String {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
