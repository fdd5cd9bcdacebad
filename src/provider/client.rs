//! HTTP client for the identity provider and the notification service
//!
//! Every call goes through one shared `reqwest::Client` with a fixed
//! per-request timeout. Only HTTP 200 counts as success; any other status is
//! returned as [`ProviderError::Status`] with the body preserved for callers
//! that echo it.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::ProviderError;
use crate::config::ProviderConfig;
use crate::storage::models::Credentials;

/// Result of a successful access token verification
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub client_id: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
    pub scope: String,
}

/// Token endpoint response for the authorization code and refresh grants
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            token_type: self.token_type.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BotTokenResponse {
    access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
    pub user_id: String,
}

#[derive(Debug, Clone)]
pub struct ProviderClient {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .pool_max_idle_per_host(4)
            .build()?;
        Ok(Self { config, http })
    }

    /// Use a preconfigured HTTP client (e.g. one with proxies disabled)
    pub fn with_http_client(config: ProviderConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn client_id(&self) -> &str {
        &self.config.client_id
    }

    // ========================================================================
    // Login API
    // ========================================================================

    /// Ask the provider whether an access token is still valid
    pub async fn verify_access_token(&self, access_token: &str) -> Result<TokenInfo, ProviderError> {
        let request = self
            .http
            .post(self.login_url("/v2/oauth/verify"))
            .form(&[("access_token", access_token)]);
        json_response(send("verify", request).await?).await
    }

    /// Exchange a refresh token for a fresh credential triple
    pub async fn refresh(&self, refresh_token: &str) -> Result<Credentials, ProviderError> {
        let request = self
            .http
            .post(self.login_url("/v2/oauth/accessToken"))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ]);
        let tokens: TokenResponse = json_response(send("refresh", request).await?).await?;
        Ok(tokens.credentials())
    }

    pub async fn revoke(&self, refresh_token: &str) -> Result<(), ProviderError> {
        let request = self
            .http
            .post(self.login_url("/v2/oauth/revoke"))
            .form(&[("refresh_token", refresh_token)]);
        empty_response(send("revoke", request).await?).await
    }

    /// Complete the login flow by exchanging an authorization code
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, ProviderError> {
        let request = self
            .http
            .post(self.login_url("/oauth2/v2.1/token"))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ]);
        json_response(send("code exchange", request).await?).await
    }

    pub async fn fetch_profile(&self, credentials: &Credentials) -> Result<Profile, ProviderError> {
        let request = self
            .http
            .get(self.login_url("/v2/profile"))
            .header(reqwest::header::AUTHORIZATION, credentials.authorization());
        json_response(send("profile", request).await?).await
    }

    // ========================================================================
    // Notification API
    // ========================================================================

    /// Complete the bot authorization flow, returning the bot access token
    pub async fn exchange_bot_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<String, ProviderError> {
        let request = self
            .http
            .post(format!("{}/oauth/token", self.config.bot_auth_base))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", self.config.bot_client_id.as_str()),
                ("client_secret", self.config.bot_client_secret.as_str()),
            ]);
        let tokens: BotTokenResponse = json_response(send("bot code exchange", request).await?).await?;
        Ok(tokens.access_token)
    }

    /// Deliver one message with the user's bot token
    pub async fn notify(&self, bot_token: &str, message: &str) -> Result<(), ProviderError> {
        let request = self
            .http
            .post(self.notify_url("/api/notify"))
            .bearer_auth(bot_token)
            .form(&[("message", message)]);
        empty_response(send("notify", request).await?).await
    }

    pub async fn bot_status(&self, bot_token: &str) -> Result<serde_json::Value, ProviderError> {
        let request = self
            .http
            .get(self.notify_url("/api/status"))
            .bearer_auth(bot_token);
        json_response(send("bot status", request).await?).await
    }

    /// Revoke the bot token. Any 200 is a success; the body is passed through
    /// when it is JSON and is `null` otherwise.
    pub async fn revoke_bot(&self, bot_token: &str) -> Result<serde_json::Value, ProviderError> {
        let request = self
            .http
            .post(self.notify_url("/api/revoke"))
            .bearer_auth(bot_token)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body("");
        lenient_json_response(send("bot revoke", request).await?).await
    }

    fn login_url(&self, path: &str) -> String {
        format!("{}{}", self.config.login_api_base, path)
    }

    fn notify_url(&self, path: &str) -> String {
        format!("{}{}", self.config.notify_api_base, path)
    }
}

async fn send(operation: &str, request: RequestBuilder) -> Result<reqwest::Response, ProviderError> {
    let response = request.send().await?;
    debug!(operation, status = response.status().as_u16(), "Provider response");
    Ok(response)
}

async fn json_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if status != StatusCode::OK {
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

async fn lenient_json_response(
    response: reqwest::Response,
) -> Result<serde_json::Value, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if status != StatusCode::OK {
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::Null))
}

async fn empty_response(response: reqwest::Response) -> Result<(), ProviderError> {
    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}
