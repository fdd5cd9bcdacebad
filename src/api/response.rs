use axum::extract::rejection::QueryRejection;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::provider::ProviderError;
use crate::tokens::TokenError;

// ============================================================================
// JSend status enum
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JSendStatus {
    Error,
    Fail,
    Success,
}

// ============================================================================
// JSend success envelope
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JSend<T: Serialize> {
    pub data: T,
    pub status: JSendStatus,
}

impl<T: Serialize> JSend<T> {
    pub fn success(data: T) -> Json<JSend<T>> {
        Json(JSend {
            data,
            status: JSendStatus::Success,
        })
    }
}

// ============================================================================
// JSend fail envelope (client errors, 4xx)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JSendFail {
    pub data: FailData,
    pub status: JSendStatus,
}

/// Structured failure object: an error code, a description and, when a
/// provider call caused the failure, the provider's status code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailData {
    pub error: String,
    pub error_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

// ============================================================================
// JSend error envelope (server errors, 5xx)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JSendError {
    pub data: FailData,
    pub message: String,
    pub status: JSendStatus,
}

// ============================================================================
// Unified error type for handlers
// ============================================================================

/// A JSend-compatible error that is a fail (4xx) or an error (5xx),
/// decided by the status code.
#[derive(Debug)]
pub struct ApiError {
    pub data: FailData,
    pub status: StatusCode,
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if self.status.is_client_error() {
            let body = JSendFail {
                data: self.data,
                status: JSendStatus::Fail,
            };
            (self.status, Json(body)).into_response()
        } else {
            let body = JSendError {
                message: self.data.error_description.clone(),
                data: self.data,
                status: JSendStatus::Error,
            };
            (self.status, Json(body)).into_response()
        }
    }
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        error: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            data: FailData {
                error: error.into(),
                error_description: description.into(),
                upstream_status: None,
            },
            status,
        }
    }

    pub fn with_upstream_status(mut self, status: Option<u16>) -> Self {
        self.data.upstream_status = status;
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn not_authenticated() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "not_authenticated",
            "Log in with the provider first.",
        )
    }

    /// Echo a failed provider call. Provider statuses are passed through;
    /// transport and decoding failures become 502.
    pub fn from_provider(operation: &str, e: ProviderError) -> Self {
        let upstream = e.status();
        let status = upstream
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let description = match &e {
            ProviderError::Status { body, .. } if !body.is_empty() => body.clone(),
            other => other.to_string(),
        };
        Self::new(status, format!("{operation}_failed"), description).with_upstream_status(upstream)
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        let status = match &e {
            TokenError::NotAuthenticated
            | TokenError::Rejected(_)
            | TokenError::RefreshFailed { .. } => StatusCode::UNAUTHORIZED,
            TokenError::VerificationFailed { .. } | TokenError::Transport(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        Self::new(status, e.code(), e.to_string()).with_upstream_status(e.upstream_status())
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// `Query` that reports malformed parameters as a JSend fail
pub struct AppQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(AppQuery(value)),
            Err(rejection) => Err(query_rejection(rejection)),
        }
    }
}

fn query_rejection(rejection: QueryRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::RejectReason;
    use axum::response::IntoResponse;

    #[test]
    fn test_token_error_carries_code_and_upstream_status() {
        let err = ApiError::from(TokenError::RefreshFailed { status: Some(400) });
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.data.error, "refresh_failed");
        assert_eq!(err.data.upstream_status, Some(400));

        let err = ApiError::from(TokenError::Rejected(RejectReason::ClientMismatch {
            client_id: "other".to_string(),
        }));
        assert_eq!(err.data.error, "token_rejected");
        assert_eq!(err.data.upstream_status, None);
    }

    #[test]
    fn test_provider_status_is_echoed() {
        let err = ApiError::from_provider(
            "status",
            ProviderError::Status {
                status: 401,
                body: "{\"message\":\"Invalid access token\"}".to_string(),
            },
        );
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.data.error, "status_failed");
        assert!(err.data.error_description.contains("Invalid access token"));
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::not_authenticated().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = ApiError::new(StatusCode::BAD_GATEWAY, "token_failed", "boom").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
