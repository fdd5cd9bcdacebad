//! Claim extraction from OpenID Connect id tokens.
//!
//! Only the payload is decoded; the signature is not checked. The claims are
//! informational (`token_issuer`) and never used for authorization.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

use super::ProviderError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub iss: Option<String>,
}

pub fn decode_claims(id_token: &str) -> Result<IdTokenClaims, ProviderError> {
    let mut parts = id_token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_header), Some(payload), Some(_signature), None) => payload,
        _ => {
            return Err(ProviderError::InvalidIdToken(
                "expected three dot-separated segments".to_string(),
            ))
        }
    };

    // Tolerate padded encoders.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ProviderError::InvalidIdToken(e.to_string()))?;
    Ok(serde_json::from_slice(&bytes)?)
}
