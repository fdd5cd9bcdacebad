use tracing::{info, warn};

use crate::provider::ProviderClient;
use crate::storage::models::UserRecord;
use crate::storage::UserRegistry;

/// Log a user out: revoke the refresh token at the provider, then forget the
/// user locally even if the provider call failed.
///
/// Returns whether the provider acknowledged the revocation.
pub async fn revoke(provider: &ProviderClient, registry: &UserRegistry, user: &UserRecord) -> bool {
    info!(user_id = %user.user_id, "Revoking access token");

    let revoked = match provider.revoke(&user.credentials.refresh_token).await {
        Ok(()) => true,
        Err(e) => {
            warn!(user_id = %user.user_id, error = %e, "Provider did not confirm revocation");
            false
        }
    };

    registry.remove(&user.user_id);
    revoked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_user, test_provider};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_revoke_removes_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/oauth/revoke"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let registry = UserRegistry::new();
        let user = make_user("U1", "Alice");
        registry.put("U1", user.clone());

        assert!(revoke(&test_provider(&server.uri()), &registry, &user).await);
        assert!(registry.get("U1").is_none());
    }

    #[tokio::test]
    async fn test_revoke_removes_user_even_when_provider_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/oauth/revoke"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let registry = UserRegistry::new();
        let user = make_user("U1", "Alice");
        registry.put("U1", user.clone());

        assert!(!revoke(&test_provider(&server.uri()), &registry, &user).await);
        assert!(registry.is_empty());
    }
}
