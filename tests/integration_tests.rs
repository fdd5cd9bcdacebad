//! End-to-end dispatcher scenarios against a mock provider

use std::sync::Arc;

use notify_relay::config::{Config, NotifyConfig, ProviderConfig, ServerConfig, TokenPolicy};
use notify_relay::notify;
use notify_relay::provider::ProviderClient;
use notify_relay::storage::models::{Credentials, UserRecord};
use notify_relay::AppState;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup_state(server: &MockServer) -> Arc<AppState> {
    let config = Config {
        notify: NotifyConfig::default(),
        provider: ProviderConfig {
            bot_auth_base: server.uri(),
            bot_client_id: "bot-client".to_string(),
            bot_client_secret: "bot-secret".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            login_api_base: server.uri(),
            notify_api_base: server.uri(),
            request_timeout_seconds: 5,
        },
        server: ServerConfig {
            backend_uri: "http://backend.test".to_string(),
            bind_address: "127.0.0.1:0".to_string(),
            frontend_uri: "http://frontend.test".to_string(),
        },
        tokens: TokenPolicy::default(),
    };
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let provider = ProviderClient::with_http_client(config.provider.clone(), http);
    Arc::new(AppState::with_provider(config, provider))
}

fn make_user(id: &str, name: &str, bot_token: Option<&str>) -> UserRecord {
    let mut user = UserRecord::new(
        id,
        name,
        Credentials {
            access_token: format!("access-{id}"),
            refresh_token: format!("refresh-{id}"),
            token_type: "Bearer".to_string(),
        },
    );
    user.bot_access_token = bot_token.map(str::to_string);
    user
}

#[tokio::test]
async fn test_valid_bot_token_is_delivered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notify"))
        .and(header("authorization", "Bearer bot-u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "message": "ok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = setup_state(&server);
    state.registry.put("U1", make_user("U1", "Alice", Some("bot-u1")));

    notify::run_once(&state).await;

    let history = state.history.all();
    assert_eq!(history.len(), 1);
    assert!(history[0].summary().contains("Alice"));
}

#[tokio::test]
async fn test_expired_token_with_failing_refresh_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notify"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/oauth/verify"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_request",
            "error_description": "access token expired"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/oauth/accessToken"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = setup_state(&server);
    state.registry.put("U2", make_user("U2", "Bob", Some("bot-u2")));

    let entry = notify::run_once(&state).await;

    assert!(!entry.recipients.contains(&"Bob".to_string()));
    assert!(state.registry.get("U2").is_some());
    assert_eq!(state.history.len(), 1);
}

#[tokio::test]
async fn test_every_delivery_failing_still_completes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notify"))
        .respond_with(ResponseTemplate::new(500))
        .expect(10)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/oauth/verify"))
        .respond_with(ResponseTemplate::new(500))
        .expect(10)
        .mount(&server)
        .await;

    let state = setup_state(&server);
    for i in 0..10 {
        let id = format!("U{i}");
        let bot = format!("bot-{i}");
        state
            .registry
            .put(&id, make_user(&id, &format!("User {i}"), Some(bot.as_str())));
    }

    let entry = notify::run_once(&state).await;
    assert!(entry.recipients.is_empty());
    assert_eq!(state.registry.len(), 10);
}

#[tokio::test]
async fn test_refresh_self_heals_for_next_run() {
    let server = MockServer::start().await;
    // The stale primary token is rejected; after a refresh the next run
    // delivers with the unchanged bot token.
    Mock::given(method("POST"))
        .and(path("/api/notify"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/notify"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/oauth/verify"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/oauth/accessToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "access-fresh",
            "refresh_token": "refresh-fresh"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = setup_state(&server);
    state.registry.put("U1", make_user("U1", "Alice", Some("bot-u1")));

    let first = notify::run_once(&state).await;
    assert!(first.recipients.is_empty());
    assert_eq!(
        state.registry.get("U1").unwrap().credentials.access_token,
        "access-fresh"
    );

    let second = notify::run_once(&state).await;
    assert_eq!(second.recipients, vec!["Alice".to_string()]);
    assert!(second.sequence > first.sequence);
}

#[tokio::test]
async fn test_remove_unknown_user() {
    let server = MockServer::start().await;
    let state = setup_state(&server);
    state.registry.put("U1", make_user("U1", "Alice", None));

    assert!(state.registry.remove("unknown-id").is_none());
    assert_eq!(state.registry.len(), 1);
}

#[tokio::test]
async fn test_back_to_back_runs_are_distinct() {
    let server = MockServer::start().await;
    let state = setup_state(&server);

    let first = notify::run_once(&state).await;
    let second = notify::run_once(&state).await;

    assert_ne!(first.sequence, second.sequence);
    assert_eq!(state.history.all(), vec![first, second]);
}
