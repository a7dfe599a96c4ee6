//! Session behaviour across the transport: 401 handling, sign-in and sign-out.

mod common;

use common::{client_json, harness, user_json};
use intersul_console::{ErrorKind, MemoryStorage, SessionState, Storage};
use intersul_query::query_key;
use intersul_session::{LOGIN_PATH, TOKEN_KEY, USER_KEY};
use intersul_types::{ClientQuery, LoginRequest};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn signed_in_storage(token: &str) -> MemoryStorage {
    let user = user_json("manager").to_string();
    MemoryStorage::with_entries([(TOKEN_KEY, token), (USER_KEY, user.as_str())])
}

fn credentials() -> LoginRequest {
    LoginRequest {
        email: "ana@intersul.com.br".to_string(),
        password: "secret123".to_string(),
    }
}

#[tokio::test]
async fn test_unauthorized_signs_out_and_redirects_once() {
    let h = harness(signed_in_storage("expired")).await;
    assert_eq!(h.ctx.session().snapshot().state, SessionState::Authenticated);

    Mock::given(method("GET"))
        .and(path("/clients"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Unauthorized", "statusCode": 401})),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let err = h
        .ctx
        .clients()
        .list(&ClientQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let session = h.ctx.session().snapshot();
    assert_eq!(session.state, SessionState::Anonymous);
    assert_eq!(session.token, None);
    assert_eq!(h.storage.get(TOKEN_KEY), None);
    assert_eq!(h.storage.get(USER_KEY), None);
    assert_eq!(h.navigator.count(LOGIN_PATH), 1);
    assert_eq!(h.navigator.paths(), vec![LOGIN_PATH.to_string()]);
}

#[tokio::test]
async fn test_request_after_unauthorized_is_anonymous() {
    let h = harness(signed_in_storage("expired")).await;

    Mock::given(method("GET"))
        .and(path("/clients/stats"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/clients/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_json(7, "Gráfica Sul")))
        .mount(&h.server)
        .await;

    assert!(h.ctx.clients().stats().await.is_err());
    h.ctx.clients().get(7).await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    let last = requests.last().unwrap();
    assert!(!last.headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_login_adopts_session_and_authenticates_requests() {
    let h = harness(MemoryStorage::new()).await;
    assert_eq!(h.ctx.session().snapshot().state, SessionState::Anonymous);

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "ana@intersul.com.br", "password": "secret123"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "user": user_json("admin"),
            "access_token": "fresh-token"
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("admin")))
        .expect(1)
        .mount(&h.server)
        .await;

    h.ctx.auth().login(&credentials()).await.unwrap();

    let session = h.ctx.session().snapshot();
    assert!(session.is_authenticated);
    assert!(session.can_manage_users());
    assert_eq!(h.storage.get(TOKEN_KEY).as_deref(), Some("fresh-token"));

    let profile = h.ctx.auth().profile().await.unwrap();
    assert_eq!(profile.email, "ana@intersul.com.br");
    // Served from cache the second time.
    h.ctx.auth().profile().await.unwrap();
}

#[tokio::test]
async fn test_login_without_token_keeps_session() {
    let h = harness(MemoryStorage::new()).await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"user": user_json("admin")})))
        .mount(&h.server)
        .await;

    let response = h.ctx.auth().login(&credentials()).await.unwrap();
    assert!(response.user.is_some());
    assert_eq!(h.ctx.session().snapshot().state, SessionState::Anonymous);
    assert_eq!(h.storage.get(TOKEN_KEY), None);
}

#[tokio::test]
async fn test_failed_login_is_reported() {
    let h = harness(MemoryStorage::new()).await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"message": ["password is too short"], "statusCode": 400})),
        )
        .mount(&h.server)
        .await;

    let err = h.ctx.auth().login(&credentials()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.user_message(), "password is too short");
    assert!(!h.ctx.session().snapshot().is_authenticated);
}

#[tokio::test]
async fn test_logout_is_local_and_clears_cache() {
    let h = harness(signed_in_storage("tok")).await;
    h.ctx
        .cache()
        .set_entry(query_key!["clients", 7u32], client_json(7, "Gráfica Sul"))
        .await;

    h.ctx.auth().logout().await.unwrap();

    assert_eq!(h.ctx.session().snapshot().state, SessionState::Anonymous);
    assert_eq!(h.storage.get(TOKEN_KEY), None);
    assert!(h.ctx.cache().is_empty().await);
    assert!(h.server.received_requests().await.unwrap().is_empty());
    assert_eq!(h.navigator.count(LOGIN_PATH), 0);
}
