//! End-to-end tests for the PKCE login and refresh flows against a mocked
//! provider.

use mockito::Matcher;

use trackshift_core::{
    AccountProfile, AccountSession, AccountType, Authenticator, AuthError, Config, CoreError,
    ProfileStore, SessionStore,
};

fn config_for(server: &mockito::ServerGuard) -> Config {
    Config::new("client-id", "client-secret", "http://127.0.0.1:8888/callback")
        .with_token_url(format!("{}/api/token", server.url()))
        .with_api_base(format!("{}/v1", server.url()))
}

fn token_body(access: &str, refresh: Option<&str>) -> String {
    let mut body = serde_json::json!({
        "access_token": access,
        "token_type": "Bearer",
        "expires_in": 3600,
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = serde_json::json!(refresh);
    }
    body.to_string()
}

fn seeded_session(account: AccountType, refresh_token: Option<&str>) -> AccountSession {
    AccountSession {
        account,
        access_token: "stale-token".into(),
        refresh_token: refresh_token.map(String::from),
        expires_at: chrono::Utc::now() - chrono::Duration::minutes(5),
        profile: AccountProfile {
            id: "user-1".into(),
            email: Some("user@example.com".into()),
            display_name: "User".into(),
            image_url: None,
        },
    }
}

#[tokio::test]
async fn full_login_installs_session_with_profile() {
    let mut server = mockito::Server::new_async().await;

    let token_mock = server
        .mock("POST", "/api/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            Matcher::UrlEncoded("code".into(), "auth-code".into()),
            Matcher::Regex("code_verifier=[A-Za-z0-9_-]{86}".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(token_body("access-1", Some("refresh-1")))
        .create_async()
        .await;

    let profile_mock = server
        .mock("GET", "/v1/me")
        .match_header("authorization", "Bearer access-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "id": "source-user",
                "email": "source@example.com",
                "display_name": "Source User",
                "images": [{"url": "https://img/source"}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut auth = Authenticator::new(config_for(&server));
    let mut store = SessionStore::new();

    let request = auth.begin_authorization(AccountType::Source).unwrap();
    let outcome = auth
        .complete_authorization(&mut store, "auth-code", &request.state)
        .await
        .unwrap();

    assert_eq!(outcome.account, AccountType::Source);
    assert_eq!(outcome.profile.id, "source-user");

    let session = store.authorized(AccountType::Source).unwrap();
    assert_eq!(session.access_token, "access-1");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(session.profile.email.as_deref(), Some("source@example.com"));
    assert!(!session.is_expired());

    token_mock.assert_async().await;
    profile_mock.assert_async().await;
}

#[tokio::test]
async fn both_accounts_can_login_without_token_confusion() {
    let mut server = mockito::Server::new_async().await;

    // Two sequential logins; each exchange returns a distinct token and
    // each /me call must carry the token from its own exchange.
    let mut mocks = Vec::new();
    for (code, access, user) in [
        ("code-src", "access-src", "user-src"),
        ("code-dst", "access-dst", "user-dst"),
    ] {
        mocks.push(
            server
                .mock("POST", "/api/token")
                .match_body(Matcher::UrlEncoded("code".into(), code.into()))
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(token_body(access, Some("refresh")))
                .create_async()
                .await,
        );
        mocks.push(
            server
                .mock("GET", "/v1/me")
                .match_header("authorization", format!("Bearer {access}").as_str())
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(serde_json::json!({"id": user, "display_name": user}).to_string())
                .create_async()
                .await,
        );
    }

    let mut auth = Authenticator::new(config_for(&server));
    let mut store = SessionStore::new();

    let request = auth.begin_authorization(AccountType::Source).unwrap();
    auth.complete_authorization(&mut store, "code-src", &request.state)
        .await
        .unwrap();

    let request = auth.begin_authorization(AccountType::Destination).unwrap();
    auth.complete_authorization(&mut store, "code-dst", &request.state)
        .await
        .unwrap();

    assert_eq!(
        store.authorized(AccountType::Source).unwrap().access_token,
        "access-src"
    );
    assert_eq!(
        store
            .authorized(AccountType::Destination)
            .unwrap()
            .access_token,
        "access-dst"
    );
}

#[tokio::test]
async fn rejected_code_exchange_is_invalid_authorization_code() {
    let mut server = mockito::Server::new_async().await;

    let _token_mock = server
        .mock("POST", "/api/token")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "invalid_grant"}"#)
        .create_async()
        .await;

    let mut auth = Authenticator::new(config_for(&server));
    let mut store = SessionStore::new();

    let request = auth.begin_authorization(AccountType::Source).unwrap();
    let err = auth
        .complete_authorization(&mut store, "bad-code", &request.state)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Auth(AuthError::InvalidAuthorizationCode(_))
    ));
    assert!(store.get(AccountType::Source).is_none());

    // The challenge was consumed by the failed attempt.
    let err = auth
        .complete_authorization(&mut store, "bad-code", &request.state)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Auth(AuthError::CsrfMismatch)));
}

#[tokio::test]
async fn refresh_updates_session_and_retains_old_refresh_token() {
    let mut server = mockito::Server::new_async().await;

    let refresh_mock = server
        .mock("POST", "/api/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "refresh-1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(token_body("access-2", None))
        .create_async()
        .await;

    let auth = Authenticator::new(config_for(&server));
    let mut store = SessionStore::new();
    store.set(seeded_session(AccountType::Source, Some("refresh-1")));

    auth.refresh_access_token(&mut store, AccountType::Source)
        .await
        .unwrap();

    let session = store.authorized(AccountType::Source).unwrap();
    assert_eq!(session.access_token, "access-2");
    // Provider issued no new refresh token: the prior one is retained.
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
    assert!(!session.is_expired());

    refresh_mock.assert_async().await;
}

#[tokio::test]
async fn rejected_refresh_is_invalid_refresh_token() {
    let mut server = mockito::Server::new_async().await;

    let _token_mock = server
        .mock("POST", "/api/token")
        .with_status(400)
        .with_body(r#"{"error": "invalid_grant"}"#)
        .create_async()
        .await;

    let auth = Authenticator::new(config_for(&server));
    let mut store = SessionStore::new();
    store.set(seeded_session(AccountType::Destination, Some("revoked")));

    let err = auth
        .refresh_access_token(&mut store, AccountType::Destination)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Auth(AuthError::InvalidRefreshToken(_))
    ));

    // The stale session is left as-is; the caller must force a re-login.
    let session = store.get(AccountType::Destination).unwrap();
    assert_eq!(session.access_token, "stale-token");
}

#[tokio::test]
async fn refresh_without_stored_refresh_token_is_rejected() {
    let server = mockito::Server::new_async().await;

    let auth = Authenticator::new(config_for(&server));
    let mut store = SessionStore::new();
    store.set(seeded_session(AccountType::Source, None));

    let err = auth
        .refresh_access_token(&mut store, AccountType::Source)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Auth(AuthError::NoRefreshToken {
            account: AccountType::Source
        })
    ));
}

#[tokio::test]
async fn successful_login_upserts_profile_row() {
    let mut server = mockito::Server::new_async().await;

    let _token_mock = server
        .mock("POST", "/api/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(token_body("access-1", Some("refresh-1")))
        .create_async()
        .await;
    let _profile_mock = server
        .mock("GET", "/v1/me")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({"id": "user-1", "email": "u@example.com", "display_name": "U"})
                .to_string(),
        )
        .create_async()
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("trackshift.db");
    let profiles = ProfileStore::open_at(&db_path).unwrap();

    let mut auth = Authenticator::new(config_for(&server)).with_profile_store(profiles);
    let mut store = SessionStore::new();

    let request = auth.begin_authorization(AccountType::Source).unwrap();
    auth.complete_authorization(&mut store, "auth-code", &request.state)
        .await
        .unwrap();

    let readback = ProfileStore::open_at(&db_path).unwrap();
    let (email, account): (String, String) = readback
        .conn()
        .query_row(
            "SELECT email, account_type FROM users WHERE spotify_id = 'user-1'",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(email, "u@example.com");
    assert_eq!(account, "source");
}
