mod common;

use chrono::Utc;
use placesheet_sheets::{
    AuthError, ClientSecrets, LoopbackConsent, TokenClient, TokenStore, SPREADSHEETS_SCOPE,
};
use tempfile::TempDir;
use tokio::net::TcpListener;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{authenticator, token, CountingConsent};

#[tokio::test]
async fn valid_token_is_used_without_refresh_or_consent() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let token_uri = format!("{}/token", server.uri());
    let store = TokenStore::new(dir.path().join("token.json"));
    store.save(&token(&token_uri, 30, Some("1//old"))).unwrap();

    let consent = CountingConsent::new();
    let auth = authenticator(dir.path(), &token_uri, &consent);
    let credential = auth.credential().await.unwrap();

    assert_eq!(credential.token, "ya29.stored");
    assert_eq!(consent.calls(), 0);
}

#[tokio::test]
async fn expired_token_with_refresh_token_is_refreshed_and_persisted() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=1%2F%2Fold"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.refreshed",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token_uri = format!("{}/token", server.uri());
    let store = TokenStore::new(dir.path().join("token.json"));
    store.save(&token(&token_uri, -5, Some("1//old"))).unwrap();

    let consent = CountingConsent::new();
    let auth = authenticator(dir.path(), &token_uri, &consent);
    let credential = auth.credential().await.unwrap();

    assert_eq!(credential.token, "ya29.refreshed");
    assert_eq!(credential.refresh_token.as_deref(), Some("1//old"));
    assert_eq!(consent.calls(), 0);

    let persisted = store.load().unwrap().expect("token file should exist");
    assert_eq!(persisted.token, "ya29.refreshed");
    assert!(persisted.expiry.expect("expiry set") > Utc::now());
}

#[tokio::test]
async fn failed_refresh_surfaces_endpoint_error_without_consent() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
        )
        .mount(&server)
        .await;

    let token_uri = format!("{}/token", server.uri());
    let store = TokenStore::new(dir.path().join("token.json"));
    store.save(&token(&token_uri, -5, Some("1//revoked"))).unwrap();

    let consent = CountingConsent::new();
    let auth = authenticator(dir.path(), &token_uri, &consent);
    let err = auth.credential().await.unwrap_err();

    match err {
        AuthError::TokenEndpoint { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("expected TokenEndpoint, got: {other:?}"),
    }
    assert_eq!(consent.calls(), 0);
}

#[tokio::test]
async fn expired_token_without_refresh_token_runs_consent() {
    let dir = TempDir::new().unwrap();
    let token_uri = "https://oauth2.googleapis.com/token";
    let store = TokenStore::new(dir.path().join("token.json"));
    store.save(&token(token_uri, -5, None)).unwrap();

    let consent = CountingConsent::new();
    let auth = authenticator(dir.path(), token_uri, &consent);
    let credential = auth.credential().await.unwrap();

    assert_eq!(credential.token, "ya29.from-consent");
    assert_eq!(consent.calls(), 1);
    assert_eq!(store.load().unwrap().unwrap().token, "ya29.from-consent");
}

#[tokio::test]
async fn missing_token_file_runs_consent_and_writes_file() {
    let dir = TempDir::new().unwrap();
    let token_uri = "https://oauth2.googleapis.com/token";
    let token_path = dir.path().join("token.json");
    assert!(!token_path.exists());

    let consent = CountingConsent::new();
    let auth = authenticator(dir.path(), token_uri, &consent);
    auth.credential().await.unwrap();

    assert_eq!(consent.calls(), 1);
    assert!(token_path.exists());

    // A second run finds the stored token and stays quiet.
    auth.credential().await.unwrap();
    assert_eq!(consent.calls(), 1);
}

#[tokio::test]
async fn malformed_token_file_is_treated_as_missing() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("token.json"), "{ not json").unwrap();

    let consent = CountingConsent::new();
    let auth = authenticator(dir.path(), "https://oauth2.googleapis.com/token", &consent);
    auth.credential().await.unwrap();

    assert_eq!(consent.calls(), 1);
}

#[tokio::test]
async fn missing_client_secrets_fails_before_consent() {
    let dir = TempDir::new().unwrap();
    let consent = CountingConsent::new();
    let auth = authenticator(dir.path(), "https://oauth2.googleapis.com/token", &consent);
    std::fs::remove_file(dir.path().join("credentials.json")).unwrap();

    let err = auth.credential().await.unwrap_err();
    assert!(matches!(err, AuthError::Io { .. }), "got: {err:?}");
    assert_eq!(consent.calls(), 0);
}

#[tokio::test]
async fn loopback_consent_exchanges_code_from_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=4%2F0Ad-test"))
        .and(body_string_contains("code_verifier="))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.exchanged",
            "refresh_token": "1//exchanged",
            "expires_in": 3599,
            "scope": SPREADSHEETS_SCOPE,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let secrets = ClientSecrets {
        client_id: "id.apps.googleusercontent.com".to_owned(),
        client_secret: "shh".to_owned(),
        auth_uri: "https://accounts.google.com/o/oauth2/auth".to_owned(),
        token_uri: format!("{}/token", server.uri()),
    };
    let scopes = vec![SPREADSHEETS_SCOPE.to_owned()];
    let tokens = TokenClient::new(5).unwrap();
    let consent = LoopbackConsent {
        open_browser: false,
        ..LoopbackConsent::default()
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (url_tx, url_rx) = tokio::sync::oneshot::channel();

    let flow = consent.authorize_on(listener, &secrets, &scopes, &tokens, move |url| {
        let _ = url_tx.send(url.clone());
    });
    let browser = async {
        let url = url_rx.await.unwrap();
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        let callback = format!(
            "{}?state={}&code=4%2F0Ad-test",
            pairs["redirect_uri"], pairs["state"]
        );
        reqwest::get(callback).await.unwrap().status()
    };

    let (token, status) = tokio::join!(flow, browser);
    let token = token.unwrap();

    assert_eq!(status, 200);
    assert_eq!(token.token, "ya29.exchanged");
    assert_eq!(token.refresh_token.as_deref(), Some("1//exchanged"));
    assert_eq!(token.scopes, scopes);
}

#[tokio::test]
async fn loopback_consent_rejects_foreign_state() {
    let secrets = ClientSecrets {
        client_id: "id".to_owned(),
        client_secret: "shh".to_owned(),
        auth_uri: "https://accounts.google.com/o/oauth2/auth".to_owned(),
        token_uri: "http://127.0.0.1:1/token".to_owned(),
    };
    let scopes = vec![SPREADSHEETS_SCOPE.to_owned()];
    let tokens = TokenClient::new(5).unwrap();
    let consent = LoopbackConsent {
        open_browser: false,
        ..LoopbackConsent::default()
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (url_tx, url_rx) = tokio::sync::oneshot::channel();

    let flow = consent.authorize_on(listener, &secrets, &scopes, &tokens, move |url| {
        let _ = url_tx.send(url.clone());
    });
    let browser = async {
        let url = url_rx.await.unwrap();
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        let callback = format!("{}?state=forged&code=abc", pairs["redirect_uri"]);
        reqwest::get(callback).await.unwrap().status()
    };

    let (result, status) = tokio::join!(flow, browser);
    assert_eq!(status, 400);
    assert!(matches!(result, Err(AuthError::StateMismatch)));
}

#[tokio::test]
async fn loopback_consent_times_out_without_callback() {
    let secrets = ClientSecrets {
        client_id: "id".to_owned(),
        client_secret: "shh".to_owned(),
        auth_uri: "https://accounts.google.com/o/oauth2/auth".to_owned(),
        token_uri: "http://127.0.0.1:1/token".to_owned(),
    };
    let consent = LoopbackConsent {
        timeout: std::time::Duration::from_millis(50),
        open_browser: false,
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

    let result = consent
        .authorize_on(
            listener,
            &secrets,
            &[SPREADSHEETS_SCOPE.to_owned()],
            &TokenClient::new(5).unwrap(),
            |_| {},
        )
        .await;

    assert!(matches!(result, Err(AuthError::ConsentTimeout(_))));
}

#[tokio::test]
async fn loopback_consent_skips_idle_connection_before_callback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("code=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.after-idle",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&server)
        .await;

    let secrets = ClientSecrets {
        client_id: "id".to_owned(),
        client_secret: "shh".to_owned(),
        auth_uri: "https://accounts.google.com/o/oauth2/auth".to_owned(),
        token_uri: format!("{}/token", server.uri()),
    };
    let scopes = vec![SPREADSHEETS_SCOPE.to_owned()];
    let tokens = TokenClient::new(5).unwrap();
    let consent = LoopbackConsent {
        timeout: std::time::Duration::from_secs(10),
        open_browser: false,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (url_tx, url_rx) = tokio::sync::oneshot::channel();

    let flow = consent.authorize_on(listener, &secrets, &scopes, &tokens, move |url| {
        let _ = url_tx.send(url.clone());
    });
    let browser = async {
        let url = url_rx.await.unwrap();
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        let redirect = reqwest::Url::parse(&pairs["redirect_uri"]).unwrap();
        let port = redirect.port().unwrap();

        // A preconnect that never sends a request.
        let idle = tokio::net::TcpStream::connect(("127.0.0.1", port))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        let callback = format!("{redirect}?state={}&code=abc", pairs["state"]);
        let status = reqwest::get(callback).await.unwrap().status();
        drop(idle);
        status
    };

    let (token, status) = tokio::join!(flow, browser);

    assert_eq!(status, 200);
    assert_eq!(token.unwrap().token, "ya29.after-idle");
}

#[tokio::test]
async fn token_about_to_expire_is_refreshed_before_use() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.early-refresh",
            "expires_in": 3599
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token_uri = format!("{}/token", server.uri());
    let mut stored = token(&token_uri, 0, Some("1//old"));
    stored.expiry = Some(Utc::now() + chrono::Duration::seconds(20));
    TokenStore::new(dir.path().join("token.json"))
        .save(&stored)
        .unwrap();

    let consent = CountingConsent::new();
    let auth = authenticator(dir.path(), &token_uri, &consent);
    let credential = auth.credential().await.unwrap();

    assert_eq!(credential.token, "ya29.early-refresh");
    assert_eq!(consent.calls(), 0);
}
