use super::*;
use crate::auth::token::IdTokenClaims;
use crate::config::FirebaseOptions;
use crate::core::middleware::ApiKeyMiddleware;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use httpmock::prelude::*;
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use serde_json::json;

fn create_auth(server: &MockServer) -> FirebaseAuth {
    let client = ClientBuilder::new(Client::new())
        .with(ApiKeyMiddleware::new("test-api-key", Some("1:123:web:abc".to_string())))
        .build();
    FirebaseAuth::new_with_client(client, server.url("/v1"))
}

fn fake_id_token(payload: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"k1"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.signature", header, body)
}

#[tokio::test]
async fn test_sign_in_with_password() {
    let server = MockServer::start();
    let auth = create_auth(&server);

    let id_token = fake_id_token(json!({
        "iss": "https://securetoken.google.com/demo-project",
        "aud": "demo-project",
        "sub": "uid-1",
        "exp": 1_700_003_600,
        "iat": 1_700_000_000,
        "email": "alice@example.com"
    }));

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/accounts:signInWithPassword")
            .query_param("key", "test-api-key")
            .header("x-firebase-gmpid", "1:123:web:abc")
            .json_body(json!({
                "email": "alice@example.com",
                "password": "hunter22",
                "returnSecureToken": true
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "localId": "uid-1",
                "email": "alice@example.com",
                "idToken": id_token,
                "refreshToken": "refresh",
                "expiresIn": "3600",
                "registered": true
            }));
    });

    let credential = auth.sign_in_with_password("alice@example.com", "hunter22").await.unwrap();
    assert_eq!(credential.local_id, "uid-1");
    assert_eq!(credential.expires_in_secs(), Some(3600));
    assert_eq!(credential.registered, Some(true));

    let claims = credential.claims().unwrap();
    assert_eq!(claims.sub, "uid-1");
    assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
    assert_eq!(claims.expiration_time().unwrap().timestamp(), 1_700_003_600);

    mock.assert();
}

#[tokio::test]
async fn test_sign_up() {
    let server = MockServer::start();
    let auth = create_auth(&server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/accounts:signUp")
            .query_param("key", "test-api-key");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "localId": "uid-2",
                "email": "bob@example.com",
                "idToken": "a.b.c",
                "refreshToken": "refresh",
                "expiresIn": "3600"
            }));
    });

    let credential = auth.sign_up("bob@example.com", "s3cret!!").await.unwrap();
    assert_eq!(credential.local_id, "uid-2");
    mock.assert();
}

#[tokio::test]
async fn test_sign_in_error_message_is_surfaced() {
    let server = MockServer::start();
    let auth = create_auth(&server);

    server.mock(|when, then| {
        when.method(POST).path("/v1/accounts:signInWithPassword");
        then.status(400)
            .header("content-type", "application/json")
            .json_body(json!({
                "error": {
                    "code": 400,
                    "message": "INVALID_LOGIN_CREDENTIALS",
                    "errors": [{ "message": "INVALID_LOGIN_CREDENTIALS", "domain": "global", "reason": "invalid" }]
                }
            }));
    });

    let err = auth.sign_in_with_password("alice@example.com", "wrong").await.unwrap_err();
    match err {
        AuthError::ApiError(msg) => assert!(msg.contains("INVALID_LOGIN_CREDENTIALS")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_sign_in_with_google_credential() {
    let server = MockServer::start();
    let auth = create_auth(&server);

    let credential = GoogleAuthProvider::credential(Some("google-id-token"), None);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/accounts:signInWithIdp")
            .json_body(json!({
                "postBody": "id_token=google-id-token&providerId=google.com",
                "requestUri": "http://localhost",
                "returnSecureToken": true,
                "returnIdpCredential": true
            }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "localId": "uid-3",
                "idToken": "a.b.c",
                "refreshToken": "refresh",
                "expiresIn": "3600",
                "providerId": "google.com",
                "isNewUser": true
            }));
    });

    let result = auth.sign_in_with_credential(&credential, "http://localhost").await.unwrap();
    assert_eq!(result.provider_id.as_deref(), Some("google.com"));
    assert_eq!(result.is_new_user, Some(true));
    mock.assert();
}

#[tokio::test]
async fn test_send_password_reset_email() {
    let server = MockServer::start();
    let auth = create_auth(&server);

    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/accounts:sendOobCode")
            .json_body(json!({ "requestType": "PASSWORD_RESET", "email": "alice@example.com" }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "email": "alice@example.com" }));
    });

    auth.send_password_reset_email("alice@example.com").await.unwrap();
    mock.assert();
}

#[tokio::test]
async fn test_get_account_info() {
    let server = MockServer::start();
    let auth = create_auth(&server);

    server.mock(|when, then| {
        when.method(POST)
            .path("/v1/accounts:lookup")
            .json_body(json!({ "idToken": "token-1" }));
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "users": [{
                    "localId": "uid-1",
                    "email": "alice@example.com",
                    "emailVerified": true,
                    "providerUserInfo": [{ "providerId": "google.com", "federatedId": "1234" }]
                }]
            }));
    });

    let user = auth.get_account_info("token-1").await.unwrap();
    assert_eq!(user.local_id, "uid-1");
    assert!(user.email_verified);
    assert!(!user.disabled);
    assert_eq!(user.provider_user_info[0].provider_id, "google.com");
}

#[tokio::test]
async fn test_get_account_info_no_users() {
    let server = MockServer::start();
    let auth = create_auth(&server);

    server.mock(|when, then| {
        when.method(POST).path("/v1/accounts:lookup");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({}));
    });

    let err = auth.get_account_info("token-1").await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

#[test]
fn test_google_provider_scopes_and_parameters() {
    let mut provider = GoogleAuthProvider::new();
    provider.add_scope("email").add_scope("profile");
    assert_eq!(provider.scopes(), ["profile".to_string(), "email".to_string()]);

    provider.set_custom_parameters([("prompt", "select_account"), ("Client_Id", "nope")]);
    assert_eq!(provider.custom_parameters().len(), 1);
    assert_eq!(provider.custom_parameters()["prompt"], "select_account");
}

#[test]
fn test_google_provider_handler_url() {
    let options = FirebaseOptions {
        api_key: Some("test-api-key".to_string()),
        auth_domain: Some("demo-project.firebaseapp.com".to_string()),
        ..Default::default()
    };
    let mut provider = GoogleAuthProvider::new();
    provider.set_custom_parameters([("prompt", "consent")]);

    let url = provider
        .auth_handler_url(&options, "[DEFAULT]", AuthFlow::Redirect, Some("https://app.example.com/"))
        .unwrap();

    assert_eq!(url.host_str(), Some("demo-project.firebaseapp.com"));
    assert_eq!(url.path(), "/__/auth/handler");
    let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
    assert_eq!(pairs["apiKey"], "test-api-key");
    assert_eq!(pairs["authType"], "signInViaRedirect");
    assert_eq!(pairs["providerId"], "google.com");
    assert_eq!(pairs["scopes"], "profile");
    assert_eq!(pairs["redirectUrl"], "https://app.example.com/");
    assert_eq!(pairs["customParameters"], r#"{"prompt":"consent"}"#);
}

#[test]
fn test_google_provider_handler_url_requires_auth_domain() {
    let options = FirebaseOptions {
        api_key: Some("test-api-key".to_string()),
        ..Default::default()
    };
    let err = GoogleAuthProvider::new()
        .auth_handler_url(&options, "[DEFAULT]", AuthFlow::Popup, None)
        .unwrap_err();
    assert!(matches!(err, provider::ProviderError::MissingAuthDomain));
}

#[test]
fn test_decode_rejects_malformed_token() {
    assert!(IdTokenClaims::decode("not-a-jwt").is_err());
    assert!(IdTokenClaims::decode("a.!!!.c").is_err());
}

#[tokio::test]
async fn test_transport_error_hides_api_key() {
    let api_key = "AIzaSyTransportKey0123456789";
    let client = ClientBuilder::new(Client::new())
        .with(ApiKeyMiddleware::new(api_key, None))
        .build();
    // Nothing listens on port 1.
    let auth = FirebaseAuth::new_with_client(client, "http://127.0.0.1:1/v1".to_string());

    let err = auth.sign_up("alice@example.com", "hunter22").await.unwrap_err();

    assert!(matches!(err, AuthError::MiddlewareError(_) | AuthError::RequestError(_)));
    assert!(!err.to_string().contains(api_key), "display: {}", err);
    assert!(!format!("{:?}", err).contains(api_key), "debug: {:?}", err);
}
