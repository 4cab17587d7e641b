use anyhow::{Context, Result};
use async_trait::async_trait;
use bookshelf::{
    api,
    auth::{hash_password, AuthConfig, AuthState, Claims, TokenIssuer},
    users::{MemoryUserStore, Role, User, UserStore, UserStoreError},
};
use chrono::Utc;
use reqwest::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    Client, StatusCode,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use uuid::Uuid;

const SECRET: &str = "integration-secret";
const EMAIL: &str = "a@b.com";
const PASSWORD: &str = "correct";

struct TestServer {
    addr: SocketAddr,
    client: Client,
    user: User,
    auth_state: Arc<AuthState>,
}

// Every lookup fails as if the database were down.
struct UnreachableStore;

#[async_trait]
impl UserStore for UnreachableStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, UserStoreError> {
        Err(UserStoreError::InvalidData("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), UserStoreError> {
        Err(UserStoreError::InvalidData("connection refused".to_string()))
    }
}

fn ada(password_hash: String) -> User {
    User {
        id: Uuid::new_v4(),
        email: EMAIL.to_string(),
        password_hash,
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        role: Role::User,
    }
}

impl TestServer {
    async fn start() -> Result<Self> {
        let user = ada(hash_password(PASSWORD).await?);
        let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new().with_user(user.clone()));
        Self::with_store(users, user).await
    }

    async fn with_store(users: Arc<dyn UserStore>, user: User) -> Result<Self> {
        let config = AuthConfig::new(SecretString::from(SECRET)).with_token_ttl_seconds(600);
        let auth_state = Arc::new(AuthState::new(config, users.clone())?);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = api::app(auth_state.clone(), users);

        tokio::spawn(async move {
            let _ = axum::serve(listener, app.into_make_service()).await;
        });

        Ok(Self {
            addr,
            client: Client::new(),
            user,
            auth_state,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn login(&self, body: Value) -> Result<(StatusCode, Value)> {
        let response = self
            .client
            .post(self.url("/users/login"))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    async fn login_raw(&self, content_type: &str, body: &str) -> Result<(StatusCode, Value)> {
        let response = self
            .client
            .post(self.url("/users/login"))
            .header(CONTENT_TYPE, content_type)
            .body(body.to_string())
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    async fn profile(&self, authorization: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut request = self.client.get(self.url("/users/profile"));
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        let response = request.send().await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }
}

fn unauthorized_body() -> Value {
    json!({ "statusCode": 401, "message": "Unauthorized" })
}

fn server_error_body() -> Value {
    json!({ "statusCode": 500, "message": "Internal server error" })
}

#[tokio::test]
async fn login_then_profile_round_trip() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = server
        .login(json!({ "email": EMAIL, "password": PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], json!(server.user.id));
    assert_eq!(body["email"], EMAIL);
    assert_eq!(body["firstName"], "Ada");
    assert_eq!(body["lastName"], "Lovelace");
    assert_eq!(body["role"], "USER");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());

    let token = body["token"].as_str().context("token missing from login")?;

    let (status, claims) = server.profile(Some(&format!("Bearer {token}"))).await?;
    assert_eq!(status, StatusCode::OK);

    let claims: Claims = serde_json::from_value(claims)?;
    assert_eq!(claims.sub, server.user.id);
    assert_eq!(claims.email, EMAIL);
    assert_eq!(claims.role, Role::User);
    assert_eq!(claims.exp - claims.iat, 600);

    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() -> Result<()> {
    let server = TestServer::start().await?;

    let (wrong_status, wrong_body) = server
        .login(json!({ "email": EMAIL, "password": "wrong" }))
        .await?;
    let (unknown_status, unknown_body) = server
        .login(json!({ "email": "nobody@b.com", "password": PASSWORD }))
        .await?;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unauthorized_body());
    assert_eq!(wrong_body, unknown_body);

    Ok(())
}

#[tokio::test]
async fn blank_credentials_are_unauthorized() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = server
        .login(json!({ "email": "  ", "password": "" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, unauthorized_body());

    let (status, _) = server.login(json!({})).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn extra_login_fields_are_ignored() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = server
        .login(json!({ "email": EMAIL, "password": PASSWORD, "rememberMe": true }))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], EMAIL);

    Ok(())
}

#[tokio::test]
async fn form_encoded_login_is_accepted() -> Result<()> {
    let server = TestServer::start().await?;

    let response = server
        .client
        .post(server.url("/users/login"))
        .form(&[("email", EMAIL), ("password", PASSWORD), ("rememberMe", "on")])
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    let token = body["token"].as_str().context("token missing from login")?;

    let (status, _) = server.profile(Some(&format!("Bearer {token}"))).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .login_raw(
            "application/x-www-form-urlencoded",
            "email=a%40b.com&password=wrong",
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, unauthorized_body());

    Ok(())
}

#[tokio::test]
async fn unparseable_login_body_is_bad_request() -> Result<()> {
    let server = TestServer::start().await?;

    // no JSON content type
    let (status, body) = server
        .login_raw("text/plain", r#"{"email":"a@b.com","password":"correct"}"#)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);

    // JSON content type, body is not JSON
    let (status, body) = server.login_raw("application/json", "email=a@b.com").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);

    Ok(())
}

#[tokio::test]
async fn email_is_matched_as_sent() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = server
        .login(json!({ "email": " a@b.com ", "password": PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, unauthorized_body());

    Ok(())
}

#[tokio::test]
async fn corrupt_stored_hash_is_a_server_error() -> Result<()> {
    let user = ada("not-a-phc-string".to_string());
    let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new().with_user(user.clone()));
    let server = TestServer::with_store(users, user).await?;

    let (status, body) = server
        .login(json!({ "email": EMAIL, "password": PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, server_error_body());

    Ok(())
}

#[tokio::test]
async fn database_failure_at_login_is_a_server_error() -> Result<()> {
    let user = ada(hash_password(PASSWORD).await?);
    let server = TestServer::with_store(Arc::new(UnreachableStore), user).await?;

    let (status, body) = server
        .login(json!({ "email": EMAIL, "password": PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, server_error_body());

    let response = server.client.get(server.url("/health")).send().await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    Ok(())
}

#[tokio::test]
async fn profile_rejects_bad_bearer_tokens() -> Result<()> {
    let server = TestServer::start().await?;

    // no header
    let (status, body) = server.profile(None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, unauthorized_body());

    // wrong scheme
    let (status, _) = server.profile(Some("Basic YTpi")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // malformed
    let (status, body) = server.profile(Some("Bearer not.a.jwt")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, unauthorized_body());

    // expired
    let past = Utc::now().timestamp() - 3600;
    let expired = server.auth_state.issuer().issue_at(&server.user, past)?;
    let (status, body) = server.profile(Some(&format!("Bearer {expired}"))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, unauthorized_body());

    // signed with another secret
    let other = TokenIssuer::new(&SecretString::from("another-secret"), 600)?;
    let forged = other.issue(&server.user)?;
    let (status, body) = server.profile(Some(&format!("Bearer {forged}"))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, unauthorized_body());

    Ok(())
}

#[tokio::test]
async fn health_and_root_answer() -> Result<()> {
    let server = TestServer::start().await?;

    let response = server.client.get(server.url("/health")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body: Value = response.json().await?;
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(body["database"], "ok");

    let response = server.client.get(server.url("/")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
