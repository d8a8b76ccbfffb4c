#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{test, web};
use serde_json::{json, Value};
use todo_api::{auth::TokenService, repository::MemoryStore, AppState};

pub const ACCESS_SECRET: &str = "test_access_secret";
pub const REFRESH_SECRET: &str = "test_refresh_secret";
pub const PASSWORD: &str = "Passw0rd!";

/// Builds the full application the way `main.rs` does, over an in-memory store.
#[allow(unused_macros)]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap(todo_api::routes::cors())
                .wrap(actix_web::middleware::Logger::default())
                .service(todo_api::routes::health::health)
                .service(actix_web::web::scope("/api").configure(todo_api::routes::config)),
        )
        .await
    };
}

pub fn test_state() -> web::Data<AppState> {
    test_state_with_tokens(TokenService::new(ACCESS_SECRET, REFRESH_SECRET))
}

pub fn test_state_with_tokens(tokens: TokenService) -> web::Data<AppState> {
    let store = Arc::new(MemoryStore::new());
    // bcrypt's minimum cost keeps the suite fast.
    web::Data::new(AppState::new(store.clone(), store, tokens, 4))
}

pub struct TestUser {
    pub email: String,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (actix_web::http::header::HeaderName, String) {
        (
            actix_web::http::header::AUTHORIZATION,
            format!("Bearer {}", self.access_token),
        )
    }
}

pub async fn register_and_login_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    username: &str,
) -> Result<TestUser, String> {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": username, "email": email, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    if status.as_u16() != 201 {
        let body = test::read_body(resp).await;
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    if !status.is_success() {
        return Err(format!(
            "Failed to login. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    let json: Value = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse login response: {}", e))?;

    Ok(TestUser {
        email: email.to_string(),
        username: json["username"].as_str().unwrap_or_default().to_string(),
        access_token: json["accessToken"].as_str().unwrap_or_default().to_string(),
        refresh_token: json["refreshToken"].as_str().unwrap_or_default().to_string(),
    })
}
