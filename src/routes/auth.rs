use actix_web::{delete, get, post, web, HttpResponse, Responder};

use crate::{
    auth::{LoginRequest, MessageResponse, RefreshRequest, RefreshResponse, RegisterRequest},
    error::AppError,
    services::AppState,
};

/// Register a new user
///
/// Answers `201` on success, `400 {"errors": [...]}` when fields are invalid and
/// `400 {"error": "Email already exists"}` for a taken email.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    state.auth.register(register_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(MessageResponse::new("User registered")))
}

/// Login user
///
/// Returns `{accessToken, refreshToken, username}`.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let response = state.auth.login(login_data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Exchange a refresh token for a new access token.
///
/// `401` without a token, `403` when the token is invalid or expired.
#[post("/refresh-token")]
pub async fn refresh_token(
    state: web::Data<AppState>,
    body: web::Json<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    let access_token = state.auth.refresh(body.token.as_deref())?;
    Ok(HttpResponse::Ok().json(RefreshResponse { access_token }))
}

/// Lists registered users (email and username only).
#[get("/users")]
pub async fn list_users(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let users = state.auth.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Deletes a user and all of their tasks.
#[delete("/users/{email}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    email: web::Path<String>,
) -> Result<impl Responder, AppError> {
    state.auth.delete_user(&email).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("User deleted successfully")))
}
