use std::sync::Arc;

use crate::auth::{
    hash_password, verify_password, LoginRequest, LoginResponse, RegisterRequest, TokenService,
};
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::repository::UserRepository;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";
pub const EMAIL_TAKEN_MESSAGE: &str = "Email already exists";

/// Registration, login and token refresh.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            users,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Validates the payload, rejects taken emails and stores a bcrypt hash.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AppError> {
        let registration = request.into_registration()?;

        if self.users.find_by_email(&registration.email).await?.is_some() {
            return Err(AppError::BadRequest(EMAIL_TAKEN_MESSAGE.into()));
        }

        let password_hash = hash_password(&registration.password, self.bcrypt_cost)?;
        let user = self
            .users
            .create(NewUser {
                email: registration.email,
                username: registration.username,
                password_hash,
            })
            .await?;

        log::info!("Registered user {}", user.email);
        Ok(user)
    }

    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let credentials = request.into_credentials()?;

        let user = self.users.find_by_email(&credentials.email).await?;
        let authenticated = match &user {
            Some(user) => verify_password(&credentials.password, &user.password)?,
            None => false,
        };
        let user = match user {
            Some(user) if authenticated => user,
            _ => {
                log::info!("Failed login for {}", credentials.email);
                return Err(AppError::BadRequest(INVALID_CREDENTIALS_MESSAGE.into()));
            }
        };

        Ok(LoginResponse {
            access_token: self.tokens.issue_access(&user.email)?,
            refresh_token: self.tokens.issue_refresh(&user.email)?,
            username: user.username,
        })
    }

    /// Mints a new access token from a refresh token.
    ///
    /// A missing token is `Unauthorized`; an invalid one is `Forbidden`.
    pub fn refresh(&self, token: Option<&str>) -> Result<String, AppError> {
        match token.map(str::trim).filter(|token| !token.is_empty()) {
            Some(token) => self.tokens.refresh(token),
            None => Err(AppError::Unauthorized("Refresh token is required".into())),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.users.list().await
    }

    pub async fn delete_user(&self, email: &str) -> Result<(), AppError> {
        if self.users.delete(email).await? {
            log::info!("Deleted user {}", email);
            Ok(())
        } else {
            Err(AppError::NotFound("User not found".into()))
        }
    }
}
