use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;
use crate::error::AppError;

/// Access tokens live 15 minutes.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
/// Refresh tokens live 7 days.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

pub const INVALID_REFRESH_MESSAGE: &str = "Invalid refresh, please login again";

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Email of the user the token was issued to.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// The two kinds of token; each is signed with its own secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KeyPair {
    fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs),
        }
    }
}

/// Issues and verifies access and refresh tokens.
pub struct TokenService {
    access: KeyPair,
    refresh: KeyPair,
}

impl TokenService {
    /// Builds a service with the default lifetimes (15 minutes / 7 days).
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self::with_ttls(
            access_secret,
            refresh_secret,
            ACCESS_TOKEN_TTL_SECS,
            REFRESH_TOKEN_TTL_SECS,
        )
    }

    pub fn with_ttls(
        access_secret: &str,
        refresh_secret: &str,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Self {
        Self {
            access: KeyPair::new(access_secret, access_ttl_secs),
            refresh: KeyPair::new(refresh_secret, refresh_ttl_secs),
        }
    }

    pub fn from_settings(settings: &JwtSettings) -> Self {
        Self::with_ttls(
            &settings.access_secret,
            &settings.refresh_secret,
            settings.access_ttl_secs,
            settings.refresh_ttl_secs,
        )
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Signs a token of the given kind carrying `email`.
    pub fn issue(&self, kind: TokenKind, email: &str) -> Result<String, AppError> {
        let keys = self.keys(kind);
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(keys.ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry overflow".into()))?;

        let claims = Claims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::default(), &claims, &keys.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    pub fn issue_access(&self, email: &str) -> Result<String, AppError> {
        self.issue(TokenKind::Access, email)
    }

    pub fn issue_refresh(&self, email: &str) -> Result<String, AppError> {
        self.issue(TokenKind::Refresh, email)
    }

    /// Checks signature and expiry against the secret of `kind`.
    pub fn decode(&self, kind: TokenKind, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        decode::<Claims>(token, &self.keys(kind).decoding, &validation).map(|data| data.claims)
    }

    /// Verifies a bearer access token.
    ///
    /// Returns `AppError::Unauthorized` if the token is malformed, its signature is invalid,
    /// or it has expired.
    pub fn verify_access(&self, token: &str) -> Result<Claims, AppError> {
        self.decode(TokenKind::Access, token)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }

    /// Verifies a refresh token; any failure is `AppError::Forbidden`.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AppError> {
        self.decode(TokenKind::Refresh, token).map_err(|e| {
            log::debug!("Refresh token rejected: {}", e);
            AppError::Forbidden(INVALID_REFRESH_MESSAGE.into())
        })
    }

    /// Exchanges a valid refresh token for a fresh access token.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let claims = self.verify_refresh(refresh_token)?;
        self.issue_access(&claims.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &str = "test_access_secret";
    const REFRESH_SECRET: &str = "test_refresh_secret";

    fn service() -> TokenService {
        TokenService::new(ACCESS_SECRET, REFRESH_SECRET)
    }

    fn signed_with(secret: &str, email: &str, exp: i64) -> String {
        let claims = Claims {
            email: email.to_string(),
            iat: exp - 60,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn tamper(token: &str) -> String {
        let (head, signature) = token.rsplit_once('.').unwrap();
        let replacement = if signature.starts_with('A') { "B" } else { "A" };
        format!("{}.{}{}", head, replacement, &signature[1..])
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = service();
        let access = tokens.issue_access("a@x.com").unwrap();
        let claims = tokens.verify_access(&access).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_TTL_SECS);

        let refresh = tokens.issue_refresh("a@x.com").unwrap();
        let claims = tokens.verify_refresh(&refresh).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp - claims.iat, REFRESH_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_kinds_do_not_cross() {
        let tokens = service();
        let access = tokens.issue_access("a@x.com").unwrap();
        let refresh = tokens.issue_refresh("a@x.com").unwrap();

        assert!(matches!(tokens.verify_refresh(&access), Err(AppError::Forbidden(_))));
        assert!(matches!(tokens.verify_access(&refresh), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_refresh_mints_later_access_token() {
        let tokens = service();
        let expired_access_exp = Utc::now().timestamp() - 60;
        let expired_access = signed_with(ACCESS_SECRET, "a@x.com", expired_access_exp);
        assert!(tokens.verify_access(&expired_access).is_err());

        let refresh = tokens.issue_refresh("a@x.com").unwrap();
        let new_access = tokens.refresh(&refresh).unwrap();
        let claims = tokens.verify_access(&new_access).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert!(claims.exp > expired_access_exp);
    }

    #[test]
    fn test_expired_refresh_is_forbidden() {
        let tokens = service();
        let expired = signed_with(
            REFRESH_SECRET,
            "a@x.com",
            Utc::now().timestamp() - 2 * 60 * 60,
        );
        match tokens.refresh(&expired) {
            Err(AppError::Forbidden(msg)) => assert_eq!(msg, INVALID_REFRESH_MESSAGE),
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_tampered_refresh_is_forbidden() {
        let tokens = service();
        let refresh = tokens.issue_refresh("a@x.com").unwrap();
        assert!(matches!(
            tokens.refresh(&tamper(&refresh)),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(tokens.refresh("garbage"), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_invalid_token_signature() {
        let tokens = service();
        let token_signed_with_other_secret = signed_with(
            "a_completely_different_secret",
            "a@x.com",
            Utc::now().timestamp() + 600,
        );
        match tokens.verify_access(&token_signed_with_other_secret) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("Invalid token: InvalidSignature"));
            }
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
        }
    }

    #[test]
    fn test_token_expiration() {
        let tokens = service();
        let expired = signed_with(ACCESS_SECRET, "a@x.com", Utc::now().timestamp() - 2 * 60 * 60);
        match tokens.verify_access(&expired) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("Invalid token: ExpiredSignature"));
            }
            Ok(_) => panic!("Token should have been invalid due to expiration"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }
}
