pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{validation_messages, AppError};

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKind, TokenService};

pub const USERNAME_MESSAGE: &str = "El usuario no puede tener más de 20 caracteres y es requerido.";
pub const EMAIL_MESSAGE: &str = "Debe ser un correo válido.";
pub const PASSWORD_LENGTH_MESSAGE: &str = "La contraseña debe tener al menos 8 caracteres.";
pub const PASSWORD_UPPERCASE_MESSAGE: &str = "La contraseña debe tener al menos una mayúscula.";
pub const PASSWORD_SPECIAL_MESSAGE: &str =
    "La contraseña debe tener al menos un carácter especial.";

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref UPPERCASE_REGEX: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref SPECIAL_CHAR_REGEX: Regex = Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).unwrap();
}

fn has_special_char(password: &str) -> Result<(), ValidationError> {
    if SPECIAL_CHAR_REGEX.is_match(password) {
        return Ok(());
    }
    let mut error = ValidationError::new("special_char");
    error.message = Some(PASSWORD_SPECIAL_MESSAGE.into());
    Err(error)
}

/// Runs the derived rules, then adds the password rules `required` stops short of:
/// a missing password breaks all three.
fn validate_payload<T: Validate>(
    payload: &T,
    password: Option<&str>,
    field_order: &[&str],
) -> Result<(), AppError> {
    let mut errors = payload.validate().err().unwrap_or_else(ValidationErrors::new);
    if password.is_none() {
        for message in [PASSWORD_UPPERCASE_MESSAGE, PASSWORD_SPECIAL_MESSAGE] {
            let mut error = ValidationError::new("required");
            error.message = Some(message.into());
            errors.add("password", error);
        }
    }
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(validation_messages(
            &errors,
            field_order,
        )))
    }
}

/// Represents the payload for a user login request.
///
/// Login applies the same email and password rules as registration.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        required(message = "Debe ser un correo válido."),
        regex(path = "EMAIL_REGEX", message = "Debe ser un correo válido.")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "La contraseña debe tener al menos 8 caracteres."),
        length(min = 8, message = "La contraseña debe tener al menos 8 caracteres."),
        regex(
            path = "UPPERCASE_REGEX",
            message = "La contraseña debe tener al menos una mayúscula."
        ),
        custom = "has_special_char"
    )]
    pub password: Option<String>,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Required, at most 20 characters.
    #[validate(
        required(message = "El usuario no puede tener más de 20 caracteres y es requerido."),
        length(
            min = 1,
            max = 20,
            message = "El usuario no puede tener más de 20 caracteres y es requerido."
        )
    )]
    pub username: Option<String>,

    #[validate(
        required(message = "Debe ser un correo válido."),
        regex(path = "EMAIL_REGEX", message = "Debe ser un correo válido.")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "La contraseña debe tener al menos 8 caracteres."),
        length(min = 8, message = "La contraseña debe tener al menos 8 caracteres."),
        regex(
            path = "UPPERCASE_REGEX",
            message = "La contraseña debe tener al menos una mayúscula."
        ),
        custom = "has_special_char"
    )]
    pub password: Option<String>,
}

/// Validated credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Validated registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    /// Collects every violated rule at once.
    pub fn into_credentials(self) -> Result<Credentials, AppError> {
        validate_payload(&self, self.password.as_deref(), &["email", "password"])?;
        Ok(Credentials {
            email: self.email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        })
    }
}

impl RegisterRequest {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: Some(username.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    /// Collects every violated rule at once.
    pub fn into_registration(self) -> Result<Registration, AppError> {
        validate_payload(
            &self,
            self.password.as_deref(),
            &["username", "email", "password"],
        )?;
        Ok(Registration {
            username: self.username.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        })
    }
}

/// Tokens handed out by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub username: String,
}

/// Body of `POST /api/auth/refresh-token`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Plain confirmation body used by several endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn register_errors(request: RegisterRequest) -> Vec<String> {
        match request.into_registration() {
            Err(AppError::ValidationError(messages)) => messages,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_login_request_validation() {
        assert!(LoginRequest::new("test@example.com", "Passw0rd!")
            .into_credentials()
            .is_ok());

        match LoginRequest::new("testexample.com", "Passw0rd!").into_credentials() {
            Err(AppError::ValidationError(messages)) => assert_eq!(messages, vec![EMAIL_MESSAGE]),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_register_request_validation() {
        let registration = RegisterRequest::new("alice", "a@x.com", "Passw0rd!")
            .into_registration()
            .unwrap();
        assert_eq!(registration.username, "alice");
        assert_eq!(registration.email, "a@x.com");
    }

    #[test]
    fn test_register_collects_every_violation() {
        let messages = register_errors(RegisterRequest::new("a".repeat(21), "not-an-email", "short"));
        assert_eq!(
            messages,
            vec![
                USERNAME_MESSAGE,
                EMAIL_MESSAGE,
                PASSWORD_LENGTH_MESSAGE,
                PASSWORD_UPPERCASE_MESSAGE,
                PASSWORD_SPECIAL_MESSAGE,
            ]
        );
    }

    #[test]
    fn test_username_bounds() {
        assert_eq!(
            register_errors(RegisterRequest::new("", "a@x.com", "Passw0rd!")),
            vec![USERNAME_MESSAGE]
        );
        assert!(RegisterRequest::new("a".repeat(20), "a@x.com", "Passw0rd!")
            .into_registration()
            .is_ok());
    }

    #[test]
    fn test_missing_username_is_reported() {
        let request = RegisterRequest {
            username: None,
            ..RegisterRequest::new("", "a@x.com", "Passw0rd!")
        };
        assert_eq!(register_errors(request), vec![USERNAME_MESSAGE]);
    }

    #[test]
    fn test_missing_password_breaks_every_rule() {
        let request = RegisterRequest {
            password: None,
            ..RegisterRequest::new("alice", "a@x.com", "")
        };
        assert_eq!(
            register_errors(request),
            vec![
                PASSWORD_LENGTH_MESSAGE,
                PASSWORD_UPPERCASE_MESSAGE,
                PASSWORD_SPECIAL_MESSAGE,
            ]
        );

        let login = LoginRequest {
            password: None,
            ..LoginRequest::new("a@x.com", "")
        };
        match login.into_credentials() {
            Err(AppError::ValidationError(messages)) => assert_eq!(
                messages,
                vec![
                    PASSWORD_LENGTH_MESSAGE,
                    PASSWORD_UPPERCASE_MESSAGE,
                    PASSWORD_SPECIAL_MESSAGE,
                ]
            ),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_long_email_is_valid() {
        let email = format!("{}@example.com", "a".repeat(300));
        assert!(RegisterRequest::new("alice", email, "Passw0rd!")
            .into_registration()
            .is_ok());
    }

    #[test]
    fn test_password_rules() {
        assert_eq!(
            register_errors(RegisterRequest::new("alice", "a@x.com", "passw0rd!")),
            vec![PASSWORD_UPPERCASE_MESSAGE]
        );
        assert_eq!(
            register_errors(RegisterRequest::new("alice", "a@x.com", "Passw0rd1")),
            vec![PASSWORD_SPECIAL_MESSAGE]
        );
        assert_eq!(
            register_errors(RegisterRequest::new("alice", "a@x.com", "Pa!1")),
            vec![PASSWORD_LENGTH_MESSAGE]
        );
    }

    #[test]
    fn test_email_pattern() {
        for email in ["a@x", "a x@y.com", "@x.com", "a@@x.com"] {
            assert_eq!(
                register_errors(RegisterRequest::new("alice", email, "Passw0rd!")),
                vec![EMAIL_MESSAGE],
                "{} should be rejected",
                email
            );
        }
    }

    #[test]
    fn test_login_response_uses_camel_case() {
        let response = LoginResponse {
            access_token: "a".into(),
            refresh_token: "r".into(),
            username: "alice".into(),
        };
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
        assert_eq!(json["username"], "alice");
    }
}
