use std::env;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;

use crate::auth::token::{ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};

pub const DEFAULT_ACCESS_SECRET: &str = "default_secret";
pub const DEFAULT_REFRESH_SECRET: &str = "default_refresh_secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    /// `DB_SSL=false` turns TLS off; anything else requires it.
    pub ssl: bool,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
            .ssl_mode(if self.ssl {
                PgSslMode::Require
            } else {
                PgSslMode::Disable
            })
    }
}

/// Token signing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl JwtSettings {
    /// True when either secret is one of the built-in fallbacks.
    pub fn uses_default_secrets(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET || self.refresh_secret == DEFAULT_REFRESH_SECRET
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub bcrypt_cost: u32,
    pub server_port: u16,
    pub server_host: String,
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn parsed_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}

impl Config {
    /// Reads the process environment. Call `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = DatabaseSettings {
            host: required(&lookup, "DB_HOST")?,
            port: {
                let value = required(&lookup, "DB_PORT")?;
                value.parse().map_err(|_| ConfigError::Invalid {
                    var: "DB_PORT",
                    value,
                })?
            },
            user: required(&lookup, "DB_USER")?,
            password: required(&lookup, "DB_PASSWORD")?,
            name: required(&lookup, "DB_NAME")?,
            ssl: lookup("DB_SSL").as_deref() != Some("false"),
            max_connections: parsed_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
        };

        let jwt = JwtSettings {
            access_secret: lookup("JWT_SECRET").unwrap_or_else(|| DEFAULT_ACCESS_SECRET.to_string()),
            refresh_secret: lookup("JWT_REFRESH_SECRET")
                .unwrap_or_else(|| DEFAULT_REFRESH_SECRET.to_string()),
            access_ttl_secs: parsed_or(&lookup, "ACCESS_TOKEN_TTL_SECS", ACCESS_TOKEN_TTL_SECS)?,
            refresh_ttl_secs: parsed_or(&lookup, "REFRESH_TOKEN_TTL_SECS", REFRESH_TOKEN_TTL_SECS)?,
        };

        Ok(Self {
            database,
            jwt,
            bcrypt_cost: parsed_or(&lookup, "BCRYPT_COST", 10)?,
            server_port: parsed_or(&lookup, "SERVER_PORT", 3000)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
