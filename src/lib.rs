#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "Personal to-do lists over REST: registration and login with JWT access/refresh"]
#![doc = "tokens, and task CRUD where every lookup is scoped to the owning user."]
#![doc = "The binary (`main.rs`) wires these modules to PostgreSQL and serves them;"]
#![doc = "`client` is the typed consumer of the same API."]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;

pub use crate::error::AppError;
pub use crate::services::AppState;
