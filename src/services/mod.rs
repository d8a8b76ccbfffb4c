pub mod auth;
pub mod tasks;

use std::sync::Arc;

use crate::auth::TokenService;
use crate::repository::{TaskRepository, UserRepository};

pub use auth::AuthService;
pub use tasks::TaskService;

/// Everything request handlers need, shared through `web::Data`.
pub struct AppState {
    pub auth: AuthService,
    pub tasks: TaskService,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        tokens: TokenService,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            auth: AuthService::new(users, tokens, bcrypt_cost),
            tasks: TaskService::new(tasks),
        }
    }
}
