//! Persistence ports.
//!
//! Services only see these traits. `postgres` is the production adapter;
//! `memory` keeps everything in process and backs the test suites.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskDraft, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Fails with `AppError::BadRequest` when the email is already taken.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn list(&self) -> Result<Vec<User>, AppError>;

    /// Deletes the user and, by cascade, every task they own.
    /// Returns `false` when no such user exists.
    async fn delete(&self, email: &str) -> Result<bool, AppError>;
}

/// Every lookup is scoped by id *and* owner email, so a task owned by someone
/// else is indistinguishable from a missing one.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list_for_owner(&self, owner: &str) -> Result<Vec<Task>, AppError>;

    async fn find_owned(&self, id: i32, owner: &str) -> Result<Option<Task>, AppError>;

    /// Inserts a task; unset priority/status take their defaults.
    async fn create(&self, owner: &str, draft: TaskDraft) -> Result<Task, AppError>;

    /// Applies title/description and any provided priority/status.
    /// Returns `None` when the task does not exist or is not owned by `owner`.
    async fn update_owned(
        &self,
        id: i32,
        owner: &str,
        draft: TaskDraft,
    ) -> Result<Option<Task>, AppError>;

    /// Returns `false` when the task does not exist or is not owned by `owner`.
    async fn delete_owned(&self, id: i32, owner: &str) -> Result<bool, AppError>;
}
