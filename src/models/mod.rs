pub mod task;
pub mod user;

pub use task::{Task, TaskDraft, TaskInput, TaskPriority, TaskStatus};
pub use user::{NewUser, User};
