use std::sync::Arc;

use crate::error::AppError;
use crate::models::{Task, TaskInput};
use crate::repository::TaskRepository;

const TASK_NOT_FOUND: &str = "Task not found";

/// Task CRUD, always scoped to the calling user's email.
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<Task>, AppError> {
        self.tasks.list_for_owner(owner).await
    }

    pub async fn get(&self, owner: &str, id: i32) -> Result<Task, AppError> {
        self.tasks
            .find_owned(id, owner)
            .await?
            .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))
    }

    /// Priority defaults to `media` and status to `pendiente` when omitted.
    pub async fn create(&self, owner: &str, input: TaskInput) -> Result<Task, AppError> {
        let draft = input.into_draft()?;
        let task = self.tasks.create(owner, draft).await?;
        log::debug!("Created task {} for {}", task.id, owner);
        Ok(task)
    }

    /// Validation runs before the lookup, so invalid input on a foreign task is a 400.
    pub async fn update(&self, owner: &str, id: i32, input: TaskInput) -> Result<Task, AppError> {
        let draft = input.into_draft()?;
        self.tasks
            .update_owned(id, owner, draft)
            .await?
            .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))
    }

    /// Returns the confirmation message shown to the user.
    pub async fn delete(&self, owner: &str, id: i32) -> Result<String, AppError> {
        if self.tasks.delete_owned(id, owner).await? {
            Ok(format!("Task with id {} has been deleted", id))
        } else {
            Err(AppError::NotFound(TASK_NOT_FOUND.into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, TaskPriority, TaskStatus};
    use crate::repository::{MemoryStore, UserRepository};

    async fn service_with_users(emails: &[&str]) -> TaskService {
        let store = Arc::new(MemoryStore::new());
        for email in emails {
            UserRepository::create(
                &*store,
                NewUser {
                    email: email.to_string(),
                    username: "user".to_string(),
                    password_hash: "hash".to_string(),
                },
            )
            .await
            .unwrap();
        }
        TaskService::new(store)
    }

    #[actix_rt::test]
    async fn test_create_applies_defaults() {
        let tasks = service_with_users(&["a@x.com"]).await;
        let task = tasks
            .create("a@x.com", TaskInput::new("Buy milk", "Get 2% milk"))
            .await
            .unwrap();
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.user_email, "a@x.com");
    }

    #[actix_rt::test]
    async fn test_any_status_can_be_set_directly() {
        let tasks = service_with_users(&["a@x.com"]).await;
        let task = tasks
            .create("a@x.com", TaskInput::new("Buy milk", "Get 2% milk"))
            .await
            .unwrap();
        let updated = tasks
            .update(
                "a@x.com",
                task.id,
                TaskInput::new("Buy milk", "Get 2% milk").with_status(TaskStatus::Completed),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.priority, TaskPriority::Medium);
    }

    #[actix_rt::test]
    async fn test_other_users_task_is_not_found() {
        let tasks = service_with_users(&["a@x.com", "b@x.com"]).await;
        let task = tasks
            .create("a@x.com", TaskInput::new("Private", "Only mine"))
            .await
            .unwrap();

        assert!(matches!(tasks.get("b@x.com", task.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            tasks
                .update("b@x.com", task.id, TaskInput::new("Stolen", "Not yours"))
                .await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(tasks.delete("b@x.com", task.id).await, Err(AppError::NotFound(_))));
        assert!(tasks.list("b@x.com").await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_delete_message_includes_id() {
        let tasks = service_with_users(&["a@x.com"]).await;
        let task = tasks
            .create("a@x.com", TaskInput::new("Buy milk", "Get 2% milk"))
            .await
            .unwrap();
        let message = tasks.delete("a@x.com", task.id).await.unwrap();
        assert_eq!(message, format!("Task with id {} has been deleted", task.id));
        assert!(tasks.list("a@x.com").await.unwrap().is_empty());
    }
}
