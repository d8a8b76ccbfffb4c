use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::AppError;
use crate::models::{NewUser, Task, TaskDraft, User};
use crate::repository::{TaskRepository, UserRepository};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<String, User>,
    tasks: BTreeMap<i32, Task>,
    last_task_id: i32,
}

/// In-process users and tasks with the same semantics as the PostgreSQL
/// schema: unique emails, serial task ids and cascade delete.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::InternalServerError("Memory store lock poisoned".into()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock()?.users.get(email).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let mut state = self.lock()?;
        if state.users.contains_key(&user.email) {
            return Err(AppError::BadRequest("Email already exists".into()));
        }
        let user = User::from(user);
        state.users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    async fn delete(&self, email: &str) -> Result<bool, AppError> {
        let mut state = self.lock()?;
        if state.users.remove(email).is_none() {
            return Ok(false);
        }
        state.tasks.retain(|_, task| task.user_email != email);
        Ok(true)
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn list_for_owner(&self, owner: &str) -> Result<Vec<Task>, AppError> {
        Ok(self
            .lock()?
            .tasks
            .values()
            .filter(|task| task.user_email == owner)
            .cloned()
            .collect())
    }

    async fn find_owned(&self, id: i32, owner: &str) -> Result<Option<Task>, AppError> {
        Ok(self
            .lock()?
            .tasks
            .get(&id)
            .filter(|task| task.user_email == owner)
            .cloned())
    }

    async fn create(&self, owner: &str, draft: TaskDraft) -> Result<Task, AppError> {
        let mut state = self.lock()?;
        // Mirrors the foreign key on tasks.user_email.
        if !state.users.contains_key(owner) {
            return Err(AppError::DatabaseError(format!(
                "Task owner {} does not exist",
                owner
            )));
        }
        state.last_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: state.last_task_id,
            title: draft.title,
            description: draft.description,
            priority: draft.priority.unwrap_or_default(),
            status: draft.status.unwrap_or_default(),
            user_email: owner.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_owned(
        &self,
        id: i32,
        owner: &str,
        draft: TaskDraft,
    ) -> Result<Option<Task>, AppError> {
        let mut state = self.lock()?;
        let Some(task) = state
            .tasks
            .get_mut(&id)
            .filter(|task| task.user_email == owner)
        else {
            return Ok(None);
        };
        task.title = draft.title;
        task.description = draft.description;
        if let Some(priority) = draft.priority {
            task.priority = priority;
        }
        if let Some(status) = draft.status {
            task.status = status;
        }
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_owned(&self, id: i32, owner: &str) -> Result<bool, AppError> {
        let mut state = self.lock()?;
        let owned = state
            .tasks
            .get(&id)
            .is_some_and(|task| task.user_email == owner);
        if owned {
            state.tasks.remove(&id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskPriority, TaskStatus};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: "someone".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: "A description".to_string(),
            priority: None,
            status: None,
        }
    }

    #[actix_rt::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        UserRepository::create(&store, new_user("a@x.com")).await.unwrap();
        let err = UserRepository::create(&store, new_user("a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[actix_rt::test]
    async fn test_ids_increase_and_defaults_apply() {
        let store = MemoryStore::new();
        UserRepository::create(&store, new_user("a@x.com")).await.unwrap();

        let first = TaskRepository::create(&store, "a@x.com", draft("First")).await.unwrap();
        let second = TaskRepository::create(&store, "a@x.com", draft("Second")).await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(first.priority, TaskPriority::Medium);
        assert_eq!(first.status, TaskStatus::Pending);
    }

    #[actix_rt::test]
    async fn test_update_keeps_unset_enums() {
        let store = MemoryStore::new();
        UserRepository::create(&store, new_user("a@x.com")).await.unwrap();
        let created = TaskRepository::create(
            &store,
            "a@x.com",
            TaskDraft {
                priority: Some(TaskPriority::High),
                status: Some(TaskStatus::InProgress),
                ..draft("Original")
            },
        )
        .await
        .unwrap();

        let updated = store
            .update_owned(created.id, "a@x.com", draft("Renamed"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.priority, TaskPriority::High);
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[actix_rt::test]
    async fn test_foreign_owner_sees_nothing() {
        let store = MemoryStore::new();
        UserRepository::create(&store, new_user("a@x.com")).await.unwrap();
        UserRepository::create(&store, new_user("b@x.com")).await.unwrap();
        let task = TaskRepository::create(&store, "a@x.com", draft("Mine")).await.unwrap();

        assert!(store.find_owned(task.id, "b@x.com").await.unwrap().is_none());
        assert!(store
            .update_owned(task.id, "b@x.com", draft("Theirs"))
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete_owned(task.id, "b@x.com").await.unwrap());
        assert!(store.find_owned(task.id, "a@x.com").await.unwrap().is_some());
    }

    #[actix_rt::test]
    async fn test_deleting_user_cascades_to_tasks() {
        let store = MemoryStore::new();
        UserRepository::create(&store, new_user("a@x.com")).await.unwrap();
        let task = TaskRepository::create(&store, "a@x.com", draft("Mine")).await.unwrap();

        assert!(UserRepository::delete(&store, "a@x.com").await.unwrap());
        assert!(store.find_owned(task.id, "a@x.com").await.unwrap().is_none());
        assert!(!UserRepository::delete(&store, "a@x.com").await.unwrap());
    }
}
