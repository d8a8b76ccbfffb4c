use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::error::{validation_messages, AppError};

pub const TITLE_LENGTH_MESSAGE: &str = "El título debe tener entre 3 y 50 caracteres.";
pub const DESCRIPTION_LENGTH_MESSAGE: &str = "La descripción debe tener entre 5 y 200 caracteres.";
pub const PRIORITY_MESSAGE: &str = "La prioridad debe ser baja, media o alta.";
pub const STATUS_MESSAGE: &str = "El estado debe ser pendiente, en progreso o completada.";

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum; the labels are the ones the UI shows.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority")]
pub enum TaskPriority {
    #[serde(rename = "baja")]
    #[sqlx(rename = "baja")]
    Low,
    #[default]
    #[serde(rename = "media")]
    #[sqlx(rename = "media")]
    Medium,
    #[serde(rename = "alta")]
    #[sqlx(rename = "alta")]
    High,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
///
/// The UI suggests `Pending -> InProgress -> Completed`, but any value may be set directly.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status")]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "pendiente")]
    #[sqlx(rename = "pendiente")]
    Pending,
    #[serde(rename = "en progreso")]
    #[sqlx(rename = "en progreso")]
    InProgress,
    #[serde(rename = "completada")]
    #[sqlx(rename = "completada")]
    Completed,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "baja",
            TaskPriority::Medium => "media",
            TaskPriority::High => "alta",
        }
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pendiente",
            TaskStatus::InProgress => "en progreso",
            TaskStatus::Completed => "completada",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "baja" => Ok(TaskPriority::Low),
            "media" => Ok(TaskPriority::Medium),
            "alta" => Ok(TaskPriority::High),
            _ => Err(AppError::ValidationError(vec![PRIORITY_MESSAGE.into()])),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pendiente" => Ok(TaskStatus::Pending),
            "en progreso" => Ok(TaskStatus::InProgress),
            "completada" => Ok(TaskStatus::Completed),
            _ => Err(AppError::ValidationError(vec![STATUS_MESSAGE.into()])),
        }
    }
}

fn validate_priority(value: &str) -> Result<(), ValidationError> {
    value.parse::<TaskPriority>().map(|_| ()).map_err(|_| {
        let mut error = ValidationError::new("priority");
        error.message = Some(Cow::from(PRIORITY_MESSAGE));
        error
    })
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    value.parse::<TaskStatus>().map(|_| ()).map_err(|_| {
        let mut error = ValidationError::new("status");
        error.message = Some(Cow::from(STATUS_MESSAGE));
        error
    })
}

/// Raw payload for creating or updating a task.
///
/// Every field is optional at the serde level so that a missing title or a
/// misspelled status is reported as a validation message rather than a JSON error.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(
        required(message = "El título debe tener entre 3 y 50 caracteres."),
        length(min = 3, max = 50, message = "El título debe tener entre 3 y 50 caracteres.")
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "La descripción debe tener entre 5 y 200 caracteres."),
        length(min = 5, max = 200, message = "La descripción debe tener entre 5 y 200 caracteres.")
    )]
    pub description: Option<String>,

    #[validate(custom = "validate_priority")]
    pub priority: Option<String>,

    #[validate(custom = "validate_status")]
    pub status: Option<String>,
}

impl TaskInput {
    const FIELD_ORDER: [&'static str; 4] = ["title", "description", "priority", "status"];

    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority.as_str().to_string());
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status.as_str().to_string());
        self
    }

    /// Runs every field rule and returns the typed draft, or all messages at once.
    pub fn into_draft(self) -> Result<TaskDraft, AppError> {
        if let Err(errors) = self.validate() {
            return Err(AppError::ValidationError(validation_messages(
                &errors,
                &Self::FIELD_ORDER,
            )));
        }

        Ok(TaskDraft {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            priority: self.priority.as_deref().map(str::parse).transpose()?,
            status: self.status.as_deref().map(str::parse).transpose()?,
        })
    }
}

/// A validated task payload. `None` priority/status means "default on create,
/// unchanged on update".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    /// Email of the owning user.
    #[serde(rename = "user")]
    pub user_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
