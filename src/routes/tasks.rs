use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

use crate::{
    auth::{AuthenticatedUser, MessageResponse},
    error::AppError,
    models::TaskInput,
    services::AppState,
};

/// Retrieves every task owned by the authenticated user, oldest first.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks.
/// - `401 Unauthorized`: missing or invalid bearer token.
#[get("")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(&user.email).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for the authenticated user.
///
/// ## Request Body:
/// - `title`: 3 to 50 characters.
/// - `description`: 5 to 200 characters.
/// - `priority` (optional): `baja`, `media` (default) or `alta`.
/// - `status` (optional): `pendiente` (default), `en progreso` or `completada`.
///
/// ## Responses:
/// - `201 Created`: the created task.
/// - `400 Bad Request`: `{"errors": [...]}` listing every violated rule.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.create(&user.email, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one task; `404` if it does not exist or belongs to someone else.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get(&user.email, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates a task the caller owns.
///
/// Title and description are always replaced; priority and status only when present.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `400 Bad Request`: invalid fields.
/// - `404 Not Found`: no such task for this user.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = state
        .tasks
        .update(&user.email, task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task the caller owns.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Task with id N has been deleted"}`.
/// - `404 Not Found`: no such task for this user.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let message = state.tasks.delete(&user.email, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(message)))
}
