pub mod auth;
pub mod health;
pub mod tasks;

use actix_cors::Cors;
use actix_web::{http::header, web};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Mounts the REST surface; expected under the `/api` scope.
///
/// `/auth` is public, everything under `/tasks` requires a bearer access token.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login)
                .service(auth::refresh_token)
                .service(auth::list_users)
                .service(auth::delete_user),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

/// Malformed JSON bodies answer 400 with the usual `{"error": ...}` shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid JSON payload: {}", err)).into()
    })
}

/// Any origin may call the API with JSON bodies and bearer tokens.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_any_header()
        .max_age(3600)
}
