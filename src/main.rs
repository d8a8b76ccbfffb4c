use std::io;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use todo_api::{
    auth::TokenService,
    config::Config,
    repository::{postgres, PgStore},
    routes::{self, health},
    AppState,
};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;
    if config.jwt.uses_default_secrets() {
        log::warn!("JWT_SECRET or JWT_REFRESH_SECRET is not set; using insecure default secrets");
    }

    let pool = postgres::connect(&config.database)
        .await
        .map_err(|e| startup_error("Failed to connect to database", e))?;
    log::info!(
        "Connected to database {} at {}:{}",
        config.database.name,
        config.database.host,
        config.database.port
    );
    postgres::migrate(&pool)
        .await
        .map_err(|e| startup_error("Failed to run migrations", e))?;

    let store = Arc::new(PgStore::new(pool));
    let state = web::Data::new(AppState::new(
        store.clone(),
        store,
        TokenService::from_settings(&config.jwt),
        config.bcrypt_cost,
    ));

    log::info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(routes::cors())
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
