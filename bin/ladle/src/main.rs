//! # ladle Binary
//!
//! The entry point that assembles the application based on compile-time
//! features.

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use ladle_api::handlers::AppState;
use ladle_api::middleware::{cors_policy, standard_middleware};

// Feature-gated imports: swap implementations without touching the wiring
#[cfg(feature = "db-sqlite")]
use ladle_db_sqlite::SqliteStore;

#[cfg(feature = "auth-jwt")]
use ladle_auth_jwt::JwtAuthProvider;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:ladle.db".to_string());
    let secret = std::env::var("ACCESS_TOKEN_SECRET").context("ACCESS_TOKEN_SECRET must be set")?;
    let token_ttl: i64 = std::env::var("TOKEN_TTL_SECS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(3600);
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let store = SqliteStore::new(&database_url)
        .await
        .context("failed to init SQLite")?;

    // 2. Initialize Auth Implementation
    #[cfg(feature = "auth-jwt")]
    let auth = JwtAuthProvider::new(&secret, token_ttl);

    // 3. Wrap in AppState (dynamic dispatch for maximum flexibility)
    let state = web::Data::new(AppState {
        users: Box::new(store.clone()),
        recipes: Box::new(store.clone()),
        requests: Box::new(store),
        auth: Box::new(auth),
    });

    log::info!("ladle starting on http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(standard_middleware())
            .wrap(cors_policy())
            .service(web::scope("/api").configure(ladle_api::configure_routes))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
