//! # ladle-api
//!
//! The web routing and orchestration layer for ladle.

pub mod error;
pub mod handlers;
pub mod middleware;

use actix_web::web;

use crate::error::ApiError;
use ladle_core::error::AppError;

/// Configures the routes for the recipe service.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the API under different paths if needed (e.g., /api).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Malformed JSON payloads answer in the same {message} envelope as
    // every other validation failure.
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::from(AppError::ValidationError(err.to_string())).into()
    }));

    cfg.service(
        web::scope("")
            .route("/auth/login", web::post().to(handlers::auth::login))
            // Fixed segments register ahead of their {id} siblings
            .route(
                "/recipes/manage",
                web::get().to(handlers::recipes::manage_recipes),
            )
            .route("/recipes", web::get().to(handlers::recipes::list_recipes))
            .route("/recipes", web::post().to(handlers::recipes::create_recipe))
            .route(
                "/recipes/{id}",
                web::get().to(handlers::recipes::get_recipe),
            )
            .route(
                "/recipes/{id}",
                web::patch().to(handlers::recipes::update_recipe),
            )
            .route(
                "/recipes/{id}",
                web::delete().to(handlers::recipes::delete_recipe),
            )
            .route(
                "/recipes/{id}/reviews",
                web::get().to(handlers::reviews::list_reviews),
            )
            .route(
                "/recipes/{id}/reviews",
                web::post().to(handlers::reviews::add_review),
            )
            .route(
                "/recipes/{id}/reviews/{review_id}",
                web::delete().to(handlers::reviews::delete_review),
            )
            .route(
                "/role-requests/count/unread",
                web::get().to(handlers::role_requests::count_unread),
            )
            .route(
                "/role-requests/mine",
                web::get().to(handlers::role_requests::list_my_requests),
            )
            .route(
                "/role-requests",
                web::post().to(handlers::role_requests::submit_request),
            )
            .route(
                "/role-requests",
                web::get().to(handlers::role_requests::list_requests),
            )
            .route(
                "/role-requests/{id}/read",
                web::patch().to(handlers::role_requests::mark_read),
            )
            .route(
                "/role-requests/{id}",
                web::patch().to(handlers::role_requests::process_request),
            )
            .route(
                "/users/saved-recipes",
                web::get().to(handlers::users::saved_recipes),
            )
            .route(
                "/users/save-recipe",
                web::patch().to(handlers::users::toggle_saved),
            )
            .route("/users", web::get().to(handlers::users::list_users))
            .route("/users", web::post().to(handlers::users::create_user))
            .route("/users", web::patch().to(handlers::users::update_user))
            .route("/users", web::delete().to(handlers::users::delete_user)),
    );
}
