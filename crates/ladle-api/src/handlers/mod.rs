//! # ladle-api Handlers
//!
//! These modules coordinate the flow between HTTP requests and core ports.
//! Shared view types live here: responses resolve author ids to usernames
//! and expand the newline-joined free-text fields back into line lists.

pub mod auth;
pub mod recipes;
pub mod reviews;
pub mod role_requests;
pub mod users;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use ladle_core::error::Result;
use ladle_core::models::Recipe;
use ladle_core::recipes::split_lines;
use ladle_core::traits::{AuthProvider, RecipeRepo, RoleRequestRepo, UserRepo};

/// State shared across all Actix-web workers.
pub struct AppState {
    pub users: Box<dyn UserRepo>,
    pub recipes: Box<dyn RecipeRepo>,
    pub requests: Box<dyn RoleRequestRepo>,
    pub auth: Box<dyn AuthProvider>,
}

/// Author identity attached to served recipes, reviews, and role requests.
#[derive(Debug, Serialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub username: String,
}

/// A recipe as served to clients. The embedded review list stays internal;
/// it has its own endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    pub id: Uuid,
    pub user: AuthorView,
    pub image: String,
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub cooking_time: u32,
    pub category: String,
    pub ticket: i64,
    pub rating: f64,
    pub ratings_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn recipe_view(recipe: Recipe, username: String) -> RecipeView {
    RecipeView {
        id: recipe.id,
        user: AuthorView {
            id: recipe.user,
            username,
        },
        image: recipe.image,
        title: recipe.title,
        ingredients: split_lines(&recipe.ingredients),
        instructions: split_lines(&recipe.instructions),
        cooking_time: recipe.cooking_time,
        category: recipe.category,
        ticket: recipe.ticket,
        rating: recipe.rating,
        ratings_count: recipe.ratings_count,
        created_at: recipe.created_at,
        updated_at: recipe.updated_at,
    }
}

/// Resolves each distinct author id to a username. Recipe owners cannot be
/// deleted while their recipes exist, but review authors can vanish; those
/// resolve to "unknown".
pub(crate) async fn author_names(
    state: &AppState,
    ids: impl Iterator<Item = Uuid>,
) -> Result<HashMap<Uuid, String>> {
    let mut names = HashMap::new();
    for id in ids {
        if names.contains_key(&id) {
            continue;
        }
        let name = state
            .users
            .get_user(id)
            .await?
            .map(|user| user.username)
            .unwrap_or_else(|| "unknown".to_string());
        names.insert(id, name);
    }
    Ok(names)
}

/// Presence check shared by the validation paths: a provided-but-blank
/// string counts as missing.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
