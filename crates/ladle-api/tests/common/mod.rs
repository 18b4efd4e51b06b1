//! Shared harness: an app over a fresh in-memory store with real plugins.
#![allow(dead_code)]

use actix_web::web;
use ladle_api::handlers::AppState;
use ladle_auth_jwt::JwtAuthProvider;
use ladle_core::models::{Role, User};
use ladle_core::traits::{AuthProvider, UserRepo};
use ladle_db_sqlite::SqliteStore;

pub async fn test_state() -> web::Data<AppState> {
    let store = SqliteStore::new("sqlite::memory:").await.unwrap();
    let auth = JwtAuthProvider::new("test-secret", 3600);
    web::Data::new(AppState {
        users: Box::new(store.clone()),
        recipes: Box::new(store.clone()),
        requests: Box::new(store),
        auth: Box::new(auth),
    })
}

/// Registers a user directly against the store and returns a fresh bearer
/// token for them.
pub async fn seed_user(state: &AppState, username: &str, password: &str, roles: Vec<Role>) -> String {
    let hash = state.auth.hash_password(password).unwrap();
    let user = User::new(username, hash, roles);
    state.users.create_user(user.clone()).await.unwrap();
    state.auth.issue_token(&user).unwrap()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}
