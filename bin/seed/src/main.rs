//! # seed
//!
//! Bootstraps the first Admin account. Every /users endpoint requires an
//! authenticated caller, so a fresh deployment needs one account created
//! out of band before anyone can log in.

use anyhow::Context;
use ladle_auth_jwt::JwtAuthProvider;
use ladle_core::models::{Role, User};
use ladle_core::traits::{AuthProvider, UserRepo};
use ladle_db_sqlite::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:ladle.db".to_string());
    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set")?;

    let store = SqliteStore::new(&database_url)
        .await
        .context("failed to init SQLite")?;
    // Only the hasher is used here; the token secret never comes into play.
    let auth = JwtAuthProvider::new("seed", 0);

    if store.find_by_username(&username).await?.is_some() {
        println!("user '{username}' already exists, nothing to do");
        return Ok(());
    }

    let hash = auth.hash_password(&password)?;
    let user = User::new(username.clone(), hash, vec![Role::Reader, Role::Admin]);
    store.create_user(user).await?;

    println!("created admin user '{username}'");
    Ok(())
}
