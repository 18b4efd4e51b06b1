//! # ladle-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational
//! model and the `ladle-core` domain models. Embedded collections (roles,
//! saved recipes, reviews) are kept as JSON text columns so a record reads
//! and writes as one document.

use async_trait::async_trait;
use ladle_core::error::{AppError, Result};
use ladle_core::models::{Recipe, RequestStatus, Role, RoleRequest, User};
use ladle_core::traits::{RecipeRepo, RoleRequestRepo, UserRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

/// Tables created on connect. Usernames and titles collate NOCASE so the
/// unique indexes enforce the case-insensitive uniqueness rules.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id            TEXT PRIMARY KEY,
        username      TEXT NOT NULL COLLATE NOCASE UNIQUE,
        password_hash TEXT NOT NULL,
        roles         TEXT NOT NULL,
        active        INTEGER NOT NULL,
        saved_recipes TEXT NOT NULL,
        created_at    TEXT NOT NULL,
        updated_at    TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS recipes (
        id            TEXT PRIMARY KEY,
        user_id       TEXT NOT NULL,
        image         TEXT NOT NULL,
        title         TEXT NOT NULL COLLATE NOCASE UNIQUE,
        ingredients   TEXT NOT NULL,
        instructions  TEXT NOT NULL,
        cooking_time  INTEGER NOT NULL,
        category      TEXT NOT NULL,
        ticket        INTEGER NOT NULL,
        reviews       TEXT NOT NULL,
        rating        REAL NOT NULL,
        ratings_count INTEGER NOT NULL,
        created_at    TEXT NOT NULL,
        updated_at    TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS role_requests (
        id             TEXT PRIMARY KEY,
        user_id        TEXT NOT NULL,
        current_role   TEXT NOT NULL,
        requested_role TEXT NOT NULL,
        reason         TEXT NOT NULL,
        status         TEXT NOT NULL,
        admin_note     TEXT NOT NULL,
        is_read        INTEGER NOT NULL,
        created_at     TEXT NOT NULL,
        updated_at     TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS counters (
        name  TEXT PRIMARY KEY,
        value INTEGER NOT NULL
    )",
    // Ticket numbers start at 500; the counter holds the last value issued.
    "INSERT OR IGNORE INTO counters (name, value) VALUES ('ticket', 499)",
];

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

fn db_err(e: sqlx::Error) -> AppError {
    AppError::Internal(format!("database error: {e}"))
}

fn json_err(e: serde_json::Error) -> AppError {
    AppError::Internal(format!("column encode error: {e}"))
}

// Helpers for TEXT column conversion
fn parse_uuid(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap_or_default()
}

fn parse_role(raw: &str) -> Role {
    match raw {
        "Admin" => Role::Admin,
        "Writer" => Role::Writer,
        _ => Role::Reader,
    }
}

fn parse_status(raw: &str) -> RequestStatus {
    match raw {
        "approved" => RequestStatus::Approved,
        "rejected" => RequestStatus::Rejected,
        _ => RequestStatus::Pending,
    }
}

fn map_user(row: &SqliteRow) -> User {
    User {
        id: parse_uuid(&row.get::<String, _>("id")),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        roles: serde_json::from_str(&row.get::<String, _>("roles")).unwrap_or_default(),
        active: row.get("active"),
        saved_recipes: serde_json::from_str(&row.get::<String, _>("saved_recipes"))
            .unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_recipe(row: &SqliteRow) -> Recipe {
    Recipe {
        id: parse_uuid(&row.get::<String, _>("id")),
        user: parse_uuid(&row.get::<String, _>("user_id")),
        image: row.get("image"),
        title: row.get("title"),
        ingredients: row.get("ingredients"),
        instructions: row.get("instructions"),
        cooking_time: row.get::<i64, _>("cooking_time") as u32,
        category: row.get("category"),
        ticket: row.get("ticket"),
        reviews: serde_json::from_str(&row.get::<String, _>("reviews")).unwrap_or_default(),
        rating: row.get("rating"),
        ratings_count: row.get::<i64, _>("ratings_count") as u32,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn map_request(row: &SqliteRow) -> RoleRequest {
    RoleRequest {
        id: parse_uuid(&row.get::<String, _>("id")),
        user: parse_uuid(&row.get::<String, _>("user_id")),
        current_role: row.get("current_role"),
        requested_role: parse_role(&row.get::<String, _>("requested_role")),
        reason: row.get("reason"),
        status: parse_status(&row.get::<String, _>("status")),
        admin_note: row.get("admin_note"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl SqliteStore {
    /// Connects (creating the database file if needed) and prepares the
    /// schema.
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_err)?
            .create_if_missing(true);
        // In-memory databases live per connection; a wider pool would hand
        // each caller its own empty schema.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(db_err)?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(db_err)?;
        }
        log::debug!("sqlite store ready at {url}");

        Ok(Self { pool })
    }
}

#[async_trait]
impl UserRepo for SqliteStore {
    async fn create_user(&self, user: User) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, roles, active, saved_recipes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(serde_json::to_string(&user.roles).map_err(json_err)?)
        .bind(user.active)
        .bind(serde_json::to_string(&user.saved_recipes).map_err(json_err)?)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(map_user))
    }

    /// Case-insensitive thanks to the NOCASE collation on the column.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(map_user))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(map_user).collect())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        sqlx::query(
            "UPDATE users SET username = ?, password_hash = ?, roles = ?, active = ?, saved_recipes = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(serde_json::to_string(&user.roles).map_err(json_err)?)
        .bind(user.active)
        .bind(serde_json::to_string(&user.saved_recipes).map_err(json_err)?)
        .bind(user.updated_at)
        .bind(user.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl RecipeRepo for SqliteStore {
    /// Ticket assignment and the insert run in one transaction so a failed
    /// insert never burns a number out of order with a later success.
    async fn create_recipe(&self, mut recipe: Recipe) -> Result<Recipe> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let ticket: i64 = sqlx::query_scalar(
            "UPDATE counters SET value = value + 1 WHERE name = 'ticket' RETURNING value",
        )
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;
        recipe.ticket = ticket;

        sqlx::query(
            "INSERT INTO recipes (id, user_id, image, title, ingredients, instructions, cooking_time, category, ticket, reviews, rating, ratings_count, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(recipe.id.to_string())
        .bind(recipe.user.to_string())
        .bind(&recipe.image)
        .bind(&recipe.title)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(i64::from(recipe.cooking_time))
        .bind(&recipe.category)
        .bind(recipe.ticket)
        .bind(serde_json::to_string(&recipe.reviews).map_err(json_err)?)
        .bind(recipe.rating)
        .bind(i64::from(recipe.ratings_count))
        .bind(recipe.created_at)
        .bind(recipe.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(recipe)
    }

    async fn get_recipe(&self, id: Uuid) -> Result<Option<Recipe>> {
        let row = sqlx::query("SELECT * FROM recipes WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(map_recipe))
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let rows = sqlx::query("SELECT * FROM recipes ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(map_recipe).collect())
    }

    async fn list_recipes_by_owner(&self, user: Uuid) -> Result<Vec<Recipe>> {
        let rows = sqlx::query("SELECT * FROM recipes WHERE user_id = ? ORDER BY created_at ASC")
            .bind(user.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(map_recipe).collect())
    }

    /// Case-insensitive thanks to the NOCASE collation on the column.
    async fn find_by_title(&self, title: &str) -> Result<Option<Recipe>> {
        let row = sqlx::query("SELECT * FROM recipes WHERE title = ?")
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(map_recipe))
    }

    async fn any_owned_by(&self, user: Uuid) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE user_id = ?")
            .bind(user.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn save_recipe(&self, recipe: &Recipe) -> Result<()> {
        sqlx::query(
            "UPDATE recipes SET user_id = ?, image = ?, title = ?, ingredients = ?, instructions = ?, cooking_time = ?, category = ?, reviews = ?, rating = ?, ratings_count = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(recipe.user.to_string())
        .bind(&recipe.image)
        .bind(&recipe.title)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(i64::from(recipe.cooking_time))
        .bind(&recipe.category)
        .bind(serde_json::to_string(&recipe.reviews).map_err(json_err)?)
        .bind(recipe.rating)
        .bind(i64::from(recipe.ratings_count))
        .bind(recipe.updated_at)
        .bind(recipe.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete_recipe(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl RoleRequestRepo for SqliteStore {
    async fn create_request(&self, request: RoleRequest) -> Result<()> {
        sqlx::query(
            "INSERT INTO role_requests (id, user_id, current_role, requested_role, reason, status, admin_note, is_read, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(request.id.to_string())
        .bind(request.user.to_string())
        .bind(&request.current_role)
        .bind(request.requested_role.as_str())
        .bind(&request.reason)
        .bind(request.status.as_str())
        .bind(&request.admin_note)
        .bind(request.is_read)
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_request(&self, id: Uuid) -> Result<Option<RoleRequest>> {
        let row = sqlx::query("SELECT * FROM role_requests WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(map_request))
    }

    async fn list_requests(&self) -> Result<Vec<RoleRequest>> {
        let rows = sqlx::query("SELECT * FROM role_requests ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(map_request).collect())
    }

    async fn list_requests_by_user(&self, user: Uuid) -> Result<Vec<RoleRequest>> {
        let rows =
            sqlx::query("SELECT * FROM role_requests WHERE user_id = ? ORDER BY created_at DESC")
                .bind(user.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(rows.iter().map(map_request).collect())
    }

    async fn find_pending_by_user(&self, user: Uuid) -> Result<Option<RoleRequest>> {
        let row =
            sqlx::query("SELECT * FROM role_requests WHERE user_id = ? AND status = 'pending'")
                .bind(user.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(row.as_ref().map(map_request))
    }

    async fn count_pending(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM role_requests WHERE status = 'pending'")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn save_request(&self, request: &RoleRequest) -> Result<()> {
        sqlx::query(
            "UPDATE role_requests SET status = ?, admin_note = ?, is_read = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(request.status.as_str())
        .bind(&request.admin_note)
        .bind(request.is_read)
        .bind(request.updated_at)
        .bind(request.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}
