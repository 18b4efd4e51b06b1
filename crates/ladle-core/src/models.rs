//! # Domain Models
//!
//! These structs represent the core entities of ladle.
//! We use UUID v7 for time-ordered, globally unique identification.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Image shown for recipes created without one.
pub const DEFAULT_IMAGE: &str = "/default-recipe.jpg";
/// Category applied when the author does not pick one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Access levels a user can hold. A closed set (rather than free-form
/// strings) so the access policy can match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Reader,
    Writer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reader => "Reader",
            Role::Writer => "Writer",
            Role::Admin => "Admin",
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Unique under case-insensitive comparison
    pub username: String,
    /// Argon2 digest; never serialized into responses
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub active: bool,
    /// Ordered list of recipe ids the user bookmarked
    pub saved_recipes: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New account with server-assigned id and timestamps.
    /// An empty role list falls back to the Reader default.
    pub fn new(username: impl Into<String>, password_hash: String, roles: Vec<Role>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            password_hash,
            roles: if roles.is_empty() { vec![Role::Reader] } else { roles },
            active: true,
            saved_recipes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A published recipe, owning its reviews as an embedded list.
///
/// `rating` and `ratings_count` are derived from `reviews` and are never
/// taken from external input; see the aggregate operations in `recipes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    /// Owning user reference (no cascading delete; blocks user deletion)
    pub user: Uuid,
    pub image: String,
    /// Unique under case-insensitive comparison
    pub title: String,
    /// Newline-joined lines; expanded back to a list at the API boundary
    pub ingredients: String,
    pub instructions: String,
    /// Minutes
    pub cooking_time: u32,
    pub category: String,
    /// Display number assigned at creation, monotonically increasing,
    /// never reused. The store hands these out starting at 500.
    pub ticket: i64,
    pub reviews: Vec<Review>,
    pub rating: f64,
    pub ratings_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Fresh recipe with no reviews. The ticket is a placeholder until the
    /// store assigns the real one on insert.
    pub fn new(
        user: Uuid,
        title: String,
        image: Option<String>,
        ingredients: String,
        instructions: String,
        cooking_time: u32,
        category: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user,
            image: image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            title,
            ingredients,
            instructions,
            cooking_time,
            category: category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            ticket: 0,
            reviews: Vec::new(),
            rating: 0.0,
            ratings_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A reader's rating of a recipe, embedded in the recipe document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    /// Author reference; at most one review per (recipe, user) pair
    pub user: Uuid,
    /// Integer in 1..=5
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle of a role upgrade request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// A Reader's request to be upgraded to Writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    pub id: Uuid,
    /// Requester reference
    pub user: Uuid,
    /// Snapshot of the requester's roles at submit time
    pub current_role: String,
    pub requested_role: Role,
    pub reason: String,
    pub status: RequestStatus,
    pub admin_note: String,
    /// Requester-visible flag; admins never toggle this
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
