//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.
//! The store ports follow whole-document semantics: read the current
//! record, mutate it in memory, write it back as one logical update.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Recipe, RoleRequest, User};
use crate::policy::Principal;

/// Persistence contract for user accounts.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(&self, user: User) -> Result<()>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    /// Case-insensitive lookup, backing the unique-username rule.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;
    /// Rewrites every mutable column of the stored record.
    async fn save_user(&self, user: &User) -> Result<()>;
    async fn delete_user(&self, id: Uuid) -> Result<()>;
}

/// Persistence contract for recipes and their embedded reviews.
#[async_trait]
pub trait RecipeRepo: Send + Sync {
    /// Inserts the recipe, assigning the next ticket number atomically.
    /// Returns the stored record with the ticket filled in.
    async fn create_recipe(&self, recipe: Recipe) -> Result<Recipe>;
    async fn get_recipe(&self, id: Uuid) -> Result<Option<Recipe>>;
    async fn list_recipes(&self) -> Result<Vec<Recipe>>;
    async fn list_recipes_by_owner(&self, user: Uuid) -> Result<Vec<Recipe>>;
    /// Case-insensitive lookup, backing the unique-title rule.
    async fn find_by_title(&self, title: &str) -> Result<Option<Recipe>>;
    /// Whether any recipe still references `user` as its owner.
    async fn any_owned_by(&self, user: Uuid) -> Result<bool>;
    async fn save_recipe(&self, recipe: &Recipe) -> Result<()>;
    async fn delete_recipe(&self, id: Uuid) -> Result<()>;
}

/// Persistence contract for role upgrade requests.
#[async_trait]
pub trait RoleRequestRepo: Send + Sync {
    async fn create_request(&self, request: RoleRequest) -> Result<()>;
    async fn get_request(&self, id: Uuid) -> Result<Option<RoleRequest>>;
    /// All requests, newest first.
    async fn list_requests(&self) -> Result<Vec<RoleRequest>>;
    /// One user's requests, newest first.
    async fn list_requests_by_user(&self, user: Uuid) -> Result<Vec<RoleRequest>>;
    /// The open request enforcing the one-pending-per-user rule, if any.
    async fn find_pending_by_user(&self, user: Uuid) -> Result<Option<RoleRequest>>;
    async fn count_pending(&self) -> Result<i64>;
    async fn save_request(&self, request: &RoleRequest) -> Result<()>;
}

/// Identity contract: password hashing and bearer-credential handling.
/// The hashing and token mechanics live entirely behind this seam.
pub trait AuthProvider: Send + Sync {
    /// Digests a plaintext password for storage.
    fn hash_password(&self, plaintext: &str) -> Result<String>;

    /// Verifies a plaintext password against a stored digest.
    fn verify_password(&self, plaintext: &str, digest: &str) -> bool;

    /// Issues a bearer credential carrying the user's identity and roles.
    fn issue_token(&self, user: &User) -> Result<String>;

    /// Verifies a bearer credential and yields the principal it names.
    fn verify_token(&self, token: &str) -> Result<Principal>;
}
