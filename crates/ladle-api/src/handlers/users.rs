//! Account management and the saved-recipes list. Passwords only ever
//! travel one way: hashed on the way in, skipped on the way out.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use ladle_core::error::AppError;
use ladle_core::models::{Role, User};
use ladle_core::traits::{AuthProvider, RecipeRepo, UserRepo};

use super::{author_names, non_empty, recipe_view, AppState};
use crate::error::ApiResult;
use crate::middleware::Identity;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    username: Option<String>,
    password: Option<String>,
    roles: Option<Vec<Role>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    id: Option<Uuid>,
    username: Option<String>,
    roles: Option<Vec<Role>>,
    active: Option<bool>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSavedRequest {
    recipe_id: Option<Uuid>,
}

async fn load_user(state: &AppState, id: Uuid) -> Result<User, AppError> {
    state
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string(), id.to_string()))
}

/// GET /users: password hashes never serialize.
pub async fn list_users(
    state: web::Data<AppState>,
    _identity: Identity,
) -> ApiResult<HttpResponse> {
    let users = state.users.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// POST /users: registration. Roles are optional; an empty list falls
/// back to the Reader default.
pub async fn create_user(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let (Some(username), Some(password)) = (non_empty(body.username), non_empty(body.password))
    else {
        return Err(AppError::ValidationError("All fields are required".to_string()).into());
    };

    if state.users.find_by_username(&username).await?.is_some() {
        return Err(AppError::Conflict("Duplicate username".to_string()).into());
    }

    let hash = state.auth.hash_password(&password)?;
    let user = User::new(username.clone(), hash, body.roles.unwrap_or_default());
    state.users.create_user(user).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": format!("New user {username} created"),
    })))
}

/// PATCH /users: whole-account update; password only re-hashed when one
/// is supplied.
pub async fn update_user(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let roles = body.roles.filter(|roles| !roles.is_empty());
    let (Some(id), Some(username), Some(roles), Some(active)) =
        (body.id, non_empty(body.username), roles, body.active)
    else {
        return Err(AppError::ValidationError(
            "All fields except password are required".to_string(),
        )
        .into());
    };

    let mut user = load_user(&state, id).await?;

    // Allow the account being updated to keep its own username.
    if let Some(existing) = state.users.find_by_username(&username).await? {
        if existing.id != id {
            return Err(AppError::Conflict("Duplicate username".to_string()).into());
        }
    }

    user.username = username;
    user.roles = roles;
    user.active = active;
    if let Some(password) = non_empty(body.password) {
        user.password_hash = state.auth.hash_password(&password)?;
    }
    user.updated_at = Utc::now();

    state.users.save_user(&user).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("{} updated", user.username),
    })))
}

/// DELETE /users: blocked while the account still owns recipes, so no
/// recipe is left pointing at a deleted owner.
pub async fn delete_user(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<DeleteUserRequest>,
) -> ApiResult<HttpResponse> {
    let Some(id) = body.into_inner().id else {
        return Err(AppError::ValidationError("User ID Required".to_string()).into());
    };

    if state.recipes.any_owned_by(id).await? {
        return Err(AppError::ValidationError("User has assigned recipes".to_string()).into());
    }

    let user = load_user(&state, id).await?;
    state.users.delete_user(id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Username {} with ID {} deleted", user.username, user.id),
    })))
}

/// GET /users/saved-recipes: the caller's bookmarks, expanded like the
/// public listing. Bookmarks whose recipe has since been deleted are
/// silently dropped.
pub async fn saved_recipes(
    state: web::Data<AppState>,
    Identity(principal): Identity,
) -> ApiResult<HttpResponse> {
    let user = load_user(&state, principal.id).await?;

    let mut saved = Vec::new();
    for id in &user.saved_recipes {
        if let Some(recipe) = state.recipes.get_recipe(*id).await? {
            saved.push(recipe);
        }
    }

    let names = author_names(&state, saved.iter().map(|r| r.user)).await?;
    let views: Vec<_> = saved
        .into_iter()
        .map(|recipe| {
            let name = names.get(&recipe.user).cloned().unwrap_or_default();
            recipe_view(recipe, name)
        })
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

/// PATCH /users/save-recipe: toggles membership and returns the updated
/// id list.
pub async fn toggle_saved(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    body: web::Json<ToggleSavedRequest>,
) -> ApiResult<HttpResponse> {
    let Some(recipe_id) = body.into_inner().recipe_id else {
        return Err(AppError::ValidationError("Recipe ID required".to_string()).into());
    };

    let mut user = load_user(&state, principal.id).await?;

    if let Some(position) = user.saved_recipes.iter().position(|id| *id == recipe_id) {
        user.saved_recipes.remove(position);
    } else {
        user.saved_recipes.push(recipe_id);
    }
    user.updated_at = Utc::now();

    state.users.save_user(&user).await?;
    Ok(HttpResponse::Ok().json(user.saved_recipes))
}
