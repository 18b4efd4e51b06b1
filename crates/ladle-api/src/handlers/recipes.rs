//! Recipe CRUD. Creation and update normalize the free-text fields into
//! the stored newline-joined form and enforce the case-insensitive unique
//! title; the derived rating fields never pass through here.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use ladle_core::error::AppError;
use ladle_core::models::{Recipe, Role, DEFAULT_IMAGE};
use ladle_core::policy::require_any;
use ladle_core::recipes::Lines;
use ladle_core::traits::RecipeRepo;

use super::{author_names, non_empty, recipe_view, AppState};
use crate::error::ApiResult;
use crate::middleware::Identity;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    title: Option<String>,
    image: Option<String>,
    ingredients: Option<Lines>,
    instructions: Option<Lines>,
    cooking_time: Option<u32>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    user: Option<Uuid>,
    title: Option<String>,
    image: Option<String>,
    ingredients: Option<Lines>,
    instructions: Option<Lines>,
    cooking_time: Option<u32>,
    category: Option<String>,
}

async fn render_all(state: &AppState, recipes: Vec<Recipe>) -> ApiResult<HttpResponse> {
    let names = author_names(state, recipes.iter().map(|r| r.user)).await?;
    let views: Vec<_> = recipes
        .into_iter()
        .map(|recipe| {
            let name = names.get(&recipe.user).cloned().unwrap_or_default();
            recipe_view(recipe, name)
        })
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

/// GET /recipes (public)
pub async fn list_recipes(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let recipes = state.recipes.list_recipes().await?;
    render_all(&state, recipes).await
}

/// GET /recipes/manage: Writers see their own, Admins see everything.
pub async fn manage_recipes(
    state: web::Data<AppState>,
    Identity(principal): Identity,
) -> ApiResult<HttpResponse> {
    require_any(&principal, &[Role::Writer, Role::Admin])?;
    let recipes = if principal.is_admin() {
        state.recipes.list_recipes().await?
    } else {
        state.recipes.list_recipes_by_owner(principal.id).await?
    };
    render_all(&state, recipes).await
}

/// GET /recipes/{id}
pub async fn get_recipe(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let recipe = state
        .recipes
        .get_recipe(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string(), id.to_string()))?;
    let names = author_names(&state, std::iter::once(recipe.user)).await?;
    let name = names.get(&recipe.user).cloned().unwrap_or_default();
    Ok(HttpResponse::Ok().json(recipe_view(recipe, name)))
}

/// POST /recipes: Writer/Admin.
pub async fn create_recipe(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    body: web::Json<CreateRecipeRequest>,
) -> ApiResult<HttpResponse> {
    require_any(&principal, &[Role::Writer, Role::Admin])?;
    let body = body.into_inner();

    let title = non_empty(body.title);
    let ingredients = non_empty(body.ingredients.map(Lines::into_joined));
    let instructions = non_empty(body.instructions.map(Lines::into_joined));

    // Report every missing field at once, in the payload's spelling.
    let mut missing = Vec::new();
    if title.is_none() {
        missing.push("title");
    }
    if ingredients.is_none() {
        missing.push("ingredients");
    }
    if instructions.is_none() {
        missing.push("instructions");
    }
    if body.cooking_time.is_none() {
        missing.push("cookingTime");
    }
    let (Some(title), Some(ingredients), Some(instructions), Some(cooking_time)) =
        (title, ingredients, instructions, body.cooking_time)
    else {
        return Err(AppError::ValidationError(format!(
            "Missing required fields: {}",
            missing.join(", ")
        ))
        .into());
    };

    if state.recipes.find_by_title(&title).await?.is_some() {
        return Err(AppError::Conflict("Duplicate recipe title".to_string()).into());
    }

    let recipe = Recipe::new(
        principal.id,
        title,
        non_empty(body.image),
        ingredients,
        instructions,
        cooking_time,
        non_empty(body.category),
    );
    let recipe = state.recipes.create_recipe(recipe).await?;

    Ok(HttpResponse::Created().json(recipe_view(recipe, principal.username)))
}

/// PATCH /recipes/{id}: Writer/Admin.
pub async fn update_recipe(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateRecipeRequest>,
) -> ApiResult<HttpResponse> {
    require_any(&principal, &[Role::Writer, Role::Admin])?;
    let id = path.into_inner();
    let body = body.into_inner();

    let title = non_empty(body.title);
    let ingredients = non_empty(body.ingredients.map(Lines::into_joined));
    let instructions = non_empty(body.instructions.map(Lines::into_joined));
    let (Some(user), Some(title), Some(ingredients), Some(instructions)) =
        (body.user, title, ingredients, instructions)
    else {
        return Err(AppError::ValidationError("All fields are required".to_string()).into());
    };

    let mut recipe = state
        .recipes
        .get_recipe(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string(), id.to_string()))?;

    // Allow the record being updated to keep its own title.
    if let Some(existing) = state.recipes.find_by_title(&title).await? {
        if existing.id != id {
            return Err(AppError::Conflict("Duplicate recipe title".to_string()).into());
        }
    }

    recipe.user = user;
    recipe.title = title;
    recipe.image = non_empty(body.image).unwrap_or_else(|| DEFAULT_IMAGE.to_string());
    recipe.ingredients = ingredients;
    recipe.instructions = instructions;
    if let Some(cooking_time) = body.cooking_time {
        recipe.cooking_time = cooking_time;
    }
    if let Some(category) = non_empty(body.category) {
        recipe.category = category;
    }
    recipe.updated_at = Utc::now();

    state.recipes.save_recipe(&recipe).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("'{}' updated", recipe.title),
        "id": recipe.id,
    })))
}

/// DELETE /recipes/{id}: Admin only.
pub async fn delete_recipe(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_any(&principal, &[Role::Admin])?;
    let id = path.into_inner();

    let recipe = state
        .recipes
        .get_recipe(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string(), id.to_string()))?;
    state.recipes.delete_recipe(id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Recipe '{}' deleted", recipe.title),
        "id": recipe.id,
    })))
}
