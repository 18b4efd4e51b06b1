//! Review endpoints over the embedded list on each recipe. All aggregate
//! arithmetic happens inside the core aggregate ops; these handlers only
//! load, mutate, and write back the owning recipe.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use ladle_core::error::AppError;
use ladle_core::models::Recipe;
use ladle_core::traits::RecipeRepo;

use super::{author_names, non_empty, AppState, AuthorView};
use crate::error::ApiResult;
use crate::middleware::Identity;

#[derive(Debug, Deserialize)]
pub struct AddReviewRequest {
    rating: Option<i64>,
    comment: Option<String>,
}

/// A review as served: author resolved to a username.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: Uuid,
    pub user: AuthorView,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

async fn load_recipe(state: &AppState, id: Uuid) -> Result<Recipe, AppError> {
    state
        .recipes
        .get_recipe(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string(), id.to_string()))
}

/// GET /recipes/{id}/reviews (public): newest first.
pub async fn list_reviews(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let recipe = load_recipe(&state, path.into_inner()).await?;

    let mut reviews = recipe.reviews;
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let names = author_names(&state, reviews.iter().map(|r| r.user)).await?;
    let views: Vec<_> = reviews
        .into_iter()
        .map(|review| ReviewView {
            id: review.id,
            user: AuthorView {
                id: review.user,
                username: names.get(&review.user).cloned().unwrap_or_default(),
            },
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        })
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

/// POST /recipes/{id}/reviews: any authenticated user, once per recipe.
pub async fn add_review(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    path: web::Path<Uuid>,
    body: web::Json<AddReviewRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let (Some(rating), Some(comment)) = (body.rating, non_empty(body.comment)) else {
        return Err(
            AppError::ValidationError("Rating and comment are required".to_string()).into(),
        );
    };

    let mut recipe = load_recipe(&state, path.into_inner()).await?;
    let review = recipe.add_review(principal.id, rating, comment)?;
    state.recipes.save_recipe(&recipe).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Review added",
        "review": review,
        "newRating": recipe.rating,
        "ratingsCount": recipe.ratings_count,
    })))
}

/// DELETE /recipes/{id}/reviews/{review_id}: author or Admin.
pub async fn delete_review(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> ApiResult<HttpResponse> {
    let (recipe_id, review_id) = path.into_inner();

    let mut recipe = load_recipe(&state, recipe_id).await?;
    recipe.remove_review(review_id, &principal)?;
    state.recipes.save_recipe(&recipe).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Review deleted",
        "newRating": recipe.rating,
        "ratingsCount": recipe.ratings_count,
    })))
}
