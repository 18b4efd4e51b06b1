//! Login: verifies a username/password pair and issues the bearer token
//! consumed by every protected route. Unknown users, bad passwords, and
//! deactivated accounts all collapse into the same 401.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use ladle_core::error::AppError;
use ladle_core::traits::{AuthProvider, UserRepo};

use super::{non_empty, AppState};
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/login (public)
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let (Some(username), Some(password)) = (non_empty(body.username), non_empty(body.password))
    else {
        return Err(AppError::ValidationError("All fields are required".to_string()).into());
    };

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    if !user.active || !state.auth.verify_password(&password, &user.password_hash) {
        return Err(AppError::Unauthorized("Unauthorized".to_string()).into());
    }

    let token = state.auth.issue_token(&user)?;
    Ok(HttpResponse::Ok().json(json!({ "accessToken": token })))
}
