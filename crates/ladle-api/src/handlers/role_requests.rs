//! The Reader -> Writer upgrade workflow: submit, admin triage, and the
//! requester-visible read flag.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use ladle_core::error::AppError;
use ladle_core::models::{RequestStatus, Role, RoleRequest};
use ladle_core::policy::require_any;
use ladle_core::requests::{self, Decision};
use ladle_core::traits::{RoleRequestRepo, UserRepo};

use super::{author_names, non_empty, AppState, AuthorView};
use crate::error::ApiResult;
use crate::middleware::Identity;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    status: Option<String>,
    admin_note: Option<String>,
}

/// A request in the admin listing, requester resolved to a username.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRequestView {
    pub id: Uuid,
    pub user: AuthorView,
    pub current_role: String,
    pub requested_role: Role,
    pub reason: String,
    pub status: RequestStatus,
    pub admin_note: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

async fn load_request(state: &AppState, id: Uuid) -> Result<RoleRequest, AppError> {
    state
        .requests
        .get_request(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Role request".to_string(), id.to_string()))
}

/// POST /role-requests: one open request per user.
pub async fn submit_request(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    body: web::Json<SubmitRequest>,
) -> ApiResult<HttpResponse> {
    let Some(reason) = non_empty(body.into_inner().reason) else {
        return Err(AppError::ValidationError(
            "Please provide a reason for your request".to_string(),
        )
        .into());
    };

    if state
        .requests
        .find_pending_by_user(principal.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "You already have a pending role upgrade request".to_string(),
        )
        .into());
    }

    let user = state
        .users
        .get_user(principal.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string(), principal.id.to_string()))?;

    let request = requests::submit(&user, &reason)?;
    state.requests.create_request(request.clone()).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Role upgrade request submitted successfully",
        "requestId": request.id,
    })))
}

/// GET /role-requests: Admin, newest first.
pub async fn list_requests(
    state: web::Data<AppState>,
    Identity(principal): Identity,
) -> ApiResult<HttpResponse> {
    require_any(&principal, &[Role::Admin])?;

    let all = state.requests.list_requests().await?;
    let names = author_names(&state, all.iter().map(|r| r.user)).await?;
    let views: Vec<_> = all
        .into_iter()
        .map(|request| RoleRequestView {
            id: request.id,
            user: AuthorView {
                id: request.user,
                username: names.get(&request.user).cloned().unwrap_or_default(),
            },
            current_role: request.current_role,
            requested_role: request.requested_role,
            reason: request.reason,
            status: request.status,
            admin_note: request.admin_note,
            is_read: request.is_read,
            created_at: request.created_at,
            updated_at: request.updated_at,
        })
        .collect();
    Ok(HttpResponse::Ok().json(views))
}

/// GET /role-requests/mine: the caller's own, newest first.
pub async fn list_my_requests(
    state: web::Data<AppState>,
    Identity(principal): Identity,
) -> ApiResult<HttpResponse> {
    let mine = state.requests.list_requests_by_user(principal.id).await?;
    Ok(HttpResponse::Ok().json(mine))
}

/// PATCH /role-requests/{id}: Admin decision. Reprocessing a settled
/// request changes nothing and reports its stored state.
pub async fn process_request(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    path: web::Path<Uuid>,
    body: web::Json<ProcessRequest>,
) -> ApiResult<HttpResponse> {
    require_any(&principal, &[Role::Admin])?;
    let body = body.into_inner();
    let decision = Decision::parse(body.status.as_deref().unwrap_or_default())?;

    let mut request = load_request(&state, path.into_inner()).await?;

    if request.resolve(decision, body.admin_note) {
        if decision == Decision::Approved {
            let mut user = state
                .users
                .get_user(request.user)
                .await?
                .ok_or_else(|| AppError::NotFound("User".to_string(), request.user.to_string()))?;
            if requests::grant_writer(&mut user) {
                state.users.save_user(&user).await?;
            }
        }
        state.requests.save_request(&request).await?;
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Role request {}", request.status.as_str()),
        "roleRequest": request,
    })))
}

/// PATCH /role-requests/{id}/read: only the requester may mark their own.
pub async fn mark_read(
    state: web::Data<AppState>,
    Identity(principal): Identity,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let mut request = load_request(&state, path.into_inner()).await?;

    if request.user != principal.id {
        return Err(AppError::Forbidden("Not authorized".to_string()).into());
    }

    request.is_read = true;
    request.updated_at = Utc::now();
    state.requests.save_request(&request).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Request marked as read" })))
}

/// GET /role-requests/count/unread: Admin notification badge. "Unread"
/// means pending; there is no per-admin read state.
pub async fn count_unread(
    state: web::Data<AppState>,
    Identity(principal): Identity,
) -> ApiResult<HttpResponse> {
    require_any(&principal, &[Role::Admin])?;
    let count = state.requests.count_pending().await?;
    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}
