//! # Role-Request Workflow
//!
//! pending -> approved | rejected, both terminal. Approval grants the
//! Writer role to the requester at most once, no matter how often the
//! request is reprocessed.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{RequestStatus, Role, RoleRequest, User};

/// Admin decision over a pending request. Anything else on the wire is a
/// validation failure, not a server error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn parse(raw: &str) -> Result<Decision> {
        match raw {
            "approved" => Ok(Decision::Approved),
            "rejected" => Ok(Decision::Rejected),
            _ => Err(AppError::ValidationError(
                "Please provide a valid status (approved or rejected)".to_string(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Rejected => "rejected",
        }
    }
}

/// Builds a new pending request for `user`, snapshotting their roles.
/// Users who already write (or administer) have nothing to request.
pub fn submit(user: &User, reason: &str) -> Result<RoleRequest> {
    if reason.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Please provide a reason for your request".to_string(),
        ));
    }
    if user.roles.contains(&Role::Writer) || user.roles.contains(&Role::Admin) {
        return Err(AppError::Conflict(
            "You already have Writer or Admin privileges".to_string(),
        ));
    }
    let now = Utc::now();
    Ok(RoleRequest {
        id: Uuid::now_v7(),
        user: user.id,
        current_role: user
            .roles
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        requested_role: Role::Writer,
        reason: reason.to_string(),
        status: RequestStatus::Pending,
        admin_note: String::new(),
        is_read: false,
        created_at: now,
        updated_at: now,
    })
}

impl RoleRequest {
    /// Applies the admin decision. Terminal requests are left untouched;
    /// returns whether the transition happened.
    pub fn resolve(&mut self, decision: Decision, note: Option<String>) -> bool {
        if self.status != RequestStatus::Pending {
            return false;
        }
        self.status = match decision {
            Decision::Approved => RequestStatus::Approved,
            Decision::Rejected => RequestStatus::Rejected,
        };
        self.admin_note = note.unwrap_or_default();
        self.updated_at = Utc::now();
        true
    }
}

/// Idempotently grants Writer. Returns whether the role set changed.
pub fn grant_writer(user: &mut User) -> bool {
    if user.roles.contains(&Role::Writer) {
        false
    } else {
        user.roles.push(Role::Writer);
        user.updated_at = Utc::now();
        true
    }
}
