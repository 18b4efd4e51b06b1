//! # Access Policy
//!
//! Role checks shared by every route. The HTTP layer answers the
//! missing-credential case (401); everything here assumes a verified
//! principal and decides allow vs Forbidden (403).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Role;

/// Verified identity yielded by the auth provider for a bearer credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// Grants access when the principal holds any of the allowed roles.
pub fn require_any(principal: &Principal, allowed: &[Role]) -> Result<()> {
    if principal.roles.iter().any(|role| allowed.contains(role)) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Forbidden".to_string()))
    }
}
