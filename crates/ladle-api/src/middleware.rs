//! ladle/crates/ladle-api/src/middleware.rs Middleware
//!
//! Request logging, CORS, and the bearer-credential extractor shared by
//! every protected route.

use std::future::{ready, Ready};

use actix_cors::Cors;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{web, FromRequest, HttpRequest};

use ladle_core::error::AppError;
use ladle_core::policy::Principal;
use ladle_core::traits::AuthProvider;

use crate::error::ApiError;
use crate::handlers::AppState;

// Returns a standard set of middleware for the ladle API.
pub fn standard_middleware() -> Logger {
    // We use the 'default' logger which outputs:
    // remote-ip "request-line" status-code response-size "referrer" "user-agent"
    Logger::default()
}

// Configures CORS (Cross-Origin Resource Sharing)
// The API is consumed by a browser frontend on another origin, so the
// full REST verb set and the Authorization header must pass preflight.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(3600)
}

/// Extractor for routes that require a verified principal.
///
/// A missing or malformed Authorization header is 401 Unauthorized; a
/// present but unverifiable credential is 403 Forbidden. The distinction
/// matters to clients deciding between "log in" and "give up".
pub struct Identity(pub Principal);

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = Ready<Result<Identity, ApiError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result: Result<Identity, AppError> = (|| {
            let token = bearer_token(req)
                .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;
            let state = req
                .app_data::<web::Data<AppState>>()
                .ok_or_else(|| AppError::Internal("application state missing".to_string()))?;
            let principal = state.auth.verify_token(token)?;
            Ok(Identity(principal))
        })();
        ready(result.map_err(ApiError::from))
    }
}
