//! Access Guard
//!
//! Resolves an opaque bearer credential into an [`Identity`] and exposes
//! the permission checks every gated operation runs through. Stateless per
//! call; no session storage beyond token verification.

use super::jwt::{Claims, JwtError, JwtService};
use crate::utils::{AppError, AppResult};
use std::sync::Arc;

/// The acting identity behind a request
#[derive(Debug, Clone)]
pub struct Identity {
    /// "user:xxx"
    pub user_id: String,
    pub name: String,
    pub is_admin: bool,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            is_admin: claims.is_admin,
        }
    }
}

/// Require an admin actor
pub fn require_admin(actor: &Identity) -> AppResult<()> {
    if actor.is_admin {
        Ok(())
    } else {
        Err(AppError::forbidden("Admin privilege required"))
    }
}

/// Require the actor to be the target user, or an admin
pub fn require_self_or_admin(actor: &Identity, target_user_id: &str) -> AppResult<()> {
    if actor.is_admin || actor.user_id == target_user_id {
        Ok(())
    } else {
        Err(AppError::forbidden("Not your resource"))
    }
}

/// Resolves bearer credentials into identities
#[derive(Debug, Clone)]
pub struct AccessGuard {
    jwt: Arc<JwtService>,
}

impl AccessGuard {
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }

    /// Resolve an `Authorization` header value or a raw token.
    /// Any failure is an authentication error, never a permission one.
    pub fn resolve(&self, credential: &str) -> AppResult<Identity> {
        let token = JwtService::extract_from_header(credential).unwrap_or(credential);
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }
        let claims = self.jwt.validate_token(token).map_err(|e| match e {
            JwtError::ExpiredToken => AppError::TokenExpired,
            JwtError::InvalidSignature | JwtError::InvalidToken(_) => AppError::InvalidToken,
            _ => AppError::Unauthorized,
        })?;
        Ok(Identity::from(claims))
    }
}
