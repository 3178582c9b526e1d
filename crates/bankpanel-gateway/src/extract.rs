//! Bearer-token extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use bankpanel_core::types::Role;
use bankpanel_platform::Caller;
use std::sync::Arc;

use crate::error::ApiError;
use crate::server::AppState;

/// The signed-in caller behind `Authorization: Bearer <token>`.
pub struct Authenticated(pub Caller);

impl Authenticated {
    /// Reject callers without `role` with 403.
    pub fn require(self, role: Role) -> Result<Caller, ApiError> {
        self.0.require(role)?;
        Ok(self.0)
    }
}

fn bearer(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let token = bearer(parts).ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;
        let caller = state.sessions.authenticate(token).await?;
        Ok(Authenticated(caller))
    }
}
