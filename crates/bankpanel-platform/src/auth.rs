//! JWT sessions for the panel API.

use std::sync::Arc;

use bankpanel_core::error::{BankPanelError, Result};
use bankpanel_core::traits::{DataStore, IdentityAdmin};
use bankpanel_core::types::{AccountStatus, Profile, Role};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::dashboard::DashboardView;

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // identity ID
    pub profile_id: String,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

/// Generate a JWT token for a signed-in profile.
pub fn create_token(profile: &Profile, email: &str, secret: &str, ttl_hours: i64) -> Result<String> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(ttl_hours))
        .ok_or_else(|| BankPanelError::config("Token lifetime out of range"))?
        .timestamp() as usize;

    let claims = Claims {
        sub: profile.user_id.clone(),
        profile_id: profile.id.clone(),
        email: email.into(),
        role: profile.role,
        exp: expiration,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| BankPanelError::config(format!("Token creation failed: {e}")))
}

/// Validate and decode a JWT token.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| BankPanelError::unauthorized(format!("Invalid session: {e}")))
}

/// Result of a successful sign-in.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub profile: Profile,
    pub view: DashboardView,
}

/// An authenticated request's principal.
#[derive(Debug, Clone)]
pub struct Caller {
    pub claims: Claims,
    pub profile: Profile,
}

impl Caller {
    pub fn view(&self) -> DashboardView {
        DashboardView::for_role(self.profile.role)
    }

    pub fn require(&self, role: Role) -> Result<()> {
        if self.profile.role != role {
            return Err(BankPanelError::forbidden(format!("{role} access required")));
        }
        Ok(())
    }
}

pub struct SessionService {
    identity: Arc<dyn IdentityAdmin>,
    store: Arc<dyn DataStore>,
    secret: String,
    ttl_hours: i64,
}

impl SessionService {
    pub fn new(
        identity: Arc<dyn IdentityAdmin>,
        store: Arc<dyn DataStore>,
        secret: impl Into<String>,
        ttl_hours: i64,
    ) -> Self {
        Self { identity, store, secret: secret.into(), ttl_hours }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(BankPanelError::validation("Email and password are required"));
        }
        let identity = self.identity.sign_in(email, password).await?;
        let profile = self.active_profile(&identity.id).await?;
        let token = create_token(&profile, &identity.email, &self.secret, self.ttl_hours)?;

        tracing::info!("🔑 {} signed in as {}", identity.email, profile.role);
        Ok(Session { view: DashboardView::for_role(profile.role), token, profile })
    }

    /// Resolve a bearer token to its caller, re-reading the profile so
    /// removed or deactivated accounts lose access immediately.
    pub async fn authenticate(&self, token: &str) -> Result<Caller> {
        let claims = validate_token(token, &self.secret)?;
        let profile = self.active_profile(&claims.sub).await?;
        Ok(Caller { claims, profile })
    }

    async fn active_profile(&self, user_id: &str) -> Result<Profile> {
        let profile = self
            .store
            .profile_by_user_id(user_id)
            .await?
            .ok_or_else(|| BankPanelError::unauthorized("No profile linked to this account"))?;
        if profile.status == AccountStatus::Inactive {
            return Err(BankPanelError::forbidden("Account is inactive"));
        }
        Ok(profile)
    }
}
