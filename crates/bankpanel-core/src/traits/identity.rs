//! Identity administration: credentialed users behind the panel.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Identity, NewIdentity};

/// Privileged access to the identity service.
#[async_trait]
pub trait IdentityAdmin: Send + Sync {
    /// Backend name, used in logs.
    fn name(&self) -> &str;

    /// Create a credentialed identity. Upstream refusals surface as
    /// `BankPanelError::Identity` carrying the upstream message.
    async fn create_user(&self, user: &NewIdentity) -> Result<Identity>;

    /// Delete an identity by id.
    async fn delete_user(&self, user_id: &str) -> Result<()>;

    /// Check an email/password pair and return the matching identity.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity>;
}
