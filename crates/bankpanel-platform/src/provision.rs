//! Staff provisioning — create an identity and its linked profile as one
//! logical unit, deleting the identity again if the profile cannot be
//! confirmed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bankpanel_core::config::{ProfileMode, ProvisioningConfig};
use bankpanel_core::error::{BankPanelError, Result};
use bankpanel_core::traits::{DataStore, IdentityAdmin};
use bankpanel_core::types::{AccountStatus, Identity, NewIdentity, NewProfile, Profile, Role, UserMetadata};
use serde::{Deserialize, Serialize};

pub const PROFILE_FAILED: &str = "Profile creation failed";

/// Staff creation request. Accepts `fullName`, `full_name` or `name`.
#[derive(Clone, Default, Deserialize)]
pub struct NewStaff {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, alias = "fullName", alias = "name")]
    pub full_name: Option<String>,
}

impl NewStaff {
    pub fn new(email: impl Into<String>, password: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
            full_name: Some(full_name.into()),
        }
    }

    /// Returns trimmed email and name plus the untouched password.
    fn require(&self) -> Result<(String, String, String)> {
        let email = self.email.as_deref().map(str::trim).unwrap_or_default();
        let password = self.password.as_deref().unwrap_or_default();
        let full_name = self.full_name.as_deref().map(str::trim).unwrap_or_default();
        if email.is_empty() || password.is_empty() || full_name.is_empty() {
            return Err(BankPanelError::validation("Email, password, and full name are required"));
        }
        Ok((email.to_string(), password.to_string(), full_name.to_string()))
    }
}

impl fmt::Debug for NewStaff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewStaff")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("full_name", &self.full_name)
            .finish()
    }
}

/// Outcome of a completed provisioning run.
#[derive(Debug, Clone, Serialize)]
pub struct Provisioned {
    pub user_id: String,
    pub profile: Profile,
    pub message: String,
}

pub struct StaffProvisioner {
    identity: Arc<dyn IdentityAdmin>,
    store: Arc<dyn DataStore>,
    mode: ProfileMode,
    verify_delay: Duration,
}

impl StaffProvisioner {
    pub fn new(identity: Arc<dyn IdentityAdmin>, store: Arc<dyn DataStore>) -> Self {
        Self::with_config(identity, store, &ProvisioningConfig::default())
    }

    pub fn with_config(
        identity: Arc<dyn IdentityAdmin>,
        store: Arc<dyn DataStore>,
        config: &ProvisioningConfig,
    ) -> Self {
        Self {
            identity,
            store,
            mode: config.profile_mode,
            verify_delay: Duration::from_millis(config.verify_delay_ms),
        }
    }

    /// Create a staff member.
    pub async fn provision(&self, req: NewStaff) -> Result<Provisioned> {
        self.provision_as(req, Role::Staff).await
    }

    /// Create an administrator; only reachable from the command line.
    pub async fn provision_admin(&self, req: NewStaff) -> Result<Provisioned> {
        self.provision_as(req, Role::Admin).await
    }

    async fn provision_as(&self, req: NewStaff, role: Role) -> Result<Provisioned> {
        let (email, password, full_name) = req.require()?;

        let identity = self
            .identity
            .create_user(&NewIdentity {
                email: email.clone(),
                password,
                email_confirm: true,
                user_metadata: UserMetadata { full_name: Some(full_name.clone()), role: Some(role) },
            })
            .await?;

        if identity.id.is_empty() {
            return Err(BankPanelError::store("User creation failed: no userId returned"));
        }

        match self.attach_profile(&identity, &full_name, role).await {
            Ok(profile) => {
                tracing::info!("👤 Created {role} {email} (user={}, profile={})", identity.id, profile.id);
                let message = match role {
                    Role::Staff => "Staff member created successfully",
                    Role::Admin => "Admin created successfully",
                };
                Ok(Provisioned { user_id: identity.id, profile, message: message.into() })
            }
            Err(cause) => {
                tracing::warn!("Profile for {email} not confirmed ({cause}), removing identity {}", identity.id);
                self.compensate(&identity.id).await;
                Err(BankPanelError::provision(PROFILE_FAILED))
            }
        }
    }

    /// Insert or await the profile row, then confirm it by re-reading.
    async fn attach_profile(&self, identity: &Identity, full_name: &str, role: Role) -> Result<Profile> {
        match self.mode {
            ProfileMode::Insert => {
                self.store
                    .insert_profile(&NewProfile {
                        user_id: identity.id.clone(),
                        full_name: full_name.to_string(),
                        role,
                        status: AccountStatus::Active,
                    })
                    .await?;
            }
            ProfileMode::Trigger => tokio::time::sleep(self.verify_delay).await,
        }

        let profile = self
            .store
            .profile_by_user_id(&identity.id)
            .await?
            .ok_or_else(|| BankPanelError::store("Profile not found after creation"))?;
        if profile.role != role {
            return Err(BankPanelError::store(format!("Profile has role {} instead of {role}", profile.role)));
        }
        Ok(profile)
    }

    async fn compensate(&self, user_id: &str) {
        match self.identity.delete_user(user_id).await {
            Ok(()) => tracing::info!("↩️ Removed identity {user_id} after failed profile creation"),
            Err(e) => tracing::error!("Identity {user_id} left without a profile, delete failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, Faulty};

    #[tokio::test]
    async fn test_provision_creates_identity_and_profile() {
        let backend = testing::local();
        let provisioner = StaffProvisioner::new(backend.clone(), backend.clone());

        let done = provisioner
            .provision(NewStaff::new(" nina@bank.test ", "nina-pass", " Nina Shah "))
            .await
            .unwrap();
        assert_eq!(done.message, "Staff member created successfully");
        assert_eq!(done.profile.user_id, done.user_id);
        assert_eq!(done.profile.full_name, "Nina Shah");
        assert_eq!(done.profile.role, Role::Staff);
        assert_eq!(done.profile.status, AccountStatus::Active);

        assert_eq!(backend.identity_count().unwrap(), 1);
        assert_eq!(backend.list_profiles(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_have_no_side_effect() {
        let backend = testing::local();
        let provisioner = StaffProvisioner::new(backend.clone(), backend.clone());

        let cases = [
            NewStaff { email: None, ..NewStaff::new("", "pw-123456", "A") },
            NewStaff::new("a@bank.test", "", "A"),
            NewStaff::new("a@bank.test", "pw-123456", "   "),
            NewStaff::default(),
        ];
        for req in cases {
            let err = provisioner.provision(req).await.unwrap_err();
            assert!(matches!(err, BankPanelError::Validation(_)));
        }
        assert_eq!(backend.identity_count().unwrap(), 0);
        assert!(backend.list_profiles(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_identity_failure_creates_no_profile() {
        let backend = testing::local();
        let faulty = Arc::new(Faulty { fail_create_user: true, ..Faulty::new(backend.clone()) });
        let provisioner = StaffProvisioner::new(faulty.clone(), faulty);

        let err = provisioner
            .provision(NewStaff::new("x@bank.test", "x-pass-1", "X"))
            .await
            .unwrap_err();
        assert!(matches!(err, BankPanelError::Identity(ref m) if m == "identity service unavailable"));
        assert!(backend.list_profiles(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_identity_without_id_is_store_error() {
        let backend = testing::local();
        let faulty = Arc::new(Faulty { blank_identity_id: true, ..Faulty::new(backend.clone()) });
        let provisioner = StaffProvisioner::new(faulty.clone(), faulty);

        let err = provisioner
            .provision(NewStaff::new("blank@bank.test", "blank-pass", "Blank"))
            .await
            .unwrap_err();
        assert!(matches!(err, BankPanelError::Store(_)));
        assert_eq!(err.to_string(), "User creation failed: no userId returned");
        assert!(backend.list_profiles(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upstream_identity_message_is_verbatim() {
        let backend = testing::local();
        let provisioner = StaffProvisioner::new(backend.clone(), backend.clone());
        provisioner.provision(NewStaff::new("dup@bank.test", "dup-pass", "Dup")).await.unwrap();

        let err = provisioner
            .provision(NewStaff::new("dup@bank.test", "dup-pass", "Dup Again"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "A user with this email address has already been registered");
        assert_eq!(backend.list_profiles(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_profile_insert_rolls_back_identity() {
        let backend = testing::local();
        let faulty = Arc::new(Faulty { fail_insert_profile: true, ..Faulty::new(backend.clone()) });
        let provisioner = StaffProvisioner::new(faulty.clone(), faulty);

        let err = provisioner
            .provision(NewStaff::new("roll@bank.test", "roll-pass", "Roll"))
            .await
            .unwrap_err();
        assert!(matches!(err, BankPanelError::Provision(ref m) if m == PROFILE_FAILED));
        assert!(backend.identity_by_email("roll@bank.test").unwrap().is_none());
        assert_eq!(backend.identity_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unconfirmed_profile_rolls_back_identity() {
        let backend = testing::local();
        let faulty = Arc::new(Faulty { hide_profiles: true, ..Faulty::new(backend.clone()) });
        let provisioner = StaffProvisioner::new(faulty.clone(), faulty);

        let err = provisioner
            .provision(NewStaff::new("ghost@bank.test", "ghost-pass", "Ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, BankPanelError::Provision(_)));
        assert!(backend.identity_by_email("ghost@bank.test").unwrap().is_none());
        // Cascade removed the inserted row along with the identity.
        assert!(backend.list_profiles(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_rollback_still_reports_failure() {
        let backend = testing::local();
        let faulty = Arc::new(Faulty {
            fail_insert_profile: true,
            fail_delete_user: true,
            ..Faulty::new(backend.clone())
        });
        let provisioner = StaffProvisioner::new(faulty.clone(), faulty);

        let err = provisioner
            .provision(NewStaff::new("stuck@bank.test", "stuck-pass", "Stuck"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), PROFILE_FAILED);
        assert!(backend.identity_by_email("stuck@bank.test").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_trigger_mode_waits_for_profile() {
        let backend = testing::local();
        backend.enable_profile_trigger().unwrap();
        let config = ProvisioningConfig { profile_mode: ProfileMode::Trigger, verify_delay_ms: 5 };
        let provisioner = StaffProvisioner::with_config(backend.clone(), backend.clone(), &config);

        let done = provisioner
            .provision(NewStaff::new("trig@bank.test", "trig-pass", "Trig"))
            .await
            .unwrap();
        assert_eq!(done.profile.full_name, "Trig");
        assert_eq!(backend.list_profiles(Some(Role::Staff)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_trigger_mode_without_trigger_rolls_back() {
        let backend = testing::local();
        let config = ProvisioningConfig { profile_mode: ProfileMode::Trigger, verify_delay_ms: 1 };
        let provisioner = StaffProvisioner::with_config(backend.clone(), backend.clone(), &config);

        let err = provisioner
            .provision(NewStaff::new("none@bank.test", "none-pass", "None"))
            .await
            .unwrap_err();
        assert!(matches!(err, BankPanelError::Provision(_)));
        assert_eq!(backend.identity_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_provision_admin() {
        let backend = testing::local();
        let provisioner = StaffProvisioner::new(backend.clone(), backend.clone());
        let done = provisioner
            .provision_admin(NewStaff::new("root@bank.test", "root-pass", "Root"))
            .await
            .unwrap();
        assert_eq!(done.profile.role, Role::Admin);
        assert!(backend.list_profiles(Some(Role::Staff)).await.unwrap().is_empty());
    }

    #[test]
    fn test_request_aliases_and_redaction() {
        for body in [
            r#"{"email":"a@b.c","password":"p","fullName":"A"}"#,
            r#"{"email":"a@b.c","password":"p","name":"A"}"#,
            r#"{"email":"a@b.c","password":"p","full_name":"A"}"#,
        ] {
            let req: NewStaff = serde_json::from_str(body).unwrap();
            assert_eq!(req.full_name.as_deref(), Some("A"));
        }
        let debug = format!("{:?}", NewStaff::new("a@b.c", "hunter22", "A"));
        assert!(!debug.contains("hunter22"));
    }
}
