//! Test doubles shared by the platform tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bankpanel_backend::LocalBackend;
use bankpanel_core::error::{BankPanelError, Result};
use bankpanel_core::traits::{DataStore, IdentityAdmin};
use bankpanel_core::types::{
    BankDetail, BankDetailFields, Identity, NewIdentity, NewProfile, Profile, Role, StaffFilter,
};

pub fn local() -> Arc<LocalBackend> {
    Arc::new(LocalBackend::open(Path::new(":memory:")).unwrap().with_hash_cost(4))
}

/// Local backend with switchable failures.
pub struct Faulty {
    pub inner: Arc<LocalBackend>,
    pub fail_create_user: bool,
    /// Identity creation "succeeds" without an id and stores nothing.
    pub blank_identity_id: bool,
    pub fail_delete_user: bool,
    pub fail_insert_profile: bool,
    /// Profile lookups by identity find nothing.
    pub hide_profiles: bool,
}

impl Faulty {
    pub fn new(inner: Arc<LocalBackend>) -> Self {
        Self {
            inner,
            fail_create_user: false,
            blank_identity_id: false,
            fail_delete_user: false,
            fail_insert_profile: false,
            hide_profiles: false,
        }
    }
}

#[async_trait]
impl IdentityAdmin for Faulty {
    fn name(&self) -> &str { "faulty" }

    async fn create_user(&self, user: &NewIdentity) -> Result<Identity> {
        if self.fail_create_user {
            return Err(BankPanelError::identity("identity service unavailable"));
        }
        if self.blank_identity_id {
            return Ok(Identity {
                id: String::new(),
                email: user.email.clone(),
                user_metadata: user.user_metadata.clone(),
            });
        }
        self.inner.create_user(user).await
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        if self.fail_delete_user {
            return Err(BankPanelError::identity("delete refused"));
        }
        self.inner.delete_user(user_id).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        self.inner.sign_in(email, password).await
    }
}

#[async_trait]
impl DataStore for Faulty {
    async fn insert_profile(&self, profile: &NewProfile) -> Result<Profile> {
        if self.fail_insert_profile {
            return Err(BankPanelError::store("insert rejected"));
        }
        self.inner.insert_profile(profile).await
    }

    async fn profile_by_user_id(&self, user_id: &str) -> Result<Option<Profile>> {
        if self.hide_profiles {
            return Ok(None);
        }
        self.inner.profile_by_user_id(user_id).await
    }

    async fn profile_by_id(&self, id: &str) -> Result<Option<Profile>> {
        self.inner.profile_by_id(id).await
    }

    async fn list_profiles(&self, role: Option<Role>) -> Result<Vec<Profile>> {
        self.inner.list_profiles(role).await
    }

    async fn list_bank_details(&self, filter: &StaffFilter, with_owner: bool) -> Result<Vec<BankDetail>> {
        self.inner.list_bank_details(filter, with_owner).await
    }

    async fn get_bank_detail(&self, id: &str) -> Result<Option<BankDetail>> {
        self.inner.get_bank_detail(id).await
    }

    async fn insert_bank_detail(&self, staff_id: &str, fields: &BankDetailFields) -> Result<BankDetail> {
        self.inner.insert_bank_detail(staff_id, fields).await
    }

    async fn update_bank_detail(&self, id: &str, fields: &BankDetailFields) -> Result<BankDetail> {
        self.inner.update_bank_detail(id, fields).await
    }

    async fn delete_bank_detail(&self, id: &str) -> Result<()> {
        self.inner.delete_bank_detail(id).await
    }
}
