//! Table store over the `profiles` and `bank_details` collections.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{BankDetail, BankDetailFields, NewProfile, Profile, Role, StaffFilter};

/// Listings are always ordered newest first.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn insert_profile(&self, profile: &NewProfile) -> Result<Profile>;

    /// Profile linked to an identity, if any.
    async fn profile_by_user_id(&self, user_id: &str) -> Result<Option<Profile>>;

    async fn profile_by_id(&self, id: &str) -> Result<Option<Profile>>;

    /// Profiles, optionally restricted to one role.
    async fn list_profiles(&self, role: Option<Role>) -> Result<Vec<Profile>>;

    /// Bank details for `filter`. With `with_owner` each record embeds its
    /// owner profile.
    async fn list_bank_details(&self, filter: &StaffFilter, with_owner: bool) -> Result<Vec<BankDetail>>;

    async fn get_bank_detail(&self, id: &str) -> Result<Option<BankDetail>>;

    async fn insert_bank_detail(&self, staff_id: &str, fields: &BankDetailFields) -> Result<BankDetail>;

    async fn update_bank_detail(&self, id: &str, fields: &BankDetailFields) -> Result<BankDetail>;

    async fn delete_bank_detail(&self, id: &str) -> Result<()>;
}
