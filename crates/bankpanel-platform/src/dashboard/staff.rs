//! Staff dashboard — a staff member's own bank details.

use std::sync::Arc;

use bankpanel_core::error::{BankPanelError, Result};
use bankpanel_core::traits::DataStore;
use bankpanel_core::types::{BankDetail, BankDetailInput, Profile, StaffFilter};

/// Bound to one owner; every query and mutation is scoped to that profile.
pub struct StaffDashboard {
    store: Arc<dyn DataStore>,
    owner: Profile,
}

impl StaffDashboard {
    pub fn new(store: Arc<dyn DataStore>, owner: Profile) -> Self {
        Self { store, owner }
    }

    pub fn owner(&self) -> &Profile {
        &self.owner
    }

    pub async fn list(&self) -> Result<Vec<BankDetail>> {
        self.store
            .list_bank_details(&StaffFilter::Only(self.owner.id.clone()), false)
            .await
    }

    /// Add a record and return the refreshed listing.
    pub async fn create(&self, input: BankDetailInput) -> Result<Vec<BankDetail>> {
        let fields = input.validate()?;
        let created = self.store.insert_bank_detail(&self.owner.id, &fields).await?;
        tracing::info!("🏦 {} added bank detail {}", self.owner.id, created.id);
        self.list().await
    }

    pub async fn update(&self, id: &str, input: BankDetailInput) -> Result<Vec<BankDetail>> {
        let fields = input.validate()?;
        self.owned(id).await?;
        self.store.update_bank_detail(id, &fields).await?;
        self.list().await
    }

    /// Delete only once the caller has confirmed.
    pub async fn delete(&self, id: &str, confirmed: bool) -> Result<Vec<BankDetail>> {
        if !confirmed {
            return Err(BankPanelError::validation("Deletion must be confirmed"));
        }
        self.owned(id).await?;
        self.store.delete_bank_detail(id).await?;
        tracing::info!("🗑 {} deleted bank detail {id}", self.owner.id);
        self.list().await
    }

    async fn owned(&self, id: &str) -> Result<BankDetail> {
        let detail = self
            .store
            .get_bank_detail(id)
            .await?
            .ok_or_else(|| BankPanelError::not_found("Bank detail not found"))?;
        if detail.staff_id != self.owner.id {
            return Err(BankPanelError::forbidden("Bank detail belongs to another staff member"));
        }
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::{NewStaff, StaffProvisioner};
    use crate::testing;
    use bankpanel_core::types::{AccountStatus, Amount, Merchant};

    fn input(holder: &str) -> BankDetailInput {
        BankDetailInput {
            ac_holder_name: holder.into(),
            bank_name: "Kotak".into(),
            acc_number: "123400".into(),
            mobile_number: "9812345678".into(),
            merchant_name: Some(Merchant::GooglePay),
            status: AccountStatus::Active,
            freeze_reason: None,
            freeze_balance: Amount::from_minor(5_000),
        }
    }

    async fn two_staff() -> (StaffDashboard, StaffDashboard) {
        let backend = testing::local();
        let provisioner = StaffProvisioner::new(backend.clone(), backend.clone());
        let a = provisioner.provision(NewStaff::new("a@bank.test", "a-pass-1", "A")).await.unwrap();
        let b = provisioner.provision(NewStaff::new("b@bank.test", "b-pass-1", "B")).await.unwrap();
        (
            StaffDashboard::new(backend.clone(), a.profile),
            StaffDashboard::new(backend, b.profile),
        )
    }

    #[tokio::test]
    async fn test_create_lists_only_own_records() {
        let (a, b) = two_staff().await;
        let listing = a.create(input("First")).await.unwrap();
        assert_eq!(listing.len(), 1);
        b.create(input("Other")).await.unwrap();

        let mine = a.create(input("Second")).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].ac_holder_name, "Second");
        assert!(mine.iter().all(|d| d.staff_id == a.owner().id));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let (a, _) = two_staff().await;
        let mut bad = input("X");
        bad.merchant_name = None;
        assert!(matches!(a.create(bad).await, Err(BankPanelError::Validation(_))));
        assert!(a.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_own_record() {
        let (a, _) = two_staff().await;
        let id = a.create(input("Before")).await.unwrap()[0].id.clone();

        let mut changed = input("After");
        changed.status = AccountStatus::Inactive;
        changed.freeze_reason = Some("KYC pending".into());
        let listing = a.update(&id, changed).await.unwrap();
        assert_eq!(listing[0].ac_holder_name, "After");
        assert_eq!(listing[0].freeze_reason.as_deref(), Some("KYC pending"));

        assert!(matches!(a.update("missing", input("Z")).await, Err(BankPanelError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_cannot_touch_other_owner_records() {
        let (a, b) = two_staff().await;
        let theirs = b.create(input("Theirs")).await.unwrap()[0].id.clone();

        assert!(matches!(a.update(&theirs, input("Hijack")).await, Err(BankPanelError::Forbidden(_))));
        assert!(matches!(a.delete(&theirs, true).await, Err(BankPanelError::Forbidden(_))));
        assert_eq!(b.list().await.unwrap()[0].ac_holder_name, "Theirs");
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation_and_is_scoped() {
        let (a, b) = two_staff().await;
        let id = a.create(input("Mine")).await.unwrap()[0].id.clone();
        b.create(input("Theirs")).await.unwrap();

        assert!(matches!(a.delete(&id, false).await, Err(BankPanelError::Validation(_))));
        assert_eq!(a.list().await.unwrap().len(), 1);

        let remaining = a.delete(&id, true).await.unwrap();
        assert!(remaining.is_empty());
        assert_eq!(b.list().await.unwrap().len(), 1);
    }
}
