//! Admin dashboard — staff roster, all bank details, balance summary.

use std::sync::Arc;

use bankpanel_core::error::Result;
use bankpanel_core::summary::BalanceSummary;
use bankpanel_core::traits::DataStore;
use bankpanel_core::types::{BankDetail, Profile, Role, StaffFilter};
use serde::Serialize;

use crate::provision::{NewStaff, Provisioned, StaffProvisioner};

#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub staff: Vec<Profile>,
    pub bank_details: Vec<BankDetail>,
    pub summary: BalanceSummary,
}

pub struct AdminDashboard {
    store: Arc<dyn DataStore>,
    provisioner: Arc<StaffProvisioner>,
}

impl AdminDashboard {
    pub fn new(store: Arc<dyn DataStore>, provisioner: Arc<StaffProvisioner>) -> Self {
        Self { store, provisioner }
    }

    /// Staff profiles, newest first.
    pub async fn staff(&self) -> Result<Vec<Profile>> {
        self.store.list_profiles(Some(Role::Staff)).await
    }

    /// Bank details with their owner embedded.
    pub async fn bank_details(&self, filter: &StaffFilter) -> Result<Vec<BankDetail>> {
        self.store.list_bank_details(filter, true).await
    }

    pub async fn overview(&self, filter: &StaffFilter) -> Result<AdminOverview> {
        let (staff, bank_details) = tokio::try_join!(self.staff(), self.bank_details(filter))?;
        let summary = BalanceSummary::from_details(&bank_details);
        Ok(AdminOverview { staff, bank_details, summary })
    }

    pub async fn create_staff(&self, req: NewStaff) -> Result<Provisioned> {
        self.provisioner.provision(req).await
    }
}
