//! Dashboard services: one per role.

pub mod admin;
pub mod staff;

use bankpanel_core::types::Role;
use serde::{Deserialize, Serialize};

pub use admin::{AdminDashboard, AdminOverview};
pub use staff::StaffDashboard;

/// Which dashboard a signed-in profile lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardView {
    Admin,
    Staff,
}

impl DashboardView {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => DashboardView::Admin,
            Role::Staff => DashboardView::Staff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_for_role() {
        assert_eq!(DashboardView::for_role(Role::Admin), DashboardView::Admin);
        assert_eq!(DashboardView::for_role(Role::Staff), DashboardView::Staff);
        assert_eq!(serde_json::to_string(&DashboardView::Admin).unwrap(), "\"admin\"");
    }
}
