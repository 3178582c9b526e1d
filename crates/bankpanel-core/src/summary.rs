//! Balance aggregates over a loaded list of bank details.

use serde::Serialize;

use crate::types::{AccountStatus, Amount, BankDetail};

/// Totals shown on the admin overview cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BalanceSummary {
    pub total_balance: Amount,
    pub active_balance: Amount,
    pub inactive_balance: Amount,
    pub active_count: usize,
    pub inactive_count: usize,
}

impl BalanceSummary {
    pub fn from_details(details: &[BankDetail]) -> Self {
        let mut summary = Self::default();
        for detail in details {
            match detail.status {
                AccountStatus::Active => {
                    summary.active_balance = summary.active_balance.saturating_add(detail.freeze_balance);
                    summary.active_count += 1;
                }
                AccountStatus::Inactive => {
                    summary.inactive_balance =
                        summary.inactive_balance.saturating_add(detail.freeze_balance);
                    summary.inactive_count += 1;
                }
            }
        }
        summary.total_balance = summary.active_balance.saturating_add(summary.inactive_balance);
        summary
    }

    pub fn total_count(&self) -> usize {
        self.active_count + self.inactive_count
    }
}
