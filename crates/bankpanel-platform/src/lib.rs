//! # Banking Panel Platform
//!
//! Services behind the HTTP surface: session tokens, staff provisioning with
//! compensating rollback, and the admin and staff dashboards.

pub mod auth;
pub mod dashboard;
pub mod provision;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{Caller, Session, SessionService};
pub use dashboard::{AdminDashboard, AdminOverview, DashboardView, StaffDashboard};
pub use provision::{NewStaff, Provisioned, StaffProvisioner};
