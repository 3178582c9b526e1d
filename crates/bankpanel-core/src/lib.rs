//! # Banking Panel Core
//!
//! Domain types, error type, configuration and the two backend seams
//! (identity administration and the table store) shared by every crate.

pub mod config;
pub mod error;
pub mod summary;
pub mod traits;
pub mod types;

pub use config::BankPanelConfig;
pub use error::{BankPanelError, Result};
pub use summary::BalanceSummary;
