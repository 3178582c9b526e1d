//! # Banking Panel Backends
//!
//! Implementations of the identity-admin and table-store seams: the hosted
//! REST backend and the embedded SQLite backend.

pub mod local;
pub mod rest;
pub mod supabase;

use std::sync::Arc;

use bankpanel_core::config::{BackendKind, BankPanelConfig, ProfileMode};
use bankpanel_core::error::Result;
use bankpanel_core::traits::{DataStore, IdentityAdmin};

pub use local::LocalBackend;
pub use supabase::SupabaseBackend;

/// Both seams, possibly served by the same object.
#[derive(Clone)]
pub struct Backend {
    pub identity: Arc<dyn IdentityAdmin>,
    pub store: Arc<dyn DataStore>,
}

impl Backend {
    pub fn from_shared<B>(backend: Arc<B>) -> Self
    where
        B: IdentityAdmin + DataStore + 'static,
    {
        Self { identity: backend.clone(), store: backend }
    }
}

/// Create the backend selected by configuration.
pub fn create_backend(config: &BankPanelConfig) -> Result<Backend> {
    match config.backend.kind {
        BackendKind::Local => {
            let path = config.backend.db_path();
            let db = LocalBackend::open(&path)?;
            if config.provisioning.profile_mode == ProfileMode::Trigger {
                db.enable_profile_trigger()?;
            }
            tracing::info!("💾 Local backend at {}", path.display());
            Ok(Backend::from_shared(Arc::new(db)))
        }
        BackendKind::Supabase => {
            let hosted = SupabaseBackend::new(&config.backend.url, &config.backend.service_role_key)?;
            tracing::info!("☁️ Hosted backend at {}", config.backend.url);
            Ok(Backend::from_shared(Arc::new(hosted)))
        }
    }
}
