//! Collaborator seams implemented by the backends.

pub mod identity;
pub mod store;

pub use identity::IdentityAdmin;
pub use store::DataStore;
