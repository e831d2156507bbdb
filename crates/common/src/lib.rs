//! Shared identifier types.
//!
//! - [`UserId`] names the authenticated user owning a profile
//! - [`Key`] is the hierarchical entity key used by the datastore, with a
//!   URL-safe encoding used as the external identifier of every entity

pub mod key;
pub mod types;

pub use key::{Key, KeyError, KeyId, KeyPart};
pub use types::UserId;
