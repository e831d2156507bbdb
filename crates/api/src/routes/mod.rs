//! HTTP handlers, one module per resource.

pub mod conference;
pub mod health;
pub mod metrics;
pub mod profile;
pub mod session;
