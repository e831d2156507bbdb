//! Conference domain layer.
//!
//! This crate provides:
//! - The entity model (profiles, conferences, sessions, speakers) and key hierarchy
//! - A compiler from search conditions to datastore queries
//! - The booking engine for seats, topics and wishlists
//! - Wire forms with explicit entity mappings
//! - Services implementing the exposed operations, with bounded transaction retry

pub mod booking;
pub mod error;
pub mod filter;
pub mod forms;
pub mod identity;
pub mod model;
pub mod retry;
pub mod services;
pub mod tasks;

pub use booking::BookingEngine;
pub use error::DomainError;
pub use forms::{
    BooleanMessage, ConferenceForm, ConferenceForms, ConferenceQueryForm, ConferenceQueryForms,
    ProfileForm, ProfileMiniForm, SessionForm, SessionForms, StringMessage,
};
pub use identity::{CurrentUser, IdentityProvider};
pub use model::{Conference, Profile, Session, Speaker, TeeShirtSize};
pub use retry::TransactionPolicy;
pub use services::{ConferenceService, ProfileService, SessionService};
pub use tasks::{RecordingTaskQueue, Task, TaskQueue, TaskQueueError};
