//! Caller identity.

use common::UserId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub email: String,
    pub nickname: String,
}

impl CurrentUser {
    /// Creates a user whose profile defaults come from `email` and `nickname`.
    pub fn new(
        user_id: impl Into<UserId>,
        email: impl Into<String>,
        nickname: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            nickname: nickname.into(),
        }
    }
}

/// Resolves the identity of the current caller.
///
/// Authentication happens outside this crate; operations requiring an
/// identity fail with `Unauthorized` when none resolves.
pub trait IdentityProvider: Send + Sync {
    /// Returns the current user, or None for an anonymous caller.
    fn current_user(&self) -> Option<CurrentUser>;
}

impl IdentityProvider for CurrentUser {
    fn current_user(&self) -> Option<CurrentUser> {
        Some(self.clone())
    }
}

impl IdentityProvider for Option<CurrentUser> {
    fn current_user(&self) -> Option<CurrentUser> {
        self.clone()
    }
}

/// Returns the current user or fails with `Unauthorized`.
pub fn require_user(identity: &dyn IdentityProvider) -> Result<CurrentUser, DomainError> {
    identity.current_user().ok_or(DomainError::Unauthorized)
}
