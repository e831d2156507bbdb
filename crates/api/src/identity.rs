//! Caller identity taken from request headers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use domain::{CurrentUser, IdentityProvider};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NICKNAME_HEADER: &str = "x-user-nickname";

/// The authenticated caller, if any.
///
/// A request without a non-empty `x-user-id` header is anonymous. The
/// nickname defaults to the user id and the email to empty.
#[derive(Debug, Clone, Default)]
pub struct Identity(pub Option<CurrentUser>);

impl Identity {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        Self(header(USER_ID_HEADER).map(|id| {
            let nickname = header(USER_NICKNAME_HEADER).unwrap_or_else(|| id.clone());
            CurrentUser::new(id, header(USER_EMAIL_HEADER).unwrap_or_default(), nickname)
        }))
    }
}

impl IdentityProvider for Identity {
    fn current_user(&self) -> Option<CurrentUser> {
        self.0.clone()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_user_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(Identity::from_headers(&headers).current_user().is_none());

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("alice"));
        headers.insert(USER_EMAIL_HEADER, HeaderValue::from_static("alice@example.com"));
        let user = Identity::from_headers(&headers).current_user().unwrap();
        assert_eq!(user.user_id.as_str(), "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.nickname, "alice");
    }

    #[test]
    fn blank_user_id_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("  "));
        assert!(Identity::from_headers(&headers).current_user().is_none());
    }
}
