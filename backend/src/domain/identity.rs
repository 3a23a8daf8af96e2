//! Per-request identity resolution.
//!
//! Each inbound operation resolves the raw `Authorization` header exactly once
//! into a [`RequestContext`]. Resolution never fails: anything short of a
//! valid bearer token yields an anonymous context and the gated operations
//! decide what that means.

use std::sync::Arc;

use tracing::debug;

use super::ports::CredentialService;
use super::{Error, UserId};

/// Message returned by gated operations when no identity is present.
pub const LOGIN_REQUIRED: &str = "login required";

/// Identity attached to a single inbound operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestContext {
    user_id: Option<UserId>,
}

impl RequestContext {
    /// Context without a verified identity.
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// Context for a verified user.
    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// Verified user id, if any.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Return the verified user id or an authentication error.
    ///
    /// # Examples
    /// ```
    /// use watchlist::domain::{ErrorCode, RequestContext};
    ///
    /// let err = RequestContext::anonymous().require_user().unwrap_err();
    /// assert_eq!(err.code(), ErrorCode::Unauthorized);
    /// ```
    pub fn require_user(&self) -> Result<&UserId, Error> {
        self.user_id
            .as_ref()
            .ok_or_else(|| Error::unauthorized(LOGIN_REQUIRED))
    }
}

/// Extract the token from a `Bearer` authorisation value.
///
/// The scheme is matched case-insensitively and surrounding whitespace is
/// ignored. Returns `None` for other schemes or an empty token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let trimmed = header.trim();
    let (scheme, rest) = trimmed.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}

/// Turns raw `Authorization` header values into request contexts.
#[derive(Clone)]
pub struct IdentityResolver {
    credentials: Arc<dyn CredentialService>,
}

impl IdentityResolver {
    /// Build a resolver backed by `credentials` for token verification.
    pub fn new(credentials: Arc<dyn CredentialService>) -> Self {
        Self { credentials }
    }

    /// Resolve an optional header value into a context.
    pub fn resolve(&self, authorization: Option<&str>) -> RequestContext {
        let Some(header) = authorization else {
            return RequestContext::anonymous();
        };
        let Some(token) = bearer_token(header) else {
            debug!("ignoring authorization header without a bearer token");
            return RequestContext::anonymous();
        };
        match self.credentials.verify_token(token) {
            Some(user_id) => RequestContext::authenticated(user_id),
            None => {
                debug!("ignoring invalid or expired identity token");
                RequestContext::anonymous()
            }
        }
    }
}
