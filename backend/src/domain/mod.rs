//! Domain primitives, ports and services.
//!
//! Purpose: define the strongly typed values used by the HTTP and persistence
//! layers, and the watchlist use-cases that tie them together. Keep types
//! immutable and document invariants and serialisation contracts (serde) in
//! each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User, SavedItem, CatalogKey: the watchlist aggregate and its members.
//! - LoginCredentials, Registration, AuthPayload: authentication inputs and
//!   results.
//! - RequestContext, IdentityResolver: per-request identity.
//! - WatchlistGateway: implementation of the `WatchlistService` driving port.

pub mod auth;
pub mod error;
pub mod identity;
pub mod ports;
pub mod saved_item;
pub mod trace_id;
pub mod user;
pub mod watchlist_service;

pub use self::auth::{
    AuthPayload, IdentityToken, LoginCredentials, LoginValidationError, PasswordHash,
    Registration, RegistrationValidationError, UserRecord,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity::{IdentityResolver, LOGIN_REQUIRED, RequestContext, bearer_token};
pub use self::saved_item::{
    CATALOG_KEY_MAX, CatalogKey, RawCatalogKey, SavedItem, SavedItemBuilder,
    SavedItemValidationError,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, EmailAddress, USERNAME_MAX, User, UserId, UserValidationError, Username,
};
pub use self::watchlist_service::{DECOY_PASSWORD_HASH, INVALID_CREDENTIALS, WatchlistGateway};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use watchlist::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("login required"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
