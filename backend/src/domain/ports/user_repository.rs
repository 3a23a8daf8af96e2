//! Port abstraction for user persistence adapters and their errors.
//!
//! Saved-item mutations are expressed as single set operations so adapters
//! can make them atomic; the domain never reads a collection, edits it and
//! writes it back.
use async_trait::async_trait;

use crate::domain::{CatalogKey, SavedItem, User, UserId, UserRecord};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique field (email or username) is already taken.
        Duplicate { field: String } => "user repository rejected duplicate {field}",
    }
}

/// Persistence port for users and their saved-item sets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user and password hash by normalised email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserPersistenceError>;

    /// Fetch a user and password hash by username.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, UserPersistenceError>;

    /// Fetch a user and password hash by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserPersistenceError>;

    /// Insert a new user.
    ///
    /// Returns [`UserPersistenceError::Duplicate`] when the email or username
    /// is already taken.
    async fn create(&self, record: &UserRecord) -> Result<(), UserPersistenceError>;

    /// Atomically add `item` to the user's saved set unless its key is
    /// already present. Returns `None` when the user does not exist.
    async fn add_to_saved_set(
        &self,
        user_id: &UserId,
        item: &SavedItem,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Atomically remove the item with `key` from the user's saved set.
    /// Returns `None` when the user does not exist.
    async fn remove_from_saved_set(
        &self,
        user_id: &UserId,
        key: &CatalogKey,
    ) -> Result<Option<User>, UserPersistenceError>;
}
