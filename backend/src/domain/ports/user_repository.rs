//! Driven port for user record storage and its errors.
//!
//! Adapters own uniqueness: `insert` and `update` report a taken email as
//! [`UserPersistenceError::DuplicateEmail`] from the store's own constraint
//! check, so callers never need to look the email up first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{User, UserChanges, UserId, UserListQuery, UserPage};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The write would give two records the same email.
        DuplicateEmail => "user email already exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new record.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a record by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Apply `changes` stamped with `updated_at`, returning the new state.
    ///
    /// Returns `Ok(None)` when no row matched `id`.
    async fn update(
        &self,
        id: &UserId,
        changes: &UserChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Remove a record. Returns whether a row was removed.
    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError>;

    /// Evaluate a filtered, sorted, windowed listing.
    async fn list(&self, query: &UserListQuery) -> Result<UserPage, UserPersistenceError>;
}
