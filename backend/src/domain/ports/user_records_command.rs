//! Driving port for user record mutations.
//!
//! HTTP handlers call [`UserRecordsCommand`] with input the validation layer
//! has already accepted. Implementations translate storage outcomes into the
//! domain [`Error`] taxonomy: missing records become `not_found`, email
//! collisions become `conflict`.

use async_trait::async_trait;

use crate::domain::{Error, NewUser, User, UserChanges, UserId};

/// Domain use-case port for creating, updating and deleting user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRecordsCommand: Send + Sync {
    /// Create a record with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns a conflict when the email already belongs to another record.
    async fn create(&self, input: NewUser) -> Result<User, Error>;

    /// Apply a partial update and refresh `updatedAt`.
    ///
    /// # Errors
    ///
    /// Returns not found when `id` is absent, or a conflict when the new
    /// email already belongs to another record.
    async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, Error>;

    /// Remove a record.
    ///
    /// # Errors
    ///
    /// Returns not found when `id` is absent.
    async fn delete(&self, id: &UserId) -> Result<(), Error>;
}
