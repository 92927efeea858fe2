//! Driving port for user record reads.

use async_trait::async_trait;
use pagination::Paginated;

use crate::domain::{Error, User, UserId, UserListQuery};

/// Domain use-case port for fetching and listing user records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRecordsQuery: Send + Sync {
    /// Fetch one record.
    ///
    /// # Errors
    ///
    /// Returns not found when `id` is absent.
    async fn get(&self, id: &UserId) -> Result<User, Error>;

    /// List records. An empty result is not an error.
    async fn list(&self, query: &UserListQuery) -> Result<Paginated<User>, Error>;
}
