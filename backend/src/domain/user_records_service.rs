//! User record domain service.
//!
//! Implements the driving ports on top of a [`UserRepository`]. Update and
//! delete read the record first so a missing id always surfaces as the same
//! not-found error; a delete racing in between is reported by the write
//! itself matching no row. Email uniqueness is left to the store.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::Paginated;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    UserPersistenceError, UserRecordsCommand, UserRecordsQuery, UserRepository,
};
use crate::domain::{Error, NewUser, User, UserChanges, UserId, UserListQuery};

const NOT_FOUND_MESSAGE: &str = "User not found";
const DUPLICATE_EMAIL_MESSAGE: &str = "Email already exists";

/// User record service implementing the driving ports.
#[derive(Clone)]
pub struct UserRecordsService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> UserRecordsService<R> {
    /// Create a service over `repository`, stamping times from `clock`.
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail => duplicate_email(),
    }
}

fn duplicate_email() -> Error {
    Error::conflict(DUPLICATE_EMAIL_MESSAGE).with_details(json!({
        "field": "email",
        "code": "duplicate_email",
    }))
}

fn not_found(id: &UserId) -> Error {
    Error::not_found(NOT_FOUND_MESSAGE).with_details(json!({ "id": id }))
}

impl<R> UserRecordsService<R>
where
    R: UserRepository,
{
    async fn require(&self, id: &UserId) -> Result<User, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| not_found(id))
    }
}

#[async_trait]
impl<R> UserRecordsCommand for UserRecordsService<R>
where
    R: UserRepository,
{
    async fn create(&self, input: NewUser) -> Result<User, Error> {
        let user = User::create(UserId::random(), input, self.clock.utc());
        self.repository
            .insert(&user)
            .await
            .map_err(map_persistence_error)?;
        info!(user_id = %user.id(), "user created");
        Ok(user)
    }

    async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, Error> {
        self.require(id).await?;
        let updated = self
            .repository
            .update(id, &changes, self.clock.utc())
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| not_found(id))?;
        info!(user_id = %id, "user updated");
        Ok(updated)
    }

    async fn delete(&self, id: &UserId) -> Result<(), Error> {
        self.require(id).await?;
        let removed = self
            .repository
            .delete(id)
            .await
            .map_err(map_persistence_error)?;
        if !removed {
            return Err(not_found(id));
        }
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

#[async_trait]
impl<R> UserRecordsQuery for UserRecordsService<R>
where
    R: UserRepository,
{
    async fn get(&self, id: &UserId) -> Result<User, Error> {
        self.require(id).await
    }

    async fn list(&self, query: &UserListQuery) -> Result<Paginated<User>, Error> {
        let page = self
            .repository
            .list(query)
            .await
            .map_err(map_persistence_error)?;
        Ok(Paginated::new(page.users, query.window, page.total))
    }
}

#[cfg(test)]
#[path = "user_records_service_tests.rs"]
mod tests;
