//! Process-local `UserRepository` used when no database is configured.
//!
//! Records live in a `BTreeMap` behind a mutex, so every operation is
//! linearisable and a failed write leaves the map untouched. Email
//! uniqueness is checked inside the same critical section as the write.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{User, UserChanges, UserId, UserListQuery, UserPage};

/// In-memory implementation of the `UserRepository` port.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<BTreeMap<UserId, User>>,
}

impl InMemoryUserRepository {
    fn records(&self) -> Result<MutexGuard<'_, BTreeMap<UserId, User>>, UserPersistenceError> {
        self.users
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }
}

fn email_taken(records: &BTreeMap<UserId, User>, email: &str, except: Option<&UserId>) -> bool {
    records
        .values()
        .any(|user| Some(user.id()) != except && user.email().as_ref() == email)
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut records = self.records()?;
        if records.contains_key(user.id()) {
            return Err(UserPersistenceError::query("user id already exists"));
        }
        if email_taken(&records, user.email().as_ref(), None) {
            return Err(UserPersistenceError::duplicate_email());
        }
        records.insert(*user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.records()?.get(id).cloned())
    }

    async fn update(
        &self,
        id: &UserId,
        changes: &UserChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut records = self.records()?;
        let Some(current) = records.get(id) else {
            return Ok(None);
        };
        if let Some(email) = changes.email()
            && email_taken(&records, email.as_ref(), Some(id))
        {
            return Err(UserPersistenceError::duplicate_email());
        }
        let updated = current.clone().apply(changes, updated_at);
        records.insert(*id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        Ok(self.records()?.remove(id).is_some())
    }

    async fn list(&self, query: &UserListQuery) -> Result<UserPage, UserPersistenceError> {
        let records = self.records()?;
        Ok(query.select(records.values()))
    }
}
