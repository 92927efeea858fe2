//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Email uniqueness is delegated to the `users_email_key` constraint; the
//! adapter recognises its violation and reports
//! [`UserPersistenceError::DuplicateEmail`]. Updates and deletes are single
//! statements keyed by id, so "no row affected" is the race signal the
//! service relies on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, Score, SortOrder, User, UserChanges, UserId, UserListFilter, UserListQuery,
    UserName, UserPage, UserSort, UserSortField, UserValidationError,
};

use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.message())
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info
                .constraint_name()
                .is_none_or(|name| name == EMAIL_CONSTRAINT) =>
        {
            UserPersistenceError::duplicate_email()
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        _ => UserPersistenceError::query("database error"),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let id = row.id;
    let corrupt = move |err: UserValidationError| {
        UserPersistenceError::query(format!("stored user {id} is invalid: {err}"))
    };
    let name = UserName::new(row.name).map_err(corrupt)?;
    let email = EmailAddress::new(row.email).map_err(corrupt)?;
    let score = Score::new(i64::from(row.score)).map_err(corrupt)?;
    Ok(User::from_parts(
        UserId::from_uuid(id),
        name,
        email,
        score,
        row.created_at,
        row.updated_at,
    ))
}

/// Escape `LIKE` metacharacters and wrap `fragment` for a substring match.
fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn filtered(filter: &UserListFilter) -> users::BoxedQuery<'static, Pg> {
    let mut query = users::table.into_boxed();
    if let Some(fragment) = &filter.name_contains {
        query = query.filter(users::name.ilike(like_pattern(fragment)));
    }
    if let Some(min) = filter.min_score {
        query = query.filter(users::score.ge(i32::try_from(min).unwrap_or(i32::MAX)));
    }
    query
}

fn ordered(
    query: users::BoxedQuery<'static, Pg>,
    sort: UserSort,
) -> users::BoxedQuery<'static, Pg> {
    let query = match (sort.field, sort.order) {
        (UserSortField::Name, SortOrder::Asc) => query.order_by(users::name.asc()),
        (UserSortField::Name, SortOrder::Desc) => query.order_by(users::name.desc()),
        (UserSortField::Email, SortOrder::Asc) => query.order_by(users::email.asc()),
        (UserSortField::Email, SortOrder::Desc) => query.order_by(users::email.desc()),
        (UserSortField::Score, SortOrder::Asc) => query.order_by(users::score.asc()),
        (UserSortField::Score, SortOrder::Desc) => query.order_by(users::score.desc()),
        (UserSortField::CreatedAt, SortOrder::Asc) => query.order_by(users::created_at.asc()),
        (UserSortField::CreatedAt, SortOrder::Desc) => query.order_by(users::created_at.desc()),
    };
    query.then_order_by(users::id.asc())
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            score: i32::from(user.score().value()),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn update(
        &self,
        id: &UserId,
        changes: &UserChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = UserChangeset {
            name: changes.name().map(AsRef::as_ref),
            email: changes.email().map(AsRef::as_ref),
            score: changes.score().map(|score| i32::from(score.value())),
            updated_at,
        };

        let row = diesel::update(users::table.find(*id.as_uuid()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(users::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn list(&self, query: &UserListQuery) -> Result<UserPage, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(&query.filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let offset = i64::try_from(query.window.offset()).unwrap_or(i64::MAX);
        let rows: Vec<UserRow> = ordered(filtered(&query.filter), query.sort)
            .offset(offset)
            .limit(i64::from(query.window.limit()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let users = rows
            .into_iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(UserPage {
            users,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }
}
