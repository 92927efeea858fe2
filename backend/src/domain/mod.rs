//! Domain primitives, services and ports.
//!
//! Purpose: define the user record, its validation rules, the list query
//! model and the service that enforces record semantics. Nothing here knows
//! about HTTP or SQL; adapters reach the domain through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - User (alias to `user::User`): the persisted record.
//! - UserListQuery (alias to `user_query::UserListQuery`): validated list
//!   request.
//! - UserRecordsService: implementation of the driving ports.

pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_query;
pub mod user_records_service;
pub mod validation;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, NewUser, Score, User, UserChanges, UserId, UserName, UserValidationError,
};
pub use self::user_query::{
    SortOrder, UserListFilter, UserListParams, UserListQuery, UserPage, UserSort, UserSortField,
};
pub use self::user_records_service::UserRecordsService;
pub use self::validation::{FieldViolation, ValidationErrors};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use user_api::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("User not found"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
