//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod user_records_command;
mod user_records_query;
mod user_repository;

#[cfg(test)]
pub use user_records_command::MockUserRecordsCommand;
pub use user_records_command::UserRecordsCommand;
#[cfg(test)]
pub use user_records_query::MockUserRecordsQuery;
pub use user_records_query::UserRecordsQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
