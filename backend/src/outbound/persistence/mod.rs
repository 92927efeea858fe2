//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Implements the `UserRepository` port over `diesel-async` with `bb8`
//! pooling. Row structs (`models.rs`) and table definitions (`schema.rs`)
//! are internal; only the repository, the pool and the migration entry point
//! are exported.
//!
//! # Example
//!
//! ```no_run
//! use user_api::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/users")).await?;
//! let repo = DieselUserRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
