//! Outbound adapters implementing the `UserRepository` port.
//!
//! - **persistence**: PostgreSQL via Diesel, used when a database URL is
//!   configured.
//! - **memory**: a process-local map with the same semantics, used otherwise
//!   and in tests.
//!
//! Adapters translate between domain types and storage representations and
//! hold no business rules beyond what the store itself enforces.

pub mod memory;
pub mod persistence;
