//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` so they depend only on
//! the driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{UserRecordsCommand, UserRecordsQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Create, update and delete use-cases.
    pub users: Arc<dyn UserRecordsCommand>,
    /// Read and list use-cases.
    pub users_query: Arc<dyn UserRecordsQuery>,
}

impl HttpState {
    /// Bundle the user record ports.
    pub fn new(users: Arc<dyn UserRecordsCommand>, users_query: Arc<dyn UserRecordsQuery>) -> Self {
        Self { users, users_query }
    }
}
