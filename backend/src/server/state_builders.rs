//! Builders wiring a user repository into the HTTP handler state.

use std::sync::Arc;

use actix_web::web;
use mockable::Clock;
use tracing::info;

use user_api::domain::UserRecordsService;
use user_api::domain::ports::UserRepository;
use user_api::inbound::http::state::HttpState;
use user_api::outbound::memory::InMemoryUserRepository;
use user_api::outbound::persistence::DieselUserRepository;

use super::ServerConfig;

fn state_for<R>(repository: R, clock: Arc<dyn Clock>) -> web::Data<HttpState>
where
    R: UserRepository + 'static,
{
    let service = Arc::new(UserRecordsService::new(Arc::new(repository), clock));
    web::Data::new(HttpState::new(service.clone(), service))
}

/// Build handler state over PostgreSQL when a pool is configured, otherwise
/// over a fresh in-memory store.
pub(super) fn build_http_state(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> web::Data<HttpState> {
    match &config.db_pool {
        Some(pool) => {
            info!(store = "postgres", "user repository configured");
            state_for(DieselUserRepository::new(pool.clone()), clock)
        }
        None => {
            info!(store = "memory", "user repository configured");
            state_for(InMemoryUserRepository::default(), clock)
        }
    }
}
