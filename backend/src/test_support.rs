//! Test utilities shared by unit tests (in `src/`) and integration tests
//! (in `tests/`).
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature, which the
//! crate's own dev-dependency entry switches on for integration tests.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::UserRecordsService;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryUserRepository;

/// Clock pinned to an instant that tests move forward explicitly.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Pin the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by `seconds`.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// HTTP state over a fresh in-memory store driven by `clock`.
pub fn in_memory_state(clock: Arc<dyn Clock>) -> HttpState {
    let service = Arc::new(UserRecordsService::new(
        Arc::new(InMemoryUserRepository::default()),
        clock,
    ));
    HttpState::new(service.clone(), service)
}
