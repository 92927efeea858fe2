//! Server configuration loaded via OrthoConfig.
//!
//! Values layer CLI flags over `USER_API_*` environment variables over
//! configuration files. Every field is optional; accessors apply defaults.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// Host and port do not resolve to a socket address.
    #[error("invalid bind address {address}: {message}")]
    InvalidBindAddress { address: String, message: String },
    /// The pool would hold no connections.
    #[error("db_max_connections must be at least 1")]
    EmptyPool,
}

/// Runtime settings for the HTTP server and its store.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_API")]
pub struct AppSettings {
    /// Interface to bind, as an IP literal or resolvable host name.
    pub host: Option<String>,
    /// TCP port to bind.
    pub port: Option<u16>,
    /// PostgreSQL URL. Without one the server keeps records in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Seconds to wait for a pooled connection before failing the request.
    pub db_connection_timeout_secs: Option<u64>,
    /// Apply embedded migrations before serving.
    pub run_migrations: Option<bool>,
}

impl AppSettings {
    /// Configured host, falling back to all interfaces.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Configured port, falling back to 3000.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Whether to apply embedded migrations at startup. Defaults to `true`.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    /// Resolve the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddress`] when the host cannot be
    /// resolved.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let address = format!("{}:{}", self.host(), self.port());
        let invalid = |message: String| SettingsError::InvalidBindAddress {
            address: address.clone(),
            message,
        };
        (self.host(), self.port())
            .to_socket_addrs()
            .map_err(|err| invalid(err.to_string()))?
            .next()
            .ok_or_else(|| invalid("no addresses resolved".to_owned()))
    }

    /// Pool configuration when a database URL is set.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::EmptyPool`] when `db_max_connections` is 0.
    pub fn pool_config(&self) -> Result<Option<PoolConfig>, SettingsError> {
        let Some(url) = self.database_url.as_deref() else {
            return Ok(None);
        };
        let max_size = self.db_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS);
        if max_size == 0 {
            return Err(SettingsError::EmptyPool);
        }
        let timeout = Duration::from_secs(
            self.db_connection_timeout_secs
                .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS),
        );
        Ok(Some(
            PoolConfig::new(url)
                .with_max_size(max_size)
                .with_connection_timeout(timeout),
        ))
    }
}
