//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the todo store.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Stores must not read/write application data before migrations succeed.

use crate::config::ConfigError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_with_timeout, ConnectionProvider};

pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Failure to produce a ready-to-use connection.
#[derive(Debug)]
pub enum ConnectionError {
    /// The database file (or in-memory database) could not be opened.
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// Pragmas or migrations failed on a freshly opened connection.
    Bootstrap {
        target: String,
        source: rusqlite::Error,
    },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// The provider's configuration failed validation.
    InvalidConfig(ConfigError),
}

impl Display for ConnectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => {
                write!(f, "failed to connect to database `{target}`: {source}")
            }
            Self::Bootstrap { target, source } => {
                write!(f, "failed to prepare database `{target}`: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidConfig(err) => write!(f, "refusing to connect: {err}"),
        }
    }
}

impl Error for ConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Bootstrap { source, .. } => Some(source),
            Self::InvalidConfig(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}
