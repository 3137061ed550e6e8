//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by store behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have a busy timeout set.
//! - Returned connections have migrations fully applied.

use super::migrations::{apply_migrations, MigrationError};
use super::{ConnectionError, ConnectionResult};
use crate::config::{StoreConfig, DEFAULT_BUSY_TIMEOUT_MS};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS);
const MEMORY_TARGET: &str = ":memory:";

/// Hands out fresh connections for a fixed configuration.
///
/// No pooling and no retry: each `connect` call opens a new connection,
/// and the caller owns it until drop.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    config: StoreConfig,
}

impl ConnectionProvider {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Opens a new connection to the configured database.
    ///
    /// # Errors
    /// - `ConnectionError::InvalidConfig` for an empty path or zero timeout.
    /// - `ConnectionError::Open` when the file cannot be opened.
    /// - `ConnectionError::Bootstrap` when pragmas or migrations fail.
    pub fn connect(&self) -> ConnectionResult<Connection> {
        // SQLite opens a private temporary database for an empty path.
        if let Err(err) = self.config.validate() {
            error!(
                "event=db_open module=db status=error mode=file error_code=invalid_config error={}",
                err
            );
            return Err(ConnectionError::InvalidConfig(err));
        }
        open_db_with_timeout(&self.config.database_path, self.config.busy_timeout())
    }
}

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> ConnectionResult<Connection> {
    open_db_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
}

/// Same as [`open_db`] with an explicit busy timeout.
pub fn open_db_with_timeout(
    path: impl AsRef<Path>,
    busy_timeout: Duration,
) -> ConnectionResult<Connection> {
    let path = path.as_ref();
    let target = path.display().to_string();
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(ConnectionError::Open {
                target,
                source: err,
            });
        }
    };

    finish_open(conn, target, "file", busy_timeout, started_at)
}

/// Opens an in-memory SQLite database and applies all pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> ConnectionResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let conn = match Connection::open_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=memory duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(ConnectionError::Open {
                target: MEMORY_TARGET.to_string(),
                source: err,
            });
        }
    };

    finish_open(
        conn,
        MEMORY_TARGET.to_string(),
        "memory",
        DEFAULT_BUSY_TIMEOUT,
        started_at,
    )
}

fn finish_open(
    mut conn: Connection,
    target: String,
    mode: &str,
    busy_timeout: Duration,
    started_at: Instant,
) -> ConnectionResult<Connection> {
    match bootstrap_connection(&mut conn, &target, busy_timeout) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(
    conn: &mut Connection,
    target: &str,
    busy_timeout: Duration,
) -> ConnectionResult<()> {
    let bootstrap_err = |source: rusqlite::Error| ConnectionError::Bootstrap {
        target: target.to_string(),
        source,
    };

    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(bootstrap_err)?;
    conn.busy_timeout(busy_timeout).map_err(bootstrap_err)?;
    apply_migrations(conn).map_err(|err| match err {
        MigrationError::Sqlite(source) => bootstrap_err(source),
        MigrationError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => ConnectionError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        },
    })?;
    Ok(())
}
