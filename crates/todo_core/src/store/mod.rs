//! Store contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the CRUD contract shared by every entity store.
//! - Isolate SQL details from callers.
//!
//! # Invariants
//! - Lookups that match nothing return `None` or an empty `Vec`, never an error.
//! - Update/delete that affect zero rows are soft failures: the transaction is
//!   rolled back and the caller gets the unchanged input or `false`.
//! - Transactions are RAII guards, so a connection always leaves a store call
//!   in auto-commit mode.

pub mod people_store;
pub mod todo_store;

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::person::PersonValidationError;
use crate::model::todo::TodoValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for store persistence and query operations.
#[derive(Debug)]
pub enum StoreError {
    /// A statement failed; `operation` names the call and its parameters.
    Query {
        operation: String,
        source: rusqlite::Error,
    },
    NoRowsAffected {
        table: &'static str,
    },
    MissingGeneratedKey {
        table: &'static str,
    },
    /// A todo references a person that was never persisted.
    UnsavedAssignee,
    /// A persisted row violates an entity invariant.
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query { operation, source } => write!(f, "{operation} failed: {source}"),
            Self::NoRowsAffected { table } => {
                write!(f, "insert into {table} failed, no rows affected")
            }
            Self::MissingGeneratedKey { table } => {
                write!(f, "insert into {table} did not generate a key")
            }
            Self::UnsavedAssignee => write!(f, "assignee must be persisted before use"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Query { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<PersonValidationError> for StoreError {
    fn from(value: PersonValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

impl From<TodoValidationError> for StoreError {
    fn from(value: TodoValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Attaches the failing operation to raw driver errors.
pub(crate) trait QueryContext<T> {
    fn in_operation<F>(self, operation: F) -> StoreResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> QueryContext<T> for rusqlite::Result<T> {
    fn in_operation<F>(self, operation: F) -> StoreResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|source| StoreError::Query {
            operation: operation(),
            source,
        })
    }
}

/// CRUD contract shared by every entity store.
pub trait Store<T> {
    type Id;

    /// Inserts `entity` and returns it carrying the generated id.
    fn create(&self, entity: T) -> StoreResult<T>;
    fn find_all(&self) -> StoreResult<Vec<T>>;
    fn find_by_id(&self, id: Self::Id) -> StoreResult<Option<T>>;
    /// Rewrites the row matching `entity`'s id.
    ///
    /// Returns `entity` unchanged when no row matches.
    fn update(&self, entity: T) -> StoreResult<T>;
    /// Returns `true` when a row was removed.
    fn delete_by_id(&self, id: Self::Id) -> StoreResult<bool>;
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version =
        current_user_version(conn).in_operation(|| "read schema version".to_string())?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, table)? {
        return Err(StoreError::MissingRequiredTable(table));
    }

    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(StoreError::MissingRequiredColumn { table, column });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )
        .in_operation(|| format!("check table {table}"))?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let operation = || format!("inspect columns of {table}");
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .in_operation(operation)?;
    let mut rows = stmt.query([]).in_operation(operation)?;
    while let Some(row) = rows.next().in_operation(operation)? {
        let current: String = row.get(1).in_operation(operation)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
