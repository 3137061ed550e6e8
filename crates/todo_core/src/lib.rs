//! Data-access core for the todo_it application.
//! Owns the person/todo entities, their SQLite stores and connection setup.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod store;

pub use config::{ConfigError, StoreConfig};
pub use db::{open_db, open_db_in_memory, ConnectionError, ConnectionProvider};
pub use logging::{default_log_level, init_logging, init_logging_from_config, LoggingError};
pub use model::person::{Person, PersonId, PersonValidationError};
pub use model::todo::{Todo, TodoId, TodoValidationError};
pub use store::people_store::{PeopleStore, SqlitePeopleStore};
pub use store::todo_store::{SqliteTodoStore, TodoStore};
pub use store::{Store, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
