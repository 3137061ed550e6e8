//! CLI smoke entry point.
//!
//! Loads configuration (optional TOML path as the first argument, then
//! `TODO_IT_*` environment overrides), opens the store and prints a summary.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;
use todo_core::{
    core_version, init_logging_from_config, ConnectionProvider, PeopleStore, SqlitePeopleStore,
    SqliteTodoStore, Store, StoreConfig, TodoStore,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("todo_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = StoreConfig::load(config_path.as_deref())?;

    if config.log_dir.is_some() {
        init_logging_from_config(&config)?;
    }

    let provider = ConnectionProvider::new(config);
    let conn = provider.connect()?;
    let people = SqlitePeopleStore::try_new(&conn)?;
    let todos = SqliteTodoStore::try_new(&conn)?;

    println!("todo_core version={}", core_version());
    println!("database={}", provider.config().database_path.display());
    println!("people={}", people.find_all()?.len());
    println!("todos={}", todos.find_all()?.len());
    println!("open={}", todos.find_by_done_status(false)?.len());
    println!("unassigned={}", todos.find_by_unassigned_todo_items()?.len());
    log::info!("event=cli_summary module=cli status=ok");

    if let Some(first_name) = first_name_arg(std::env::args_os().nth(2))? {
        for person in people.find_by_name(&first_name)? {
            println!("{person}");
        }
    }

    Ok(())
}

/// Decodes the optional first-name filter; non-UTF-8 input is an error.
fn first_name_arg(raw: Option<OsString>) -> Result<Option<String>, String> {
    raw.map(|raw| {
        raw.into_string()
            .map_err(|raw| format!("first name `{}` is not valid UTF-8", raw.to_string_lossy()))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::first_name_arg;
    use std::ffi::OsString;

    #[test]
    fn first_name_arg_passes_utf8_through() {
        assert_eq!(first_name_arg(None), Ok(None));
        assert_eq!(
            first_name_arg(Some(OsString::from("Ada"))),
            Ok(Some("Ada".to_string()))
        );
    }

    #[cfg(unix)]
    #[test]
    fn first_name_arg_rejects_non_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(vec![b'A', 0xff, b'a']);
        let err = first_name_arg(Some(raw)).unwrap_err();
        assert!(err.contains("not valid UTF-8"), "unexpected: {err}");
    }
}
