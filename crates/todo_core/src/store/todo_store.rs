//! Todo item store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD plus done-status and assignee lookups over `todo_item`.
//! - Materialize the full assignee `Person` for every assigned row.
//!
//! # Invariants
//! - `deadline` and `assignee_id` are nullable on both insert and update.
//! - An assignee must already be persisted (`id` set) before it is written.
//! - Deleting a person nulls out `assignee_id` (`ON DELETE SET NULL`).
//!
//! # Performance
//! Assignees are resolved with one `person` lookup per assigned row (N+1).
//! Fine for a personal todo list; there is no batch join.

use crate::model::person::{Person, PersonId};
use crate::model::todo::{Todo, TodoId};
use crate::store::people_store::SqlitePeopleStore;
use crate::store::{
    bool_to_int, ensure_connection_ready, QueryContext, Store, StoreError, StoreResult,
};
use chrono::NaiveDate;
use log::{debug, info, warn};
use rusqlite::{params, Connection, Row};

const TABLE: &str = "todo_item";
const COLUMNS: &[&str] = &[
    "todo_id",
    "title",
    "description",
    "deadline",
    "done",
    "assignee_id",
];

const TODO_SELECT_SQL: &str = "SELECT
    todo_id,
    title,
    description,
    deadline,
    done,
    assignee_id
FROM todo_item";

/// Store contract for todo items.
pub trait TodoStore: Store<Todo, Id = TodoId> {
    fn find_by_done_status(&self, done: bool) -> StoreResult<Vec<Todo>>;
    fn find_by_assignee(&self, person_id: PersonId) -> StoreResult<Vec<Todo>>;
    /// Todos assigned to `person`; empty when `person` was never persisted.
    fn find_by_assignee_person(&self, person: &Person) -> StoreResult<Vec<Todo>>;
    /// Todos whose assignee is absent.
    fn find_by_unassigned_todo_items(&self) -> StoreResult<Vec<Todo>>;
}

/// SQLite-backed todo store; resolves assignees through a person store.
pub struct SqliteTodoStore<'conn> {
    conn: &'conn Connection,
    people: SqlitePeopleStore<'conn>,
}

/// Raw `todo_item` row before the assignee is resolved.
struct TodoRow {
    id: TodoId,
    title: String,
    description: Option<String>,
    deadline: Option<NaiveDate>,
    done: bool,
    assignee_id: Option<PersonId>,
}

impl<'conn> SqliteTodoStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    ///
    /// Validates both `todo_item` and `person`, since rows embed assignees.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let people = SqlitePeopleStore::try_new(conn)?;
        ensure_connection_ready(conn, TABLE, COLUMNS)?;
        Ok(Self { conn, people })
    }

    fn query_todos(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        operation: &dyn Fn() -> String,
    ) -> StoreResult<Vec<Todo>> {
        let raw_rows = {
            let mut stmt = self.conn.prepare(sql).in_operation(operation)?;
            let mut rows = stmt.query(params).in_operation(operation)?;
            let mut raw_rows = Vec::new();
            while let Some(row) = rows.next().in_operation(operation)? {
                raw_rows.push(parse_todo_row(row)?);
            }
            raw_rows
        };

        raw_rows
            .into_iter()
            .map(|raw| self.materialize(raw))
            .collect()
    }

    fn materialize(&self, raw: TodoRow) -> StoreResult<Todo> {
        let assignee = match raw.assignee_id {
            Some(person_id) => {
                let person = self.people.find_by_id(person_id)?;
                if person.is_none() {
                    warn!(
                        "event=todo_assignee_resolve module=store status=dangling todo_id={} person_id={}",
                        raw.id, person_id
                    );
                }
                person
            }
            None => None,
        };

        let id = raw.id;
        Todo::from_row_parts(
            raw.id,
            raw.title,
            raw.description,
            raw.deadline,
            raw.done,
            assignee,
        )
        .map_err(|err| StoreError::InvalidData(format!("todo_item {id}: {err}")))
    }
}

impl Store<Todo> for SqliteTodoStore<'_> {
    type Id = TodoId;

    fn create(&self, mut todo: Todo) -> StoreResult<Todo> {
        let assignee_id = persisted_assignee_id(&todo)?;
        let operation = || "todo_item.create".to_string();

        let inserted = self
            .conn
            .execute(
                "INSERT INTO todo_item (
                    title,
                    description,
                    deadline,
                    done,
                    assignee_id
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    todo.title(),
                    todo.description(),
                    todo.deadline(),
                    bool_to_int(todo.is_done()),
                    assignee_id,
                ],
            )
            .in_operation(operation)?;

        if inserted == 0 {
            return Err(StoreError::NoRowsAffected { table: TABLE });
        }

        let id = self.conn.last_insert_rowid();
        if id == 0 {
            return Err(StoreError::MissingGeneratedKey { table: TABLE });
        }

        todo.assign_id(id);
        info!(
            "event=todo_create module=store status=ok todo_id={id} assigned={}",
            assignee_id.is_some()
        );
        Ok(todo)
    }

    fn find_all(&self) -> StoreResult<Vec<Todo>> {
        self.query_todos(
            &format!("{TODO_SELECT_SQL} ORDER BY todo_id ASC;"),
            params![],
            &|| "todo_item.find_all".to_string(),
        )
    }

    fn find_by_id(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let operation = || format!("todo_item.find_by_id id={id}");
        let mut stmt = self
            .conn
            .prepare(&format!("{TODO_SELECT_SQL} WHERE todo_id = ?1;"))
            .in_operation(operation)?;
        let mut rows = stmt.query([id]).in_operation(operation)?;

        let raw = match rows.next().in_operation(operation)? {
            Some(row) => parse_todo_row(row)?,
            None => {
                debug!("event=todo_find_by_id module=store status=not_found todo_id={id}");
                return Ok(None);
            }
        };

        self.materialize(raw).map(Some)
    }

    fn update(&self, todo: Todo) -> StoreResult<Todo> {
        let Some(id) = todo.id() else {
            warn!("event=todo_update module=store status=skipped reason=unsaved");
            return Ok(todo);
        };
        let assignee_id = persisted_assignee_id(&todo)?;
        let operation = || format!("todo_item.update id={id}");

        let tx = self.conn.unchecked_transaction().in_operation(operation)?;
        let changed = tx
            .execute(
                "UPDATE todo_item
                 SET
                    title = ?1,
                    description = ?2,
                    deadline = ?3,
                    done = ?4,
                    assignee_id = ?5
                 WHERE todo_id = ?6;",
                params![
                    todo.title(),
                    todo.description(),
                    todo.deadline(),
                    bool_to_int(todo.is_done()),
                    assignee_id,
                    id,
                ],
            )
            .in_operation(operation)?;

        if changed == 0 {
            tx.rollback().in_operation(operation)?;
            warn!("event=todo_update module=store status=not_found todo_id={id}");
            return Ok(todo);
        }

        tx.commit().in_operation(operation)?;
        info!("event=todo_update module=store status=ok todo_id={id}");
        Ok(todo)
    }

    fn delete_by_id(&self, id: TodoId) -> StoreResult<bool> {
        let operation = || format!("todo_item.delete_by_id id={id}");

        let tx = self.conn.unchecked_transaction().in_operation(operation)?;
        let deleted = tx
            .execute("DELETE FROM todo_item WHERE todo_id = ?1;", [id])
            .in_operation(operation)?;

        if deleted == 0 {
            tx.rollback().in_operation(operation)?;
            debug!("event=todo_delete module=store status=not_found todo_id={id}");
            return Ok(false);
        }

        tx.commit().in_operation(operation)?;
        info!("event=todo_delete module=store status=ok todo_id={id}");
        Ok(true)
    }
}

impl TodoStore for SqliteTodoStore<'_> {
    fn find_by_done_status(&self, done: bool) -> StoreResult<Vec<Todo>> {
        self.query_todos(
            &format!("{TODO_SELECT_SQL} WHERE done = ?1 ORDER BY todo_id ASC;"),
            [bool_to_int(done)],
            &|| format!("todo_item.find_by_done_status done={done}"),
        )
    }

    fn find_by_assignee(&self, person_id: PersonId) -> StoreResult<Vec<Todo>> {
        self.query_todos(
            &format!("{TODO_SELECT_SQL} WHERE assignee_id = ?1 ORDER BY todo_id ASC;"),
            [person_id],
            &|| format!("todo_item.find_by_assignee assignee_id={person_id}"),
        )
    }

    fn find_by_assignee_person(&self, person: &Person) -> StoreResult<Vec<Todo>> {
        match person.id() {
            Some(person_id) => self.find_by_assignee(person_id),
            None => Ok(Vec::new()),
        }
    }

    fn find_by_unassigned_todo_items(&self) -> StoreResult<Vec<Todo>> {
        self.query_todos(
            &format!("{TODO_SELECT_SQL} WHERE assignee_id IS NULL ORDER BY todo_id ASC;"),
            params![],
            &|| "todo_item.find_by_unassigned_todo_items".to_string(),
        )
    }
}

fn persisted_assignee_id(todo: &Todo) -> StoreResult<Option<PersonId>> {
    match todo.assignee() {
        Some(person) => person.id().map(Some).ok_or(StoreError::UnsavedAssignee),
        None => Ok(None),
    }
}

fn parse_todo_row(row: &Row<'_>) -> StoreResult<TodoRow> {
    let operation = || "todo_item row decode".to_string();
    let id: TodoId = row.get("todo_id").in_operation(operation)?;

    let done = match row.get::<_, i64>("done").in_operation(operation)? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid done value `{other}` in todo_item.done for todo {id}"
            )));
        }
    };

    Ok(TodoRow {
        id,
        title: row.get("title").in_operation(operation)?,
        description: row.get("description").in_operation(operation)?,
        deadline: row.get("deadline").in_operation(operation)?,
        done,
        assignee_id: row.get("assignee_id").in_operation(operation)?,
    })
}
