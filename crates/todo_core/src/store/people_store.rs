//! Person store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD plus first-name lookup over the `person` table.
//!
//! # Invariants
//! - `create` returns the person carrying the store-generated id.
//! - `update`/`delete_by_id` run inside one transaction each and roll back
//!   when no row matches.
//! - Rows are validated on read; a blank persisted name is `InvalidData`.

use crate::model::person::{Person, PersonId};
use crate::store::{ensure_connection_ready, QueryContext, Store, StoreError, StoreResult};
use log::{debug, info, warn};
use rusqlite::{params, Connection, Row};

const TABLE: &str = "person";
const COLUMNS: &[&str] = &["person_id", "first_name", "last_name"];

const PERSON_SELECT_SQL: &str = "SELECT
    person_id,
    first_name,
    last_name
FROM person";

/// Store contract for people.
pub trait PeopleStore: Store<Person, Id = PersonId> {
    /// Exact match on first name only.
    fn find_by_name(&self, first_name: &str) -> StoreResult<Vec<Person>>;
}

/// SQLite-backed person store borrowing one connection.
pub struct SqlitePeopleStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePeopleStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn, TABLE, COLUMNS)?;
        Ok(Self { conn })
    }

    fn query_people(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        operation: &dyn Fn() -> String,
    ) -> StoreResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(sql).in_operation(operation)?;
        let mut rows = stmt.query(params).in_operation(operation)?;
        let mut people = Vec::new();
        while let Some(row) = rows.next().in_operation(operation)? {
            people.push(parse_person_row(row)?);
        }
        Ok(people)
    }
}

impl Store<Person> for SqlitePeopleStore<'_> {
    type Id = PersonId;

    fn create(&self, mut person: Person) -> StoreResult<Person> {
        let operation = || "person.create".to_string();
        let inserted = self
            .conn
            .execute(
                "INSERT INTO person (first_name, last_name) VALUES (?1, ?2);",
                params![person.first_name(), person.last_name()],
            )
            .in_operation(operation)?;

        if inserted == 0 {
            return Err(StoreError::NoRowsAffected { table: TABLE });
        }

        let id = self.conn.last_insert_rowid();
        if id == 0 {
            return Err(StoreError::MissingGeneratedKey { table: TABLE });
        }

        person.assign_id(id);
        info!("event=person_create module=store status=ok person_id={id}");
        Ok(person)
    }

    fn find_all(&self) -> StoreResult<Vec<Person>> {
        self.query_people(
            &format!("{PERSON_SELECT_SQL} ORDER BY person_id ASC;"),
            params![],
            &|| "person.find_all".to_string(),
        )
    }

    fn find_by_id(&self, id: PersonId) -> StoreResult<Option<Person>> {
        let operation = || format!("person.find_by_id id={id}");
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE person_id = ?1;"))
            .in_operation(operation)?;

        let mut rows = stmt.query([id]).in_operation(operation)?;
        if let Some(row) = rows.next().in_operation(operation)? {
            return Ok(Some(parse_person_row(row)?));
        }

        debug!("event=person_find_by_id module=store status=not_found person_id={id}");
        Ok(None)
    }

    fn update(&self, person: Person) -> StoreResult<Person> {
        let Some(id) = person.id() else {
            warn!("event=person_update module=store status=skipped reason=unsaved");
            return Ok(person);
        };
        let operation = || format!("person.update id={id}");

        let tx = self.conn.unchecked_transaction().in_operation(operation)?;
        let changed = tx
            .execute(
                "UPDATE person
                 SET
                    first_name = ?1,
                    last_name = ?2
                 WHERE person_id = ?3;",
                params![person.first_name(), person.last_name(), id],
            )
            .in_operation(operation)?;

        if changed == 0 {
            tx.rollback().in_operation(operation)?;
            warn!("event=person_update module=store status=not_found person_id={id}");
            return Ok(person);
        }

        tx.commit().in_operation(operation)?;
        info!("event=person_update module=store status=ok person_id={id}");
        Ok(person)
    }

    fn delete_by_id(&self, id: PersonId) -> StoreResult<bool> {
        let operation = || format!("person.delete_by_id id={id}");

        let tx = self.conn.unchecked_transaction().in_operation(operation)?;
        let deleted = tx
            .execute("DELETE FROM person WHERE person_id = ?1;", [id])
            .in_operation(operation)?;

        if deleted == 0 {
            tx.rollback().in_operation(operation)?;
            debug!("event=person_delete module=store status=not_found person_id={id}");
            return Ok(false);
        }

        tx.commit().in_operation(operation)?;
        info!("event=person_delete module=store status=ok person_id={id}");
        Ok(true)
    }
}

impl PeopleStore for SqlitePeopleStore<'_> {
    fn find_by_name(&self, first_name: &str) -> StoreResult<Vec<Person>> {
        self.query_people(
            &format!("{PERSON_SELECT_SQL} WHERE first_name = ?1 ORDER BY person_id ASC;"),
            [first_name],
            &|| format!("person.find_by_name name={first_name}"),
        )
    }
}

fn parse_person_row(row: &Row<'_>) -> StoreResult<Person> {
    let operation = || "person row decode".to_string();
    let id: PersonId = row.get("person_id").in_operation(operation)?;
    let first_name: String = row.get("first_name").in_operation(operation)?;
    let last_name: String = row.get("last_name").in_operation(operation)?;

    Person::with_id(id, first_name, last_name)
        .map_err(|err| StoreError::InvalidData(format!("person {id}: {err}")))
}
