use chrono::NaiveDate;
use rusqlite::Connection;
use std::collections::HashSet;
use todo_core::db::open_db_in_memory;
use todo_core::{
    PeopleStore, Person, SqlitePeopleStore, SqliteTodoStore, Store, StoreError, Todo, TodoId,
    TodoStore,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn ids(todos: &[Todo]) -> Vec<TodoId> {
    todos.iter().filter_map(Todo::id).collect()
}

fn todo_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM todo_item;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn ada_lovelace_scenario() {
    let conn = open_db_in_memory().unwrap();
    let people = SqlitePeopleStore::try_new(&conn).unwrap();
    let todos = SqliteTodoStore::try_new(&conn).unwrap();

    let ada = people
        .create(Person::new("Ada", "Lovelace").unwrap())
        .unwrap();
    assert_eq!(ada.id(), Some(1));

    let mut task = todos
        .create(
            Todo::new("Write spec")
                .unwrap()
                .with_deadline(date(2024, 1, 1))
                .with_assignee(ada.clone()),
        )
        .unwrap();
    assert_eq!(task.id(), Some(1));

    assert_eq!(todos.find_by_assignee(1).unwrap(), vec![task.clone()]);
    assert!(todos.find_by_done_status(true).unwrap().is_empty());

    task.set_done(true);
    todos.update(task.clone()).unwrap();

    assert_eq!(todos.find_by_done_status(true).unwrap(), vec![task]);
    assert!(todos.find_by_done_status(false).unwrap().is_empty());
}

#[test]
fn find_by_id_materializes_assignee() {
    let conn = open_db_in_memory().unwrap();
    let people = SqlitePeopleStore::try_new(&conn).unwrap();
    let todos = SqliteTodoStore::try_new(&conn).unwrap();

    let grace = people
        .create(Person::new("Grace", "Hopper").unwrap())
        .unwrap();
    let created = todos
        .create(
            Todo::new("Debug relay")
                .unwrap()
                .with_description("moth in panel F")
                .with_assignee(grace.clone()),
        )
        .unwrap();

    let loaded = todos.find_by_id(created.id().unwrap()).unwrap().unwrap();
    assert_eq!(loaded.assignee(), Some(&grace));
    assert_eq!(loaded.description(), Some("moth in panel F"));
    assert_eq!(loaded.deadline(), None);
    assert_eq!(loaded, created);
}

#[test]
fn find_by_id_on_missing_row_is_none() {
    let conn = open_db_in_memory().unwrap();
    let todos = SqliteTodoStore::try_new(&conn).unwrap();

    assert!(todos.find_by_id(12).unwrap().is_none());
}

#[test]
fn unassigned_set_is_disjoint_from_every_assignee_set() {
    let conn = open_db_in_memory().unwrap();
    let people = SqlitePeopleStore::try_new(&conn).unwrap();
    let todos = SqliteTodoStore::try_new(&conn).unwrap();

    let ada = people
        .create(Person::new("Ada", "Lovelace").unwrap())
        .unwrap();
    let alan = people
        .create(Person::new("Alan", "Turing").unwrap())
        .unwrap();

    let mut unassigned_ids = HashSet::new();
    for (index, assignee) in [Some(&ada), None, Some(&alan), None, Some(&ada)]
        .into_iter()
        .enumerate()
    {
        let mut todo = Todo::new(format!("task {index}")).unwrap();
        if let Some(person) = assignee {
            todo.assign(person.clone());
        }
        let created = todos.create(todo).unwrap();
        if assignee.is_none() {
            unassigned_ids.insert(created.id().unwrap());
        }
    }

    let unassigned = todos.find_by_unassigned_todo_items().unwrap();
    assert!(unassigned.iter().all(|todo| todo.assignee().is_none()));
    let found: HashSet<TodoId> = ids(&unassigned).into_iter().collect();
    assert_eq!(found, unassigned_ids);

    let mut assigned_ids = HashSet::new();
    for person in people.find_all().unwrap() {
        assigned_ids.extend(ids(&todos.find_by_assignee_person(&person).unwrap()));
    }
    assert!(found.is_disjoint(&assigned_ids));
    assert_eq!(found.len() + assigned_ids.len(), todos.find_all().unwrap().len());
}

#[test]
fn find_by_assignee_person_without_id_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let todos = SqliteTodoStore::try_new(&conn).unwrap();
    todos.create(Todo::new("loose end").unwrap()).unwrap();

    let draft = Person::new("Draft", "Person").unwrap();
    assert!(todos.find_by_assignee_person(&draft).unwrap().is_empty());
}

#[test]
fn create_rejects_unsaved_assignee() {
    let conn = open_db_in_memory().unwrap();
    let todos = SqliteTodoStore::try_new(&conn).unwrap();

    let draft = Person::new("Draft", "Person").unwrap();
    let err = todos
        .create(Todo::new("orphan").unwrap().with_assignee(draft))
        .unwrap_err();

    assert!(matches!(err, StoreError::UnsavedAssignee));
    assert_eq!(todo_count(&conn), 0);
}

#[test]
fn create_with_unknown_assignee_fails_on_foreign_key() {
    let conn = open_db_in_memory().unwrap();
    let todos = SqliteTodoStore::try_new(&conn).unwrap();

    let stranger = Person::with_id(77, "Stranger", "Danger").unwrap();
    let err = todos
        .create(Todo::new("orphan").unwrap().with_assignee(stranger))
        .unwrap_err();

    match err {
        StoreError::Query { operation, .. } => assert_eq!(operation, "todo_item.create"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn update_supports_clearing_deadline_and_assignee() {
    let conn = open_db_in_memory().unwrap();
    let people = SqlitePeopleStore::try_new(&conn).unwrap();
    let todos = SqliteTodoStore::try_new(&conn).unwrap();

    let ada = people
        .create(Person::new("Ada", "Lovelace").unwrap())
        .unwrap();
    let mut todo = todos
        .create(
            Todo::new("Draft notes")
                .unwrap()
                .with_deadline(date(2024, 6, 1))
                .with_assignee(ada),
        )
        .unwrap();

    todo.set_deadline(None);
    todo.unassign();
    todo.set_description(Some("no rush".to_string()));
    todos.update(todo.clone()).unwrap();

    let loaded = todos.find_by_id(todo.id().unwrap()).unwrap().unwrap();
    assert_eq!(loaded.deadline(), None);
    assert!(loaded.assignee().is_none());
    assert_eq!(loaded.description(), Some("no rush"));
    let unassigned = todos.find_by_unassigned_todo_items().unwrap();
    assert_eq!(ids(&unassigned), vec![todo.id().unwrap()]);
}

#[test]
fn update_on_missing_row_returns_input_without_touching_other_rows() {
    let conn = open_db_in_memory().unwrap();
    let todos = SqliteTodoStore::try_new(&conn).unwrap();
    let kept = todos.create(Todo::new("keep me").unwrap()).unwrap();

    let mut ghost = todos.create(Todo::new("ghost").unwrap()).unwrap();
    assert!(todos.delete_by_id(ghost.id().unwrap()).unwrap());
    ghost.set_title("renamed ghost").unwrap();

    let returned = todos.update(ghost.clone()).unwrap();
    assert_eq!(returned, ghost);
    assert_eq!(todos.find_all().unwrap(), vec![kept]);
    assert!(conn.is_autocommit());
}

#[test]
fn delete_by_id_on_missing_row_is_false_and_table_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let todos = SqliteTodoStore::try_new(&conn).unwrap();
    todos.create(Todo::new("one").unwrap()).unwrap();

    assert!(!todos.delete_by_id(999).unwrap());
    assert_eq!(todo_count(&conn), 1);
    assert!(conn.is_autocommit());
}

#[test]
fn deleting_person_unassigns_their_todos() {
    let conn = open_db_in_memory().unwrap();
    let people = SqlitePeopleStore::try_new(&conn).unwrap();
    let todos = SqliteTodoStore::try_new(&conn).unwrap();

    let alan = people
        .create(Person::new("Alan", "Turing").unwrap())
        .unwrap();
    let todo = todos
        .create(Todo::new("Break Enigma").unwrap().with_assignee(alan.clone()))
        .unwrap();

    assert!(people.delete_by_id(alan.id().unwrap()).unwrap());

    let loaded = todos.find_by_id(todo.id().unwrap()).unwrap().unwrap();
    assert!(loaded.assignee().is_none());
    assert!(todos.find_by_assignee(alan.id().unwrap()).unwrap().is_empty());
    assert_eq!(todos.find_by_unassigned_todo_items().unwrap().len(), 1);
    assert!(people.find_by_name("Alan").unwrap().is_empty());
}

#[test]
fn invalid_done_value_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO todo_item (title, done) VALUES ('odd', 0);", [])
        .unwrap();
    conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
        .unwrap();
    conn.execute("UPDATE todo_item SET done = 7;", []).unwrap();
    let todos = SqliteTodoStore::try_new(&conn).unwrap();

    let err = todos.find_all().unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)), "unexpected: {err}");
}
