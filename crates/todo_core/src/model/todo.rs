//! Todo item domain model.
//!
//! # Responsibility
//! - Hold the title, optional details and completion state of one task.
//! - Carry the full assignee `Person` when the task is assigned.
//!
//! # Invariants
//! - `title` is non-empty after trimming.
//! - A todo without a deadline is never overdue.
//! - `id` is `None` until the store assigns one on creation.

use crate::model::person::Person;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier of a persisted todo item.
pub type TodoId = i64;

/// Validation errors for todo construction and mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoValidationError {
    EmptyTitle,
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title can't be empty"),
        }
    }
}

impl Error for TodoValidationError {}

/// One task on the todo list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TodoWire")]
pub struct Todo {
    id: Option<TodoId>,
    title: String,
    description: Option<String>,
    deadline: Option<NaiveDate>,
    done: bool,
    assignee: Option<Person>,
}

#[derive(Deserialize)]
struct TodoWire {
    id: Option<TodoId>,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    deadline: Option<NaiveDate>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    assignee: Option<Person>,
}

impl TryFrom<TodoWire> for Todo {
    type Error = TodoValidationError;

    fn try_from(value: TodoWire) -> Result<Self, Self::Error> {
        validate_title(&value.title)?;
        Ok(Self {
            id: value.id,
            title: value.title,
            description: value.description,
            deadline: value.deadline,
            done: value.done,
            assignee: value.assignee,
        })
    }
}

impl Todo {
    /// Creates an unpersisted, unassigned, not-done todo with no deadline.
    ///
    /// # Errors
    /// - Returns `EmptyTitle` when `title` is empty or whitespace only.
    pub fn new(title: impl Into<String>) -> Result<Self, TodoValidationError> {
        let title = title.into();
        validate_title(&title)?;
        Ok(Self {
            id: None,
            title,
            description: None,
            deadline: None,
            done: false,
            assignee: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_assignee(mut self, assignee: Person) -> Self {
        self.assignee = Some(assignee);
        self
    }

    pub fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }

    pub fn id(&self) -> Option<TodoId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn assignee(&self) -> Option<&Person> {
        self.assignee.as_ref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), TodoValidationError> {
        let title = title.into();
        validate_title(&title)?;
        self.title = title;
        Ok(())
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_deadline(&mut self, deadline: Option<NaiveDate>) {
        self.deadline = deadline;
    }

    pub fn set_done(&mut self, done: bool) {
        self.done = done;
    }

    pub fn assign(&mut self, assignee: Person) {
        self.assignee = Some(assignee);
    }

    /// Clears the assignee and returns the previous one.
    pub fn unassign(&mut self) -> Option<Person> {
        self.assignee.take()
    }

    /// Returns whether the deadline has passed as of the local calendar date.
    pub fn is_overdue(&self) -> bool {
        self.is_overdue_on(Local::now().date_naive())
    }

    /// Returns whether `today` is strictly after the deadline.
    ///
    /// Always `false` when no deadline is set.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.deadline.is_some_and(|deadline| today > deadline)
    }

    pub(crate) fn assign_id(&mut self, id: TodoId) {
        self.id = Some(id);
    }

    pub(crate) fn from_row_parts(
        id: TodoId,
        title: String,
        description: Option<String>,
        deadline: Option<NaiveDate>,
        done: bool,
        assignee: Option<Person>,
    ) -> Result<Self, TodoValidationError> {
        validate_title(&title)?;
        Ok(Self {
            id: Some(id),
            title,
            description,
            deadline,
            done,
            assignee,
        })
    }
}

impl Display for Todo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = self
            .id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        let deadline = self
            .deadline
            .map_or_else(|| "none".to_string(), |date| date.to_string());
        write!(
            f,
            "TodoItemInfo {{id: {id}, title: {}, taskDescription: {}, deadline: {deadline}, done: {}, ",
            self.title,
            self.description.as_deref().unwrap_or("none"),
            self.done
        )?;
        match &self.assignee {
            Some(person) => write!(f, "assigned to: {}}}", person.full_name()),
            None => write!(f, "task not assigned}}"),
        }
    }
}

fn validate_title(title: &str) -> Result<(), TodoValidationError> {
    if title.trim().is_empty() {
        return Err(TodoValidationError::EmptyTitle);
    }
    Ok(())
}
