//! Person domain model.
//!
//! # Responsibility
//! - Hold the name fields of someone who can be assigned todo items.
//! - Reject blank names at every entry point (constructors, setters, serde).
//!
//! # Invariants
//! - `first_name` and `last_name` are non-empty after trimming.
//! - `id` is `None` until the store assigns one on creation.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier of a persisted person.
pub type PersonId = i64;

/// Validation errors for person construction and mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonValidationError {
    EmptyFirstName,
    EmptyLastName,
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFirstName => write!(f, "first name can't be empty"),
            Self::EmptyLastName => write!(f, "last name can't be empty"),
        }
    }
}

impl Error for PersonValidationError {}

/// Someone who can be assigned todo items.
///
/// Equality and hashing cover id and both name fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PersonWire")]
pub struct Person {
    id: Option<PersonId>,
    first_name: String,
    last_name: String,
}

#[derive(Deserialize)]
struct PersonWire {
    id: Option<PersonId>,
    first_name: String,
    last_name: String,
}

impl TryFrom<PersonWire> for Person {
    type Error = PersonValidationError;

    fn try_from(value: PersonWire) -> Result<Self, Self::Error> {
        let mut person = Self::new(value.first_name, value.last_name)?;
        person.id = value.id;
        Ok(person)
    }
}

impl Person {
    /// Creates an unpersisted person.
    ///
    /// # Errors
    /// - Returns an error when either name is empty or whitespace only.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Result<Self, PersonValidationError> {
        let first_name = first_name.into();
        let last_name = last_name.into();
        validate_first_name(&first_name)?;
        validate_last_name(&last_name)?;
        Ok(Self {
            id: None,
            first_name,
            last_name,
        })
    }

    /// Creates a person that already carries a store identifier.
    ///
    /// Used when materializing rows read back from the database.
    pub fn with_id(
        id: PersonId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Result<Self, PersonValidationError> {
        let mut person = Self::new(first_name, last_name)?;
        person.id = Some(id);
        Ok(person)
    }

    pub fn id(&self) -> Option<PersonId> {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn set_first_name(
        &mut self,
        first_name: impl Into<String>,
    ) -> Result<(), PersonValidationError> {
        let first_name = first_name.into();
        validate_first_name(&first_name)?;
        self.first_name = first_name;
        Ok(())
    }

    pub fn set_last_name(
        &mut self,
        last_name: impl Into<String>,
    ) -> Result<(), PersonValidationError> {
        let last_name = last_name.into();
        validate_last_name(&last_name)?;
        self.last_name = last_name;
        Ok(())
    }

    /// Returns `"<first> <last>"`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub(crate) fn assign_id(&mut self, id: PersonId) {
        self.id = Some(id);
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "PersonInfo {{id: {id}, name: {}}}", self.full_name()),
            None => write!(f, "PersonInfo {{id: -, name: {}}}", self.full_name()),
        }
    }
}

fn validate_first_name(value: &str) -> Result<(), PersonValidationError> {
    if value.trim().is_empty() {
        return Err(PersonValidationError::EmptyFirstName);
    }
    Ok(())
}

fn validate_last_name(value: &str) -> Result<(), PersonValidationError> {
    if value.trim().is_empty() {
        return Err(PersonValidationError::EmptyLastName);
    }
    Ok(())
}
