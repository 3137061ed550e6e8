//! Domain model for people and todo items.
//!
//! # Responsibility
//! - Define the entities persisted by the store layer.
//! - Enforce field invariants at construction and mutation time.
//!
//! # Invariants
//! - Every entity gets its identifier from the store, exactly once.
//! - Required text fields are never empty after trimming.

pub mod person;
pub mod todo;
