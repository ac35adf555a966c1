//! Repository layer: mapping metadata, generic CRUD and error model.
//!
//! # Responsibility
//! - Expose one CRUD contract for every finance record.
//! - Isolate SQLite query details from callers.
//!
//! # Invariants
//! - Required columns and referential integrity are enforced by the store;
//!   repositories surface those failures as `RepoError::Constraint`.
//! - Repository APIs return semantic errors (`NotFound`, `MissingId`) in
//!   addition to DB transport errors.

pub mod crud;
pub mod error;
pub mod mapping;
