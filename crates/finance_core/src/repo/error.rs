//! Repository error model.
//!
//! # Responsibility
//! - Give callers semantic errors (`NotFound`, `MissingId`, ...) next to
//!   transport errors from SQLite.
//! - Classify store constraint failures so callers can tell a missing
//!   required value from a dangling or still-referenced foreign key.
//!
//! # Invariants
//! - Constraint failures are reported, never retried or repaired.

use crate::db::DbError;
use crate::model::RecordId;
use rusqlite::{ffi, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Which store rule rejected a write or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// A required column was written as NULL.
    NotNull,
    /// A reference points at a missing row, or a delete would orphan rows.
    ForeignKey,
    Unique,
    Check,
    Other,
}

impl ConstraintKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotNull => "not_null",
            Self::ForeignKey => "foreign_key",
            Self::Unique => "unique",
            Self::Check => "check",
            Self::Other => "other",
        }
    }
}

/// Constraint failure reported by SQLite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub kind: ConstraintKind,
    /// SQLite's own message, e.g. `NOT NULL constraint failed: expense.amount`.
    pub message: String,
}

impl ConstraintViolation {
    /// Returns the classified violation when `error` is a constraint failure.
    pub fn classify(error: &rusqlite::Error) -> Option<Self> {
        let rusqlite::Error::SqliteFailure(failure, message) = error else {
            return None;
        };
        if failure.code != ErrorCode::ConstraintViolation {
            return None;
        }

        let kind = match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                ConstraintKind::Unique
            }
            ffi::SQLITE_CONSTRAINT_CHECK => ConstraintKind::Check,
            _ => ConstraintKind::Other,
        };

        Some(Self {
            kind,
            message: message.clone().unwrap_or_else(|| failure.to_string()),
        })
    }
}

impl Display for ConstraintViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind.as_str())
    }
}

/// Error for every repository operation.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error that is not a constraint failure.
    Db(DbError),
    /// The store rejected the statement.
    Constraint(ConstraintViolation),
    /// No row with this id exists in the entity table.
    NotFound { entity: &'static str, id: RecordId },
    /// Operation needs a persisted record but the record has no id.
    MissingId(&'static str),
    /// A relationship points at a record that was never saved.
    UnsavedReference {
        entity: &'static str,
        field: &'static str,
    },
    /// A value cannot be written to or read back from the store as is.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
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

impl RepoError {
    /// Returns the constraint kind when the store rejected the statement.
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            Self::Constraint(violation) => Some(violation.kind),
            _ => None,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Constraint(violation) => write!(f, "constraint violation: {violation}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::MissingId(entity) => write!(f, "{entity} has no id; save it first"),
            Self::UnsavedReference { entity, field } => write!(
                f,
                "{entity}.{field} references a record that has not been saved"
            ),
            Self::InvalidData(message) => write!(f, "invalid data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Constraint(_) => None,
            Self::NotFound { .. } => None,
            Self::MissingId(_) => None,
            Self::UnsavedReference { .. } => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        match ConstraintViolation::classify(&value) {
            Some(violation) => Self::Constraint(violation),
            None => Self::Db(DbError::Sqlite(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConstraintKind, ConstraintViolation, RepoError};
    use rusqlite::Connection;

    fn scratch() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parent (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE);
             CREATE TABLE child (
                id INTEGER PRIMARY KEY,
                parent_id INTEGER NOT NULL REFERENCES parent(id),
                qty INTEGER CHECK (qty > 0)
             );
             INSERT INTO parent (id, name) VALUES (1, 'p');",
        )
        .unwrap();
        conn
    }

    fn kind_of(result: rusqlite::Result<usize>) -> Option<ConstraintKind> {
        let err = result.unwrap_err();
        ConstraintViolation::classify(&err).map(|violation| violation.kind)
    }

    #[test]
    fn classifies_sqlite_constraint_failures() {
        let conn = scratch();

        assert_eq!(
            kind_of(conn.execute("INSERT INTO parent (name) VALUES (NULL)", [])),
            Some(ConstraintKind::NotNull)
        );
        assert_eq!(
            kind_of(conn.execute("INSERT INTO parent (name) VALUES ('p')", [])),
            Some(ConstraintKind::Unique)
        );
        assert_eq!(
            kind_of(conn.execute("INSERT INTO child (parent_id) VALUES (99)", [])),
            Some(ConstraintKind::ForeignKey)
        );
        assert_eq!(
            kind_of(conn.execute("INSERT INTO child (parent_id, qty) VALUES (1, 0)", [])),
            Some(ConstraintKind::Check)
        );
    }

    #[test]
    fn non_constraint_errors_stay_db_errors() {
        let conn = scratch();
        let err = conn.execute("SELECT * FROM missing_table", []).unwrap_err();
        assert!(ConstraintViolation::classify(&err).is_none());
        assert!(matches!(RepoError::from(err), RepoError::Db(_)));
    }

    #[test]
    fn display_includes_store_message_and_kind() {
        let conn = scratch();
        let err = conn
            .execute("INSERT INTO parent (name) VALUES (NULL)", [])
            .unwrap_err();
        let repo_err = RepoError::from(err);
        assert_eq!(repo_err.constraint_kind(), Some(ConstraintKind::NotNull));
        let rendered = repo_err.to_string();
        assert!(rendered.contains("NOT NULL constraint failed: parent.name"));
        assert!(rendered.contains("not_null"));
    }
}
