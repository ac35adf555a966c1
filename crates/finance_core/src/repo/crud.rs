//! Generic CRUD repository contract and its SQLite implementation.
//!
//! # Responsibility
//! - Provide save/find/delete for every mapped record through one contract.
//! - Keep SQL generation inside the persistence boundary.
//!
//! # Invariants
//! - Saving a transient record inserts it; saving an identified record
//!   updates every writable column of that row.
//! - Deletes touch exactly one row and never cascade; the store rejects
//!   deletes that would orphan referencing rows.
//! - Listings are ordered by id ascending.

use crate::db::migrations::{current_user_version, latest_version};
use crate::model::account::Account;
use crate::model::classification::{ExpenseCategory, IncomeSource};
use crate::model::expense::Expense;
use crate::model::income::Income;
use crate::model::RecordId;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::mapping::Entity;
use chrono::Local;
use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::marker::PhantomData;

const PAGE_DEFAULT_LIMIT: u32 = 50;
const PAGE_LIMIT_MAX: u32 = 500;

/// Limit/offset window for paged listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// `None` and `Some(0)` fall back to 50; larger values cap at 500.
    pub limit: Option<u32>,
    pub offset: u32,
}

impl PageRequest {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }

    fn effective_limit(&self) -> u32 {
        match self.limit {
            Some(0) | None => PAGE_DEFAULT_LIMIT,
            Some(value) if value > PAGE_LIMIT_MAX => PAGE_LIMIT_MAX,
            Some(value) => value,
        }
    }
}

/// Create/read/update/delete operations shared by every record type.
pub trait CrudRepository {
    type Entity;

    /// Inserts a transient record or updates an identified one.
    ///
    /// Returns the written copy, carrying its id and any write-time stamps.
    fn save(&self, entity: &Self::Entity) -> RepoResult<Self::Entity>;

    /// Same as [`CrudRepository::save`]; writes reach the store before this
    /// returns, so constraint violations surface here.
    fn save_and_flush(&self, entity: &Self::Entity) -> RepoResult<Self::Entity> {
        self.save(entity)
    }

    /// Saves all records atomically: on any error nothing is written.
    fn save_all(&self, entities: &[Self::Entity]) -> RepoResult<Vec<Self::Entity>>;

    fn find_by_id(&self, id: RecordId) -> RepoResult<Option<Self::Entity>>;
    fn find_all(&self) -> RepoResult<Vec<Self::Entity>>;
    fn find_page(&self, page: &PageRequest) -> RepoResult<Vec<Self::Entity>>;
    fn exists_by_id(&self, id: RecordId) -> RepoResult<bool>;
    fn count(&self) -> RepoResult<u64>;

    /// Deletes the row behind `entity`; transient records yield `MissingId`.
    ///
    /// Stricter than Spring Data's `delete`, which ignores transient or
    /// already-deleted entities: here both are reported as errors.
    fn delete(&self, entity: &Self::Entity) -> RepoResult<()>;
    fn delete_by_id(&self, id: RecordId) -> RepoResult<()>;
}

/// SQLite-backed repository for any mapped record type.
pub struct SqliteRepository<'conn, E: Entity> {
    conn: &'conn Connection,
    _entity: PhantomData<E>,
}

pub type SqliteAccountRepository<'conn> = SqliteRepository<'conn, Account>;
pub type SqliteExpenseCategoryRepository<'conn> = SqliteRepository<'conn, ExpenseCategory>;
pub type SqliteIncomeSourceRepository<'conn> = SqliteRepository<'conn, IncomeSource>;
pub type SqliteExpenseRepository<'conn> = SqliteRepository<'conn, Expense>;
pub type SqliteIncomeRepository<'conn> = SqliteRepository<'conn, Income>;

impl<'conn, E: Entity> SqliteRepository<'conn, E> {
    /// Creates a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not the latest.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the mapped table
    ///   does not match the record layout.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready::<E>(conn)?;
        Ok(Self {
            conn,
            _entity: PhantomData,
        })
    }

    fn find_where(&self, column: &str, value: RecordId) -> RepoResult<Vec<E>> {
        let sql = format!(
            "{} WHERE {column} = ?1 ORDER BY {} ASC;",
            E::SELECT_SQL,
            E::ID_COLUMN
        );
        query_entities(self.conn, &sql, vec![Value::Integer(value)])
    }
}

impl<E: Entity> CrudRepository for SqliteRepository<'_, E> {
    type Entity = E;

    fn save(&self, entity: &E) -> RepoResult<E> {
        write_entity(self.conn, entity)
    }

    fn save_all(&self, entities: &[E]) -> RepoResult<Vec<E>> {
        let tx = self.conn.unchecked_transaction()?;
        let mut saved = Vec::with_capacity(entities.len());
        for entity in entities {
            saved.push(write_entity(&tx, entity)?);
        }
        tx.commit()?;
        Ok(saved)
    }

    fn find_by_id(&self, id: RecordId) -> RepoResult<Option<E>> {
        let sql = format!("{} WHERE {} = ?1;", E::SELECT_SQL, E::ID_COLUMN);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(E::from_row(row)?));
        }

        Ok(None)
    }

    fn find_all(&self) -> RepoResult<Vec<E>> {
        let sql = format!("{} ORDER BY {} ASC;", E::SELECT_SQL, E::ID_COLUMN);
        query_entities(self.conn, &sql, Vec::new())
    }

    fn find_page(&self, page: &PageRequest) -> RepoResult<Vec<E>> {
        let sql = format!(
            "{} ORDER BY {} ASC LIMIT ?1 OFFSET ?2;",
            E::SELECT_SQL,
            E::ID_COLUMN
        );
        query_entities(
            self.conn,
            &sql,
            vec![
                Value::Integer(i64::from(page.effective_limit())),
                Value::Integer(i64::from(page.offset)),
            ],
        )
    }

    fn exists_by_id(&self, id: RecordId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);", E::TABLE),
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", E::TABLE),
            [],
            |row| row.get(0),
        )?;
        u64::try_from(count).map_err(|_| {
            RepoError::InvalidData(format!("negative row count {count} in {}", E::TABLE))
        })
    }

    fn delete(&self, entity: &E) -> RepoResult<()> {
        let id = entity.id().ok_or(RepoError::MissingId(E::NAME))?;
        self.delete_by_id(id)
    }

    fn delete_by_id(&self, id: RecordId) -> RepoResult<()> {
        let result = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1;", E::TABLE), params![id]);

        let changed = match result {
            Ok(changed) => changed,
            Err(err) => {
                let err = RepoError::from(err);
                warn!(
                    "event=repo_delete module=repo status=error entity={} id={} error={}",
                    E::NAME,
                    id,
                    err
                );
                return Err(err);
            }
        };

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: E::NAME,
                id,
            });
        }

        debug!(
            "event=repo_delete module=repo status=ok entity={} id={}",
            E::NAME,
            id
        );
        Ok(())
    }
}

impl SqliteRepository<'_, Expense> {
    /// Lists expenses charged to one account.
    pub fn find_by_account(&self, account_id: RecordId) -> RepoResult<Vec<Expense>> {
        self.find_where("expense.account_id", account_id)
    }

    /// Lists expenses filed under one category.
    pub fn find_by_category(&self, category_id: RecordId) -> RepoResult<Vec<Expense>> {
        self.find_where("expense.expense_category_id", category_id)
    }
}

impl SqliteRepository<'_, Income> {
    /// Lists incomes credited to one account.
    pub fn find_by_account(&self, account_id: RecordId) -> RepoResult<Vec<Income>> {
        self.find_where("income.account_id", account_id)
    }

    /// Lists incomes received from one source.
    pub fn find_by_source(&self, source_id: RecordId) -> RepoResult<Vec<Income>> {
        self.find_where("income.income_source_id", source_id)
    }
}

fn write_entity<E: Entity>(conn: &Connection, entity: &E) -> RepoResult<E> {
    let mut outgoing = entity.clone();
    outgoing.before_write(Local::now().date_naive());
    let op = if outgoing.id().is_some() { "update" } else { "insert" };

    let result = match outgoing.id() {
        None => insert_row(conn, &outgoing).map(|id| outgoing.set_id(id)),
        Some(id) => update_row(conn, &outgoing, id),
    };

    match result {
        Ok(()) => {
            debug!(
                "event=repo_write module=repo status=ok entity={} op={} id={}",
                E::NAME,
                op,
                outgoing.id().unwrap_or_default()
            );
            Ok(outgoing)
        }
        Err(err) => {
            warn!(
                "event=repo_write module=repo status=error entity={} op={} error={}",
                E::NAME,
                op,
                err
            );
            Err(err)
        }
    }
}

fn insert_row<E: Entity>(conn: &Connection, entity: &E) -> RepoResult<RecordId> {
    let placeholders = (1..=E::COLUMNS.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({placeholders});",
        E::TABLE,
        E::COLUMNS.join(", ")
    );

    conn.execute(&sql, params_from_iter(entity.to_params()?))?;
    Ok(conn.last_insert_rowid())
}

fn update_row<E: Entity>(conn: &Connection, entity: &E, id: RecordId) -> RepoResult<()> {
    let assignments = E::COLUMNS
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ?{}", index + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments} WHERE id = ?{};",
        E::TABLE,
        E::COLUMNS.len() + 1
    );

    let mut bind_values = entity.to_params()?;
    bind_values.push(Value::Integer(id));

    let changed = conn.execute(&sql, params_from_iter(bind_values))?;
    if changed == 0 {
        return Err(RepoError::NotFound {
            entity: E::NAME,
            id,
        });
    }

    Ok(())
}

fn query_entities<E: Entity>(
    conn: &Connection,
    sql: &str,
    bind_values: Vec<Value>,
) -> RepoResult<Vec<E>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut entities = Vec::new();

    while let Some(row) = rows.next()? {
        entities.push(E::from_row(row)?);
    }

    Ok(entities)
}

fn ensure_connection_ready<E: Entity>(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, E::TABLE)? {
        return Err(RepoError::MissingRequiredTable(E::TABLE));
    }

    for &column in std::iter::once(&"id").chain(E::COLUMNS.iter()) {
        if !table_has_column(conn, E::TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: E::TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{PageRequest, PAGE_DEFAULT_LIMIT, PAGE_LIMIT_MAX};

    #[test]
    fn zero_or_missing_limit_uses_default() {
        assert_eq!(PageRequest::default().effective_limit(), PAGE_DEFAULT_LIMIT);
        assert_eq!(PageRequest::new(0, 3).effective_limit(), PAGE_DEFAULT_LIMIT);
    }

    #[test]
    fn limit_is_capped_at_max() {
        assert_eq!(PageRequest::new(7, 0).effective_limit(), 7);
        assert_eq!(PageRequest::new(10_000, 0).effective_limit(), PAGE_LIMIT_MAX);
    }
}
