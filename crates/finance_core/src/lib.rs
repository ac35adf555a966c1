//! Persistence core for personal-finance tracking.
//! Accounts, expense categories, income sources, expenses and incomes are
//! stored in SQLite and reached through one generic CRUD repository.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, FinanceConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{Account, AccountBuilder};
pub use model::classification::{
    ExpenseCategory, ExpenseCategoryBuilder, IncomeSource, IncomeSourceBuilder,
};
pub use model::expense::{Expense, ExpenseBuilder};
pub use model::income::{Income, IncomeBuilder};
pub use model::RecordId;
pub use repo::crud::{
    CrudRepository, PageRequest, SqliteAccountRepository, SqliteExpenseCategoryRepository,
    SqliteExpenseRepository, SqliteIncomeRepository, SqliteIncomeSourceRepository,
    SqliteRepository,
};
pub use repo::error::{ConstraintKind, ConstraintViolation, RepoError, RepoResult};
pub use repo::mapping::Entity;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
