//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `finance_core` linkage, configuration and schema bootstrap.
//! - Print deterministic `key=value` lines for quick local sanity checks.

use finance_core::db::migrations::current_user_version;
use finance_core::db::open_db;
use finance_core::{
    init_logging, CrudRepository, Entity, FinanceConfig, SqliteAccountRepository,
    SqliteExpenseCategoryRepository, SqliteExpenseRepository, SqliteIncomeRepository,
    SqliteIncomeSourceRepository, SqliteRepository,
};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("finance_cli error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    println!("finance_core ping={}", finance_core::ping());
    println!("finance_core version={}", finance_core::core_version());

    let config = FinanceConfig::from_env()?;
    init_logging(config.log_level, &config.log_dir)?;

    let conn = open_db(&config.db_path)?;
    println!("db_path={}", config.db_path.display());
    println!("schema_version={}", current_user_version(&conn)?);

    print_count(SqliteAccountRepository::try_new(&conn)?)?;
    print_count(SqliteExpenseCategoryRepository::try_new(&conn)?)?;
    print_count(SqliteIncomeSourceRepository::try_new(&conn)?)?;
    print_count(SqliteExpenseRepository::try_new(&conn)?)?;
    print_count(SqliteIncomeRepository::try_new(&conn)?)?;

    info!("event=cli_probe module=cli status=ok");
    close(conn)
}

fn print_count<E: Entity>(repo: SqliteRepository<'_, E>) -> Result<(), Box<dyn Error>> {
    println!("rows.{}={}", E::TABLE, repo.count()?);
    Ok(())
}

fn close(conn: Connection) -> Result<(), Box<dyn Error>> {
    conn.close().map_err(|(_, err)| err)?;
    Ok(())
}
