//! Entity-to-table mapping metadata.
//!
//! # Responsibility
//! - Describe, per record type, its table, writable columns and load query.
//! - Convert records to bind values and rows back to records.
//!
//! # Invariants
//! - `to_params()` yields values in exactly the order of `COLUMNS`.
//! - `SELECT_SQL` loads many-to-one relationships in the same statement, so
//!   a loaded expense/income always carries its account and classification.
//! - A relationship to a transient record is refused before any SQL runs.

use crate::model::account::Account;
use crate::model::classification::{ExpenseCategory, IncomeSource};
use crate::model::expense::Expense;
use crate::model::income::Income;
use crate::model::RecordId;
use crate::repo::error::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::Row;

/// Mapping between a record type and its table.
pub trait Entity: Clone {
    /// Record name used in errors and log events.
    const NAME: &'static str;
    const TABLE: &'static str;
    /// Writable columns, excluding the generated `id`.
    const COLUMNS: &'static [&'static str];
    /// Load statement without `WHERE`/`ORDER BY`.
    const SELECT_SQL: &'static str;
    /// Id column as it must be spelled against `SELECT_SQL`.
    const ID_COLUMN: &'static str;

    fn id(&self) -> Option<RecordId>;
    fn set_id(&mut self, id: RecordId);

    /// Hook run on the outgoing copy right before INSERT/UPDATE.
    fn before_write(&mut self, _today: NaiveDate) {}

    fn to_params(&self) -> RepoResult<Vec<Value>>;
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

/// Column aliases for decoding an account, alone or joined.
struct AccountColumns {
    id: &'static str,
    name: &'static str,
    bank: &'static str,
    balance: &'static str,
    is_active: &'static str,
}

const ACCOUNT_PLAIN: AccountColumns = AccountColumns {
    id: "id",
    name: "name",
    bank: "bank",
    balance: "balance",
    is_active: "is_active",
};

const ACCOUNT_JOINED: AccountColumns = AccountColumns {
    id: "account_id",
    name: "account_name",
    bank: "account_bank",
    balance: "account_balance",
    is_active: "account_is_active",
};

fn decode_account(row: &Row<'_>, columns: &AccountColumns) -> RepoResult<Account> {
    Ok(Account {
        id: Some(row.get(columns.id)?),
        name: row.get(columns.name)?,
        bank: row.get(columns.bank)?,
        balance: row.get(columns.balance)?,
        is_active: row.get(columns.is_active)?,
    })
}

/// Resolves the foreign key for a relationship field.
///
/// Unset relationships bind NULL and are left to the NOT NULL constraint.
fn reference_id(
    entity: &'static str,
    field: &'static str,
    target_id: Option<Option<RecordId>>,
) -> RepoResult<Option<RecordId>> {
    match target_id {
        None => Ok(None),
        Some(None) => Err(RepoError::UnsavedReference { entity, field }),
        Some(Some(id)) => Ok(Some(id)),
    }
}

/// Binds a REAL column; SQLite would silently store NaN as NULL.
fn real_value(entity: &'static str, field: &'static str, value: Option<f64>) -> RepoResult<Value> {
    match value {
        Some(number) if !number.is_finite() => Err(RepoError::InvalidData(format!(
            "{entity}.{field} must be finite, got {number}"
        ))),
        _ => Ok(Value::from(value)),
    }
}

fn date_value(date: Option<NaiveDate>) -> Value {
    Value::from(date.map(|value| value.format("%Y-%m-%d").to_string()))
}

impl Entity for Account {
    const NAME: &'static str = "account";
    const TABLE: &'static str = "account";
    const COLUMNS: &'static [&'static str] = &["name", "bank", "balance", "is_active"];
    const SELECT_SQL: &'static str = "SELECT id, name, bank, balance, is_active FROM account";
    const ID_COLUMN: &'static str = "id";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn to_params(&self) -> RepoResult<Vec<Value>> {
        Ok(vec![
            Value::from(self.name.clone()),
            Value::from(self.bank.clone()),
            real_value(Self::NAME, "balance", self.balance)?,
            Value::from(self.is_active),
        ])
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        decode_account(row, &ACCOUNT_PLAIN)
    }
}

impl Entity for ExpenseCategory {
    const NAME: &'static str = "expense_category";
    const TABLE: &'static str = "expense_category";
    const COLUMNS: &'static [&'static str] = &["name"];
    const SELECT_SQL: &'static str = "SELECT id, name FROM expense_category";
    const ID_COLUMN: &'static str = "id";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn to_params(&self) -> RepoResult<Vec<Value>> {
        Ok(vec![Value::from(self.name.clone())])
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            name: row.get("name")?,
        })
    }
}

impl Entity for IncomeSource {
    const NAME: &'static str = "income_source";
    const TABLE: &'static str = "income_source";
    const COLUMNS: &'static [&'static str] = &["name"];
    const SELECT_SQL: &'static str = "SELECT id, name FROM income_source";
    const ID_COLUMN: &'static str = "id";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn to_params(&self) -> RepoResult<Vec<Value>> {
        Ok(vec![Value::from(self.name.clone())])
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            name: row.get("name")?,
        })
    }
}

impl Entity for Expense {
    const NAME: &'static str = "expense";
    const TABLE: &'static str = "expense";
    const COLUMNS: &'static [&'static str] = &[
        "amount",
        "description",
        "date",
        "expense_category_id",
        "account_id",
    ];
    const SELECT_SQL: &'static str = "SELECT
        expense.id AS id,
        expense.amount AS amount,
        expense.description AS description,
        expense.date AS date,
        expense_category.id AS category_id,
        expense_category.name AS category_name,
        account.id AS account_id,
        account.name AS account_name,
        account.bank AS account_bank,
        account.balance AS account_balance,
        account.is_active AS account_is_active
    FROM expense
    JOIN expense_category ON expense_category.id = expense.expense_category_id
    JOIN account ON account.id = expense.account_id";
    const ID_COLUMN: &'static str = "expense.id";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn before_write(&mut self, today: NaiveDate) {
        self.date = Some(today);
    }

    fn to_params(&self) -> RepoResult<Vec<Value>> {
        let category_id = reference_id(
            Self::NAME,
            "expense_category",
            self.expense_category.as_ref().map(|category| category.id),
        )?;
        let account_id = reference_id(
            Self::NAME,
            "account",
            self.account.as_ref().map(|account| account.id),
        )?;

        Ok(vec![
            real_value(Self::NAME, "amount", self.amount)?,
            Value::from(self.description.clone()),
            date_value(self.date),
            Value::from(category_id),
            Value::from(account_id),
        ])
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            amount: row.get("amount")?,
            description: row.get("description")?,
            date: row.get("date")?,
            expense_category: Some(ExpenseCategory {
                id: Some(row.get("category_id")?),
                name: row.get("category_name")?,
            }),
            account: Some(decode_account(row, &ACCOUNT_JOINED)?),
        })
    }
}

impl Entity for Income {
    const NAME: &'static str = "income";
    const TABLE: &'static str = "income";
    const COLUMNS: &'static [&'static str] = &["amount", "date", "income_source_id", "account_id"];
    const SELECT_SQL: &'static str = "SELECT
        income.id AS id,
        income.amount AS amount,
        income.date AS date,
        income_source.id AS source_id,
        income_source.name AS source_name,
        account.id AS account_id,
        account.name AS account_name,
        account.bank AS account_bank,
        account.balance AS account_balance,
        account.is_active AS account_is_active
    FROM income
    JOIN income_source ON income_source.id = income.income_source_id
    JOIN account ON account.id = income.account_id";
    const ID_COLUMN: &'static str = "income.id";

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    fn before_write(&mut self, today: NaiveDate) {
        self.date = Some(today);
    }

    fn to_params(&self) -> RepoResult<Vec<Value>> {
        let source_id = reference_id(
            Self::NAME,
            "income_source",
            self.income_source.as_ref().map(|source| source.id),
        )?;
        let account_id = reference_id(
            Self::NAME,
            "account",
            self.account.as_ref().map(|account| account.id),
        )?;

        Ok(vec![
            real_value(Self::NAME, "amount", self.amount)?,
            date_value(self.date),
            Value::from(source_id),
            Value::from(account_id),
        ])
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: Some(row.get("id")?),
            amount: row.get("amount")?,
            date: row.get("date")?,
            income_source: Some(IncomeSource {
                id: Some(row.get("source_id")?),
                name: row.get("source_name")?,
            }),
            account: Some(decode_account(row, &ACCOUNT_JOINED)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Entity, RepoError};
    use crate::model::account::Account;
    use crate::model::classification::ExpenseCategory;
    use crate::model::expense::Expense;
    use crate::model::income::Income;
    use chrono::NaiveDate;
    use rusqlite::types::Value;

    #[test]
    fn params_follow_column_order() {
        let account = Account::builder().name("Wallet").balance(12.5).build();
        let params = account.to_params().unwrap();
        assert_eq!(params.len(), Account::COLUMNS.len());
        assert_eq!(params[0], Value::Text("Wallet".to_string()));
        assert_eq!(params[1], Value::Null);
        assert_eq!(params[2], Value::Real(12.5));
        assert_eq!(params[3], Value::Null);
    }

    #[test]
    fn expense_binds_reference_ids_and_iso_date() {
        let expense = Expense::builder()
            .amount(40.0)
            .date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
            .expense_category(ExpenseCategory::builder().id(7).name("Food").build())
            .account(Account::builder().id(3).name("Main").build())
            .build();

        let params = expense.to_params().unwrap();
        assert_eq!(params.len(), Expense::COLUMNS.len());
        assert_eq!(params[2], Value::Text("2024-03-09".to_string()));
        assert_eq!(params[3], Value::Integer(7));
        assert_eq!(params[4], Value::Integer(3));
    }

    #[test]
    fn unset_relationship_binds_null() {
        let expense = Expense::builder().amount(1.0).build();
        let params = expense.to_params().unwrap();
        assert_eq!(params[3], Value::Null);
        assert_eq!(params[4], Value::Null);
    }

    #[test]
    fn transient_relationship_is_refused() {
        let expense = Expense::builder()
            .amount(1.0)
            .expense_category(ExpenseCategory::builder().name("never saved").build())
            .build();

        let err = expense.to_params().unwrap_err();
        assert!(matches!(
            err,
            RepoError::UnsavedReference {
                entity: "expense",
                field: "expense_category"
            }
        ));
    }

    #[test]
    fn before_write_stamps_transaction_date_only() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();

        let mut expense = Expense::builder()
            .date(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap())
            .build();
        expense.before_write(today);
        assert_eq!(expense.date, Some(today));

        let mut income = Income::builder()
            .date(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap())
            .build();
        income.before_write(today);
        assert_eq!(income.date, Some(today));

        let mut account = Account::builder().name("untouched").build();
        let before = account.clone();
        account.before_write(today);
        assert_eq!(account, before);
    }

    #[test]
    fn non_finite_amounts_and_balances_are_refused() {
        let account = Account::builder().name("Wallet").balance(f64::NAN).build();
        let err = account.to_params().unwrap_err();
        assert!(matches!(
            err,
            RepoError::InvalidData(ref message) if message.contains("account.balance")
        ));

        let expense = Expense::builder().amount(f64::INFINITY).build();
        assert!(matches!(expense.to_params(), Err(RepoError::InvalidData(_))));

        let income = Income::builder().amount(f64::NEG_INFINITY).build();
        assert!(matches!(income.to_params(), Err(RepoError::InvalidData(_))));
    }
}
