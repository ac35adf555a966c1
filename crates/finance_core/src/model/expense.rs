//! Expense record.
//!
//! # Invariants
//! - `amount`, `expense_category` and `account` are required by the store.
//! - `date` is owned by the repository: it is overwritten with the current
//!   local date on every insert and update.

use crate::model::account::Account;
use crate::model::classification::ExpenseCategory;
use crate::model::RecordId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Money leaving an account, classified by an [`ExpenseCategory`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Option<RecordId>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    /// Last-write date.
    pub date: Option<NaiveDate>,
    /// Many-to-one; loaded together with the expense.
    pub expense_category: Option<ExpenseCategory>,
    /// Many-to-one; loaded together with the expense.
    pub account: Option<Account>,
}

impl Expense {
    pub fn builder() -> ExpenseBuilder {
        ExpenseBuilder::default()
    }
}

/// Chainable constructor for [`Expense`].
#[derive(Debug, Clone, Default)]
pub struct ExpenseBuilder {
    inner: Expense,
}

impl ExpenseBuilder {
    pub fn id(mut self, id: RecordId) -> Self {
        self.inner.id = Some(id);
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.inner.amount = Some(amount);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.inner.description = Some(description.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.inner.date = Some(date);
        self
    }

    pub fn expense_category(mut self, category: ExpenseCategory) -> Self {
        self.inner.expense_category = Some(category);
        self
    }

    pub fn account(mut self, account: Account) -> Self {
        self.inner.account = Some(account);
        self
    }

    pub fn build(self) -> Expense {
        self.inner
    }
}
