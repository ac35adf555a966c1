//! Classification records: expense categories and income sources.
//!
//! Both are plain named lookups. They are referenced by transactions and can
//! only be deleted once no expense/income points at them.

use crate::model::RecordId;
use serde::{Deserialize, Serialize};

/// Spending classification such as "Groceries" or "Tuition".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub id: Option<RecordId>,
    pub name: Option<String>,
}

impl ExpenseCategory {
    pub fn builder() -> ExpenseCategoryBuilder {
        ExpenseCategoryBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseCategoryBuilder {
    inner: ExpenseCategory,
}

impl ExpenseCategoryBuilder {
    pub fn id(mut self, id: RecordId) -> Self {
        self.inner.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = Some(name.into());
        self
    }

    pub fn build(self) -> ExpenseCategory {
        self.inner
    }
}

/// Origin of incoming money such as "Salary" or "Bonus".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSource {
    pub id: Option<RecordId>,
    pub name: Option<String>,
}

impl IncomeSource {
    pub fn builder() -> IncomeSourceBuilder {
        IncomeSourceBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct IncomeSourceBuilder {
    inner: IncomeSource,
}

impl IncomeSourceBuilder {
    pub fn id(mut self, id: RecordId) -> Self {
        self.inner.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = Some(name.into());
        self
    }

    pub fn build(self) -> IncomeSource {
        self.inner
    }
}
