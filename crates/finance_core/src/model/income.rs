//! Income record.
//!
//! # Invariants
//! - `amount`, `income_source` and `account` are required by the store.
//! - `date` is stamped by the repository on every write.

use crate::model::account::Account;
use crate::model::classification::IncomeSource;
use crate::model::RecordId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Money entering an account from an [`IncomeSource`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: Option<RecordId>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub income_source: Option<IncomeSource>,
    pub account: Option<Account>,
}

impl Income {
    pub fn builder() -> IncomeBuilder {
        IncomeBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct IncomeBuilder {
    inner: Income,
}

impl IncomeBuilder {
    pub fn id(mut self, id: RecordId) -> Self {
        self.inner.id = Some(id);
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.inner.amount = Some(amount);
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.inner.date = Some(date);
        self
    }

    pub fn income_source(mut self, source: IncomeSource) -> Self {
        self.inner.income_source = Some(source);
        self
    }

    pub fn account(mut self, account: Account) -> Self {
        self.inner.account = Some(account);
        self
    }

    pub fn build(self) -> Income {
        self.inner
    }
}
