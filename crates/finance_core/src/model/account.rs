//! Account record.

use crate::model::RecordId;
use serde::{Deserialize, Serialize};

/// A named money-holding record (bank account, card, cash box).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<RecordId>,
    /// Required; stored in a NOT NULL column.
    pub name: Option<String>,
    pub bank: Option<String>,
    /// Informational only, never recomputed from transactions.
    pub balance: Option<f64>,
    pub is_active: Option<bool>,
}

impl Account {
    pub fn builder() -> AccountBuilder {
        AccountBuilder::default()
    }
}

/// Chainable constructor for [`Account`].
#[derive(Debug, Clone, Default)]
pub struct AccountBuilder {
    inner: Account,
}

impl AccountBuilder {
    pub fn id(mut self, id: RecordId) -> Self {
        self.inner.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = Some(name.into());
        self
    }

    pub fn bank(mut self, bank: impl Into<String>) -> Self {
        self.inner.bank = Some(bank.into());
        self
    }

    pub fn balance(mut self, balance: f64) -> Self {
        self.inner.balance = Some(balance);
        self
    }

    pub fn is_active(mut self, is_active: bool) -> Self {
        self.inner.is_active = Some(is_active);
        self
    }

    pub fn build(self) -> Account {
        self.inner
    }
}
