//! Finance domain records.
//!
//! # Responsibility
//! - Define the persisted shapes of accounts, classifications and transactions.
//! - Offer builder-style construction for every record.
//!
//! # Invariants
//! - `id == None` means the record has never been saved (transient).
//! - Builders never fail; required columns are enforced by the store so a
//!   record with missing required data is rejected on write, not on build.

pub mod account;
pub mod classification;
pub mod expense;
pub mod income;

/// Database-generated integer identity shared by every record.
pub type RecordId = i64;
