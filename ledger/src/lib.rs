//! fxbook Balance Ledger
//!
//! In-memory table of the current balance per tracked currency.

pub mod engine;
pub mod balance;

pub use engine::BalanceLedger;
pub use balance::{BalanceChange, BalanceSnapshot};
