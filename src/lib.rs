// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Billfold: a local, sync-aware personal finance ledger.
//!
//! [`LedgerEngine`] owns a [`LedgerStore`] and exposes every operation on
//! accounts, transactions, transfers, payables, budgets, and goals.

pub mod accounting;
pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod recurrence;
pub mod settings;
pub mod store;
pub mod utils;

pub use error::{ErrorKind, LedgerError, Result};
pub use ledger::{LedgerEngine, LedgerEngineBuilder};
pub use settings::Settings;
pub use store::LedgerStore;
