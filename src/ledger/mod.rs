// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The ledger engine: every mutation of accounts, transactions, transfers,
//! bills, budgets, and goals goes through a [`LedgerEngine`] method, and every
//! multi-record mutation commits through one [`LedgerStore::scoped`] call.

use crate::error::Result;
use crate::settings::Settings;
use crate::store::LedgerStore;

mod accounts;
mod budgets;
mod draft;
mod goals;
mod input;
mod payables;
mod posting;
mod sync;
mod transactions;
mod transfers;

pub use accounts::{AccountSummary, AccountView, BalanceDrift, ReconcileOutcome};
pub use budgets::{BudgetProgress, DateWindow, period_window};
pub use draft::Draft;
pub use input::{
    AccountChanges, BudgetChanges, MarkPaid, NewAccount, NewBudget, NewGoal, NewPayable,
    NewSplit, NewTransaction, NewTransfer, PayableChanges, TransactionChanges,
};
pub use payables::PaymentOutcome;
pub use sync::{EntityKind, SyncRecord};
pub use transfers::TransferReceipt;

#[derive(Debug)]
pub struct LedgerEngine {
    store: LedgerStore,
    settings: Settings,
}

impl LedgerEngine {
    pub fn builder() -> LedgerEngineBuilder {
        LedgerEngineBuilder::default()
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn overdraft_allowed(&self, per_call: bool) -> bool {
        per_call || self.settings.allow_bank_overdraft
    }
}

#[derive(Debug, Default)]
pub struct LedgerEngineBuilder {
    store: Option<LedgerStore>,
    settings: Option<Settings>,
}

impl LedgerEngineBuilder {
    pub fn store(mut self, store: LedgerStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Without an explicit store, opens the database the settings point at.
    pub fn build(self) -> Result<LedgerEngine> {
        let settings = self.settings.unwrap_or_default();
        let store = match self.store {
            Some(store) => store,
            None => LedgerStore::open(&settings.resolved_db_path()?)?,
        };
        Ok(LedgerEngine { store, settings })
    }
}
