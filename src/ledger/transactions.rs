// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::LedgerEngine;
use super::input::{NewSplit, NewTransaction, TransactionChanges};
use super::posting::{self, Entry, ensure_funds, require_direct};
use crate::accounting::transaction_delta;
use crate::error::{LedgerError, Result};
use crate::models::{Account, RecordMeta, Transaction, TransactionSource, TransactionSplit};
use crate::store::transactions::TransactionFilter;
use crate::store::{self, Record, accounts, splits, transactions};
use crate::utils::{normalize_text, require_positive};

impl LedgerEngine {
    pub fn create_transaction(&mut self, input: NewTransaction) -> Result<Transaction> {
        require_positive(input.amount, "transaction amount")?;
        let allow = self.overdraft_allowed(input.allow_overdraft);
        let entry = Entry {
            account_id: input.account_id,
            direction: input.direction,
            amount: input.amount,
            date: input.date,
            category_id: normalize_text(input.category_id),
            payee: normalize_text(input.payee),
            note: normalize_text(input.note),
            source: TransactionSource::Direct,
        };
        let tx = self.store.scoped(|conn| posting::post(conn, entry, allow))?;
        info!(
            transaction_id = %tx.id,
            account_id = %tx.account_id,
            direction = %tx.direction,
            amount = %tx.amount,
            "transaction created"
        );
        Ok(tx)
    }

    /// Applies only the incremental balance change between the old and new
    /// amount/direction, or moves the full effect when the account changes.
    pub fn update_transaction(&mut self, id: Uuid, changes: TransactionChanges) -> Result<Transaction> {
        if let Some(amount) = changes.amount {
            require_positive(amount, "transaction amount")?;
        }
        let allow = self.overdraft_allowed(changes.allow_overdraft);
        let updated = self.store.scoped(|conn| {
            let old: Transaction = store::require(conn, id)?;
            require_direct(&old)?;

            let mut new = old.clone();
            if let Some(account_id) = changes.account_id {
                new.account_id = account_id;
            }
            if let Some(direction) = changes.direction {
                new.direction = direction;
            }
            if let Some(amount) = changes.amount {
                new.amount = amount;
            }
            if let Some(date) = changes.date {
                new.date = date;
            }
            if let Some(category_id) = changes.category_id {
                new.category_id = normalize_text(category_id);
            }
            if let Some(payee) = changes.payee {
                new.payee = normalize_text(payee);
            }
            if let Some(note) = changes.note {
                new.note = normalize_text(note);
            }
            if old.is_split && new.amount != old.amount {
                return Err(LedgerError::validation(
                    "clear the splits before changing the amount of a split transaction",
                ));
            }

            let old_account: Account = store::require(conn, old.account_id)?;
            let old_delta = transaction_delta(&old, old_account.kind());
            if new.account_id == old.account_id {
                let increment = transaction_delta(&new, old_account.kind()) - old_delta;
                if !increment.is_zero() {
                    ensure_funds(&old_account, increment, allow)?;
                    accounts::apply_delta(conn, old_account.id, increment)?;
                }
            } else {
                let new_account: Account = store::require(conn, new.account_id)?;
                let new_delta = transaction_delta(&new, new_account.kind());
                ensure_funds(&new_account, new_delta, allow)?;
                accounts::apply_delta(conn, old_account.id, -old_delta)?;
                accounts::apply_delta(conn, new_account.id, new_delta)?;
            }
            store::touch_and_save(conn, &mut new)?;
            Ok(new)
        })?;
        info!(transaction_id = %id, amount = %updated.amount, "transaction updated");
        Ok(updated)
    }

    /// Reverses the balance effect, then tombstones. A second call reports `NotFound`.
    pub fn delete_transaction(&mut self, id: Uuid) -> Result<()> {
        self.store.scoped(|conn| {
            let tx: Transaction = store::require(conn, id)?;
            require_direct(&tx)?;
            posting::reverse(conn, tx).map(|_| ())
        })?;
        info!(transaction_id = %id, "transaction deleted");
        Ok(())
    }

    pub fn get_transaction(&self, id: Uuid) -> Result<Transaction> {
        store::require(self.store.conn(), id)
    }

    pub fn list_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        transactions::list(self.store.conn(), filter)
    }

    /// Replaces the category allocation of a transaction. Balances are untouched.
    pub fn set_splits(&mut self, transaction_id: Uuid, parts: Vec<NewSplit>) -> Result<Vec<TransactionSplit>> {
        if parts.is_empty() {
            return Err(LedgerError::validation("at least one split is required"));
        }
        for part in &parts {
            require_positive(part.amount, "split amount")?;
        }
        let total: Decimal = parts.iter().map(|p| p.amount).sum();
        let written = self.store.scoped(|conn| {
            let mut tx: Transaction = store::require(conn, transaction_id)?;
            if total != tx.amount {
                return Err(LedgerError::validation(format!(
                    "splits total {} but the transaction is {}",
                    total, tx.amount
                )));
            }
            splits::tombstone_all(conn, transaction_id)?;
            let mut written = Vec::with_capacity(parts.len());
            for part in parts {
                let split = TransactionSplit {
                    id: Uuid::new_v4(),
                    transaction_id,
                    category_id: normalize_text(part.category_id),
                    amount: part.amount,
                    note: normalize_text(part.note),
                    meta: RecordMeta::new(),
                };
                split.save(conn)?;
                written.push(split);
            }
            tx.is_split = true;
            store::touch_and_save(conn, &mut tx)?;
            Ok(written)
        })?;
        info!(transaction_id = %transaction_id, parts = written.len(), "transaction split");
        Ok(written)
    }

    pub fn clear_splits(&mut self, transaction_id: Uuid) -> Result<()> {
        self.store.scoped(|conn| {
            let mut tx: Transaction = store::require(conn, transaction_id)?;
            splits::tombstone_all(conn, transaction_id)?;
            if tx.is_split {
                tx.is_split = false;
                store::touch_and_save(conn, &mut tx)?;
            }
            Ok(())
        })
    }

    pub fn splits(&self, transaction_id: Uuid) -> Result<Vec<TransactionSplit>> {
        splits::for_transaction(self.store.conn(), transaction_id)
    }
}
