// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Row-plus-balance writes shared by every service that books or reverses a
//! transaction. Callers run these on the connection handed out by
//! `LedgerStore::scoped`.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::accounting::{reversal, transaction_delta};
use crate::error::{LedgerError, Result};
use crate::models::{
    Account, AccountKind, Direction, RecordMeta, Transaction, TransactionSource,
};
use crate::store::{self, Record, accounts, splits};

pub(crate) struct Entry {
    pub account_id: Uuid,
    pub direction: Direction,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category_id: Option<String>,
    pub payee: Option<String>,
    pub note: Option<String>,
    pub source: TransactionSource,
}

/// Only bank balances are floored at zero; credit and loan accounts may exceed their limits.
pub(crate) fn ensure_funds(account: &Account, delta: Decimal, allow_overdraft: bool) -> Result<()> {
    if allow_overdraft || account.kind() != AccountKind::Bank || delta >= Decimal::ZERO {
        return Ok(());
    }
    if account.balance + delta < Decimal::ZERO {
        debug!(account_id = %account.id, balance = %account.balance, %delta, "insufficient funds");
        return Err(LedgerError::InsufficientFunds {
            account_id: account.id,
            balance: account.balance,
            requested: -delta,
        });
    }
    Ok(())
}

/// Inserts the transaction and applies its balance effect.
pub(crate) fn post(conn: &Connection, entry: Entry, allow_overdraft: bool) -> Result<Transaction> {
    let account: Account = store::require(conn, entry.account_id)?;
    let tx = Transaction {
        id: Uuid::new_v4(),
        account_id: account.id,
        direction: entry.direction,
        amount: entry.amount,
        date: entry.date,
        category_id: entry.category_id,
        payee: entry.payee,
        note: entry.note,
        source: entry.source,
        is_split: false,
        is_reconciled: matches!(entry.source, TransactionSource::Adjustment),
        meta: RecordMeta::new(),
    };
    let delta = transaction_delta(&tx, account.kind());
    ensure_funds(&account, delta, allow_overdraft)?;
    tx.save(conn)?;
    accounts::apply_delta(conn, account.id, delta)?;
    Ok(tx)
}

/// Undoes a transaction's balance effect and tombstones it with its splits.
pub(crate) fn reverse(conn: &Connection, mut tx: Transaction) -> Result<Transaction> {
    let account: Account = store::require(conn, tx.account_id)?;
    accounts::apply_delta(
        conn,
        account.id,
        reversal(tx.direction, tx.amount, account.kind()),
    )?;
    splits::tombstone_all(conn, tx.id)?;
    tx.meta.tombstone();
    tx.save(conn)?;
    Ok(tx)
}

pub(crate) fn require_direct(tx: &Transaction) -> Result<()> {
    match tx.source {
        TransactionSource::Transfer { transfer_id } => Err(LedgerError::validation(format!(
            "transaction {} belongs to transfer {}; change the transfer instead",
            tx.id, transfer_id
        ))),
        TransactionSource::Payable { payable_id } => Err(LedgerError::validation(format!(
            "transaction {} pays bill {}; mark the bill unpaid instead",
            tx.id, payable_id
        ))),
        TransactionSource::Direct | TransactionSource::Adjustment => Ok(()),
    }
}
