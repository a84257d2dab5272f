// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, Result};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Billfold", "billfold"));

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2)
        .ok_or_else(|| LedgerError::Config("Could not determine platform-specific dirs".into()))
}

pub fn default_db_path() -> Result<PathBuf> {
    let proj = project_dirs()?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir)?;
    Ok(data_dir.join("billfold.sqlite"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("settings.json"))
}

pub fn open_or_init(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut conn = Connection::open(path)?;
    init_schema(&mut conn)?;
    Ok(conn)
}

/// Every table carries `sync_status` and `updated_at`; rows are never physically
/// deleted. Foreign keys are deferred so a cloud batch may land child-first.
pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS accounts(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        kind TEXT NOT NULL CHECK(kind IN ('bank','credit','loan')),
        balance TEXT NOT NULL,
        opening_balance TEXT NOT NULL DEFAULT '0',
        credit_limit TEXT,
        payment_due_day INTEGER,
        apr TEXT,
        principal TEXT,
        rate TEXT,
        payment_schedule TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        sync_status TEXT NOT NULL DEFAULT 'dirty',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY,
        account_id TEXT NOT NULL,
        direction TEXT NOT NULL CHECK(direction IN ('debit','credit')),
        amount TEXT NOT NULL,
        date TEXT NOT NULL,
        category_id TEXT,
        payee TEXT,
        note TEXT,
        source TEXT NOT NULL DEFAULT 'direct',
        transfer_id TEXT,
        linked_payable_id TEXT,
        is_split INTEGER NOT NULL DEFAULT 0,
        is_reconciled INTEGER NOT NULL DEFAULT 0,
        sync_status TEXT NOT NULL DEFAULT 'dirty',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(account_id) REFERENCES accounts(id) DEFERRABLE INITIALLY DEFERRED
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    CREATE INDEX IF NOT EXISTS idx_transactions_transfer ON transactions(transfer_id);

    CREATE TABLE IF NOT EXISTS transaction_splits(
        id TEXT PRIMARY KEY,
        transaction_id TEXT NOT NULL,
        category_id TEXT,
        amount TEXT NOT NULL,
        note TEXT,
        sync_status TEXT NOT NULL DEFAULT 'dirty',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        FOREIGN KEY(transaction_id) REFERENCES transactions(id) DEFERRABLE INITIALLY DEFERRED
    );
    CREATE INDEX IF NOT EXISTS idx_splits_transaction ON transaction_splits(transaction_id);

    CREATE TABLE IF NOT EXISTS transfers(
        id TEXT PRIMARY KEY,
        from_account_id TEXT NOT NULL,
        to_account_id TEXT NOT NULL,
        amount TEXT NOT NULL,
        date TEXT NOT NULL,
        note TEXT,
        from_transaction_id TEXT NOT NULL,
        to_transaction_id TEXT NOT NULL,
        sync_status TEXT NOT NULL DEFAULT 'dirty',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        CHECK(from_account_id != to_account_id)
    );

    CREATE TABLE IF NOT EXISTS payables(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        amount TEXT NOT NULL,
        due_date TEXT NOT NULL,
        category_id TEXT,
        note TEXT,
        is_paid INTEGER NOT NULL DEFAULT 0,
        paid_date TEXT,
        paid_from_account_id TEXT,
        linked_transaction_id TEXT,
        paid_amount TEXT,
        is_recurring INTEGER NOT NULL DEFAULT 0,
        recurrence_rule TEXT, -- JSON
        parent_payable_id TEXT,
        sync_status TEXT NOT NULL DEFAULT 'dirty',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_payables_due ON payables(due_date);
    CREATE INDEX IF NOT EXISTS idx_payables_parent ON payables(parent_payable_id);

    CREATE TABLE IF NOT EXISTS budgets(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        category_id TEXT,
        amount TEXT NOT NULL,
        period TEXT NOT NULL,
        start_date TEXT NOT NULL,
        rollover INTEGER NOT NULL DEFAULT 0,
        rolled_amount TEXT NOT NULL DEFAULT '0',
        alert_threshold INTEGER NOT NULL DEFAULT 80,
        last_rollover_start TEXT,
        sync_status TEXT NOT NULL DEFAULT 'dirty',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS goals(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        target_amount TEXT NOT NULL,
        current_amount TEXT NOT NULL DEFAULT '0',
        linked_account_id TEXT,
        target_date TEXT,
        is_completed INTEGER NOT NULL DEFAULT 0,
        sync_status TEXT NOT NULL DEFAULT 'dirty',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    "#,
    )?;
    Ok(())
}
