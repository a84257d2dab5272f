// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Durable keyed storage for ledger records.
//!
//! Each entity maps to one table through [`Record`]. Read paths exclude
//! tombstoned rows unless the function name says otherwise (`find_any`,
//! `with_status`, `tombstones_since`).

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Params, Row, TransactionBehavior, params};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::db;
use crate::error::{LedgerError, Result};
use crate::models::{RecordMeta, SyncStatus};
use crate::utils::{format_stamp, parse_stamp};

pub mod accounts;
pub mod budgets;
pub mod goals;
pub mod payables;
pub mod splits;
pub mod transactions;
pub mod transfers;

pub trait Record: Sized {
    const TABLE: &'static str;
    /// Name used in `NotFound` and `Conflict` errors.
    const ENTITY: &'static str;
    /// Column list matching [`Record::from_row`] positions.
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Insert-or-replace the full row.
    fn save(&self, conn: &Connection) -> rusqlite::Result<()>;

    fn id(&self) -> Uuid;
    fn meta(&self) -> &RecordMeta;
    fn meta_mut(&mut self) -> &mut RecordMeta;
}

#[derive(Debug)]
pub struct LedgerStore {
    conn: Connection,
}

impl LedgerStore {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self {
            conn: db::open_or_init(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        db::init_schema(&mut conn)?;
        Ok(Self { conn })
    }

    /// Committed state.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Runs `f` inside one write transaction. An `Err` from `f` drops the
    /// transaction uncommitted, rolling back every write it made.
    pub fn scoped<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&*tx)?;
        tx.commit()?;
        Ok(out)
    }
}

pub fn find<T: Record>(conn: &Connection, id: Uuid) -> Result<Option<T>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id=?1 AND sync_status!='deleted'",
        T::COLUMNS,
        T::TABLE
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt
        .query_row(params![id.to_string()], T::from_row)
        .optional()?)
}

pub fn find_any<T: Record>(conn: &Connection, id: Uuid) -> Result<Option<T>> {
    let sql = format!("SELECT {} FROM {} WHERE id=?1", T::COLUMNS, T::TABLE);
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt
        .query_row(params![id.to_string()], T::from_row)
        .optional()?)
}

pub fn require<T: Record>(conn: &Connection, id: Uuid) -> Result<T> {
    find(conn, id)?.ok_or_else(|| LedgerError::not_found(T::ENTITY, id))
}

/// Live rows matching `clause`, which is appended after the tombstone
/// predicate and so must start with `AND` or `ORDER BY`.
pub fn select<T: Record, P: Params>(conn: &Connection, clause: &str, params: P) -> Result<Vec<T>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE sync_status!='deleted' {}",
        T::COLUMNS,
        T::TABLE,
        clause
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params, T::from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn with_status<T: Record>(conn: &Connection, status: SyncStatus) -> Result<Vec<T>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE sync_status=?1 ORDER BY updated_at",
        T::COLUMNS,
        T::TABLE
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![status.as_str()], T::from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn tombstones_since<T: Record>(conn: &Connection, since: DateTime<Utc>) -> Result<Vec<T>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE sync_status='deleted' AND updated_at>?1 ORDER BY updated_at",
        T::COLUMNS,
        T::TABLE
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![format_stamp(&since)], T::from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Flips dirty rows to synced without touching `updated_at`.
pub fn mark_synced<T: Record>(conn: &Connection, ids: &[Uuid]) -> Result<usize> {
    let sql = format!(
        "UPDATE {} SET sync_status='synced' WHERE id=?1 AND sync_status='dirty'",
        T::TABLE
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let mut changed = 0;
    for id in ids {
        changed += stmt.execute(params![id.to_string()])?;
    }
    Ok(changed)
}

/// Tombstones a live record. Returns the record as stored.
pub fn tombstone<T: Record>(conn: &Connection, id: Uuid) -> Result<T> {
    let mut record: T = require(conn, id)?;
    record.meta_mut().tombstone();
    record.save(conn)?;
    Ok(record)
}

/// Marks a record changed and writes it.
pub fn touch_and_save<T: Record>(conn: &Connection, record: &mut T) -> Result<()> {
    record.meta_mut().touch();
    record.save(conn)?;
    Ok(())
}

fn bad_column<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| bad_column(idx, e))
}

pub(crate) fn opt_uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| Uuid::parse_str(&s).map_err(|e| bad_column(idx, e)))
        .transpose()
}

pub(crate) fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    s.parse::<Decimal>().map_err(|e| bad_column(idx, e))
}

pub(crate) fn opt_decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| s.parse::<Decimal>().map_err(|e| bad_column(idx, e)))
        .transpose()
}

pub(crate) fn date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| bad_column(idx, e))
}

pub(crate) fn opt_date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| bad_column(idx, e)))
        .transpose()
}

pub(crate) fn text_enum_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let s: String = row.get(idx)?;
    s.parse::<T>().map_err(|e| bad_column(idx, e))
}

pub(crate) fn json_at<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| serde_json::from_str(&s).map_err(|e| bad_column(idx, e)))
        .transpose()
}

/// Reads `sync_status, created_at, updated_at` starting at `idx`.
pub(crate) fn meta_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<RecordMeta> {
    let stamp = |i: usize| -> rusqlite::Result<DateTime<Utc>> {
        let s: String = row.get(i)?;
        parse_stamp(&s).map_err(|e| bad_column(i, e))
    };
    Ok(RecordMeta {
        sync_status: text_enum_at(row, idx)?,
        created_at: stamp(idx + 1)?,
        updated_at: stamp(idx + 2)?,
    })
}

pub(crate) fn invalid_row(idx: usize, msg: impl Into<String>) -> rusqlite::Error {
    bad_column(idx, InvalidRow(msg.into()))
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct InvalidRow(String);

pub(crate) fn opt_text(value: &Option<Uuid>) -> Option<String> {
    value.map(|id| id.to_string())
}

pub(crate) fn opt_num(value: &Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_string())
}

pub(crate) fn opt_day(value: &Option<NaiveDate>) -> Option<String> {
    value.map(|d| d.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Account, AccountTerms};

    fn bank(name: &str) -> Account {
        Account {
            id: Uuid::new_v4(),
            name: name.into(),
            terms: AccountTerms::Bank,
            balance: Decimal::new(10_000, 2),
            opening_balance: Decimal::new(10_000, 2),
            is_active: true,
            meta: RecordMeta::new(),
        }
    }

    #[test]
    fn scoped_rolls_back_on_error() {
        let mut store = LedgerStore::open_in_memory().unwrap();
        let acct = bank("Checking");
        let res: Result<()> = store.scoped(|tx| {
            acct.save(tx)?;
            Err(LedgerError::validation("abort"))
        });
        assert!(res.is_err());
        assert!(find::<Account>(store.conn(), acct.id).unwrap().is_none());

        store.scoped(|tx| Ok(acct.save(tx)?)).unwrap();
        assert_eq!(find::<Account>(store.conn(), acct.id).unwrap(), Some(acct));
    }

    #[test]
    fn tombstones_are_hidden_from_live_reads() {
        let mut store = LedgerStore::open_in_memory().unwrap();
        let acct = bank("Savings");
        store.scoped(|tx| Ok(acct.save(tx)?)).unwrap();
        store
            .scoped(|tx| tombstone::<Account>(tx, acct.id).map(|_| ()))
            .unwrap();
        assert!(find::<Account>(store.conn(), acct.id).unwrap().is_none());
        let raw: Account = find_any(store.conn(), acct.id).unwrap().unwrap();
        assert!(raw.meta.is_deleted());
        assert!(select::<Account, _>(store.conn(), "", []).unwrap().is_empty());
    }
}
