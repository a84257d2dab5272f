// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Bookkeeping for an external cloud sync process. Nothing in the engine
//! calls these; the sync collaborator pulls dirty rows, pushes them, marks
//! them synced, and applies remote state last-write-wins.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use super::LedgerEngine;
use crate::error::{LedgerError, Result};
use crate::models::{
    Account, Budget, Goal, Payable, RecordMeta, SyncStatus, Transaction, TransactionSplit,
    Transfer,
};
use crate::store::{self, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Account,
    Transaction,
    TransactionSplit,
    Transfer,
    Payable,
    Budget,
    Goal,
}

impl EntityKind {
    /// Parents before children, the order a full push should follow.
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Account,
        EntityKind::Transaction,
        EntityKind::TransactionSplit,
        EntityKind::Transfer,
        EntityKind::Payable,
        EntityKind::Budget,
        EntityKind::Goal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Transaction => "transaction",
            Self::TransactionSplit => "transaction_split",
            Self::Transfer => "transfer",
            Self::Payable => "payable",
            Self::Budget => "budget",
            Self::Goal => "goal",
        }
    }
}

impl FromStr for EntityKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        EntityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| LedgerError::validation(format!("unknown entity kind '{}'", s)))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of any entity, as exchanged with the cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", content = "record", rename_all = "snake_case")]
pub enum SyncRecord {
    Account(Account),
    Transaction(Transaction),
    TransactionSplit(TransactionSplit),
    Transfer(Transfer),
    Payable(Payable),
    Budget(Budget),
    Goal(Goal),
}

macro_rules! each_record {
    ($record:expr, $r:ident => $body:expr) => {
        match $record {
            SyncRecord::Account($r) => $body,
            SyncRecord::Transaction($r) => $body,
            SyncRecord::TransactionSplit($r) => $body,
            SyncRecord::Transfer($r) => $body,
            SyncRecord::Payable($r) => $body,
            SyncRecord::Budget($r) => $body,
            SyncRecord::Goal($r) => $body,
        }
    };
}

impl SyncRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Account(_) => EntityKind::Account,
            Self::Transaction(_) => EntityKind::Transaction,
            Self::TransactionSplit(_) => EntityKind::TransactionSplit,
            Self::Transfer(_) => EntityKind::Transfer,
            Self::Payable(_) => EntityKind::Payable,
            Self::Budget(_) => EntityKind::Budget,
            Self::Goal(_) => EntityKind::Goal,
        }
    }

    pub fn id(&self) -> Uuid {
        each_record!(self, r => r.id())
    }

    pub fn meta(&self) -> &RecordMeta {
        each_record!(self, r => r.meta())
    }
}

fn rows<T: Record>(
    found: Vec<T>,
    wrap: fn(T) -> SyncRecord,
) -> Vec<SyncRecord> {
    found.into_iter().map(wrap).collect()
}

fn dirty(conn: &Connection, kind: EntityKind) -> Result<Vec<SyncRecord>> {
    let status = SyncStatus::Dirty;
    Ok(match kind {
        EntityKind::Account => rows(store::with_status::<Account>(conn, status)?, SyncRecord::Account),
        EntityKind::Transaction => rows(
            store::with_status::<Transaction>(conn, status)?,
            SyncRecord::Transaction,
        ),
        EntityKind::TransactionSplit => rows(
            store::with_status::<TransactionSplit>(conn, status)?,
            SyncRecord::TransactionSplit,
        ),
        EntityKind::Transfer => rows(store::with_status::<Transfer>(conn, status)?, SyncRecord::Transfer),
        EntityKind::Payable => rows(store::with_status::<Payable>(conn, status)?, SyncRecord::Payable),
        EntityKind::Budget => rows(store::with_status::<Budget>(conn, status)?, SyncRecord::Budget),
        EntityKind::Goal => rows(store::with_status::<Goal>(conn, status)?, SyncRecord::Goal),
    })
}

fn deleted_since(conn: &Connection, kind: EntityKind, since: DateTime<Utc>) -> Result<Vec<SyncRecord>> {
    Ok(match kind {
        EntityKind::Account => rows(store::tombstones_since::<Account>(conn, since)?, SyncRecord::Account),
        EntityKind::Transaction => rows(
            store::tombstones_since::<Transaction>(conn, since)?,
            SyncRecord::Transaction,
        ),
        EntityKind::TransactionSplit => rows(
            store::tombstones_since::<TransactionSplit>(conn, since)?,
            SyncRecord::TransactionSplit,
        ),
        EntityKind::Transfer => rows(
            store::tombstones_since::<Transfer>(conn, since)?,
            SyncRecord::Transfer,
        ),
        EntityKind::Payable => rows(store::tombstones_since::<Payable>(conn, since)?, SyncRecord::Payable),
        EntityKind::Budget => rows(store::tombstones_since::<Budget>(conn, since)?, SyncRecord::Budget),
        EntityKind::Goal => rows(store::tombstones_since::<Goal>(conn, since)?, SyncRecord::Goal),
    })
}

/// Writes `remote` verbatim when it is newer than the local row. Stored
/// balances travel with the record; no delta is re-applied.
fn apply_remote<T: Record>(conn: &Connection, mut remote: T) -> Result<bool> {
    if let Some(local) = store::find_any::<T>(conn, remote.id())? {
        if local.meta().updated_at >= remote.meta().updated_at {
            debug!(entity = T::ENTITY, id = %remote.id(), "remote record not newer; skipped");
            return Ok(false);
        }
    }
    let meta = remote.meta_mut();
    if meta.sync_status != SyncStatus::Deleted {
        meta.sync_status = SyncStatus::Synced;
    }
    remote.save(conn)?;
    Ok(true)
}

fn apply_record(conn: &Connection, record: SyncRecord) -> Result<bool> {
    each_record!(record, r => apply_remote(conn, r))
}

impl LedgerEngine {
    /// Live rows changed locally since their last push. Deletions come from `tombstones_since`.
    pub fn dirty_records(&self, kind: EntityKind) -> Result<Vec<SyncRecord>> {
        dirty(self.store.conn(), kind)
    }

    pub fn tombstones_since(&self, kind: EntityKind, since: DateTime<Utc>) -> Result<Vec<SyncRecord>> {
        deleted_since(self.store.conn(), kind, since)
    }

    /// Flips the given dirty rows to synced. Tombstones stay deleted.
    pub fn mark_synced(&mut self, kind: EntityKind, ids: &[Uuid]) -> Result<usize> {
        let changed = self.store.scoped(|conn| match kind {
            EntityKind::Account => store::mark_synced::<Account>(conn, ids),
            EntityKind::Transaction => store::mark_synced::<Transaction>(conn, ids),
            EntityKind::TransactionSplit => store::mark_synced::<TransactionSplit>(conn, ids),
            EntityKind::Transfer => store::mark_synced::<Transfer>(conn, ids),
            EntityKind::Payable => store::mark_synced::<Payable>(conn, ids),
            EntityKind::Budget => store::mark_synced::<Budget>(conn, ids),
            EntityKind::Goal => store::mark_synced::<Goal>(conn, ids),
        })?;
        info!(kind = %kind, requested = ids.len(), changed, "records marked synced");
        Ok(changed)
    }

    /// Last-write-wins by `updated_at`. Returns whether the local row changed.
    pub fn upsert_from_cloud(&mut self, record: SyncRecord) -> Result<bool> {
        let (kind, id) = (record.kind(), record.id());
        let applied = self.store.scoped(|conn| apply_record(conn, record))?;
        debug!(kind = %kind, %id, applied, "cloud upsert");
        Ok(applied)
    }

    /// Applies a batch in one scope; any failure leaves the store untouched.
    pub fn upsert_batch_from_cloud(&mut self, records: Vec<SyncRecord>) -> Result<usize> {
        let total = records.len();
        let applied = self.store.scoped(|conn| {
            let mut applied = 0;
            for record in records {
                if apply_record(conn, record)? {
                    applied += 1;
                }
            }
            Ok(applied)
        })?;
        info!(total, applied, "cloud batch applied");
        Ok(applied)
    }
}
