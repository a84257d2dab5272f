// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, Row, params};
use uuid::Uuid;

use super::{Record, decimal_at, meta_at, uuid_at};
use crate::error::Result;
use crate::models::{RecordMeta, TransactionSplit};
use crate::utils::format_stamp;

impl Record for TransactionSplit {
    const TABLE: &'static str = "transaction_splits";
    const ENTITY: &'static str = "transaction split";
    const COLUMNS: &'static str =
        "id, transaction_id, category_id, amount, note, sync_status, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(TransactionSplit {
            id: uuid_at(row, 0)?,
            transaction_id: uuid_at(row, 1)?,
            category_id: row.get(2)?,
            amount: decimal_at(row, 3)?,
            note: row.get(4)?,
            meta: meta_at(row, 5)?,
        })
    }

    fn save(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.prepare_cached(
            "INSERT INTO transaction_splits(id, transaction_id, category_id, amount, note,
                sync_status, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
             ON CONFLICT(id) DO UPDATE SET
                transaction_id=excluded.transaction_id, category_id=excluded.category_id,
                amount=excluded.amount, note=excluded.note, sync_status=excluded.sync_status,
                created_at=excluded.created_at, updated_at=excluded.updated_at",
        )?
        .execute(params![
            self.id.to_string(),
            self.transaction_id.to_string(),
            self.category_id,
            self.amount.to_string(),
            self.note,
            self.meta.sync_status.as_str(),
            format_stamp(&self.meta.created_at),
            format_stamp(&self.meta.updated_at),
        ])?;
        Ok(())
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

pub fn for_transaction(conn: &Connection, transaction_id: Uuid) -> Result<Vec<TransactionSplit>> {
    super::select(
        conn,
        "AND transaction_id=?1 ORDER BY created_at",
        params![transaction_id.to_string()],
    )
}

pub fn tombstone_all(conn: &Connection, transaction_id: Uuid) -> Result<usize> {
    let live = for_transaction(conn, transaction_id)?;
    for mut split in live.iter().cloned() {
        split.meta.tombstone();
        split.save(conn)?;
    }
    Ok(live.len())
}
