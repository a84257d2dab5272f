// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, Row, params};
use uuid::Uuid;

use super::{Record, date_at, decimal_at, meta_at, uuid_at};
use crate::models::{RecordMeta, Transfer};
use crate::utils::format_stamp;

impl Record for Transfer {
    const TABLE: &'static str = "transfers";
    const ENTITY: &'static str = "transfer";
    const COLUMNS: &'static str = "id, from_account_id, to_account_id, amount, date, note, \
        from_transaction_id, to_transaction_id, sync_status, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Transfer {
            id: uuid_at(row, 0)?,
            from_account_id: uuid_at(row, 1)?,
            to_account_id: uuid_at(row, 2)?,
            amount: decimal_at(row, 3)?,
            date: date_at(row, 4)?,
            note: row.get(5)?,
            from_transaction_id: uuid_at(row, 6)?,
            to_transaction_id: uuid_at(row, 7)?,
            meta: meta_at(row, 8)?,
        })
    }

    fn save(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.prepare_cached(
            "INSERT INTO transfers(id, from_account_id, to_account_id, amount, date, note,
                from_transaction_id, to_transaction_id, sync_status, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11)
             ON CONFLICT(id) DO UPDATE SET
                from_account_id=excluded.from_account_id, to_account_id=excluded.to_account_id,
                amount=excluded.amount, date=excluded.date, note=excluded.note,
                from_transaction_id=excluded.from_transaction_id,
                to_transaction_id=excluded.to_transaction_id, sync_status=excluded.sync_status,
                created_at=excluded.created_at, updated_at=excluded.updated_at",
        )?
        .execute(params![
            self.id.to_string(),
            self.from_account_id.to_string(),
            self.to_account_id.to_string(),
            self.amount.to_string(),
            self.date.to_string(),
            self.note,
            self.from_transaction_id.to_string(),
            self.to_transaction_id.to_string(),
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
