// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, Row, params};
use uuid::Uuid;

use super::{Record, decimal_at, meta_at, opt_date_at, opt_day, opt_text, opt_uuid_at, uuid_at};
use crate::models::{Goal, RecordMeta};
use crate::utils::format_stamp;

impl Record for Goal {
    const TABLE: &'static str = "goals";
    const ENTITY: &'static str = "goal";
    const COLUMNS: &'static str = "id, name, target_amount, current_amount, linked_account_id, \
        target_date, is_completed, sync_status, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Goal {
            id: uuid_at(row, 0)?,
            name: row.get(1)?,
            target_amount: decimal_at(row, 2)?,
            current_amount: decimal_at(row, 3)?,
            linked_account_id: opt_uuid_at(row, 4)?,
            target_date: opt_date_at(row, 5)?,
            is_completed: row.get(6)?,
            meta: meta_at(row, 7)?,
        })
    }

    fn save(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.prepare_cached(
            "INSERT INTO goals(id, name, target_amount, current_amount, linked_account_id,
                target_date, is_completed, sync_status, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10)
             ON CONFLICT(id) DO UPDATE SET
                name=excluded.name, target_amount=excluded.target_amount,
                current_amount=excluded.current_amount,
                linked_account_id=excluded.linked_account_id, target_date=excluded.target_date,
                is_completed=excluded.is_completed, sync_status=excluded.sync_status,
                created_at=excluded.created_at, updated_at=excluded.updated_at",
        )?
        .execute(params![
            self.id.to_string(),
            self.name,
            self.target_amount.to_string(),
            self.current_amount.to_string(),
            opt_text(&self.linked_account_id),
            opt_day(&self.target_date),
            self.is_completed,
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
