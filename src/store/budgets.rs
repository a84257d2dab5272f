// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, Row, params};
use uuid::Uuid;

use super::{Record, date_at, decimal_at, meta_at, opt_date_at, opt_day, text_enum_at, uuid_at};
use crate::models::{Budget, RecordMeta};
use crate::utils::format_stamp;

impl Record for Budget {
    const TABLE: &'static str = "budgets";
    const ENTITY: &'static str = "budget";
    const COLUMNS: &'static str = "id, name, category_id, amount, period, start_date, rollover, \
        rolled_amount, alert_threshold, last_rollover_start, sync_status, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Budget {
            id: uuid_at(row, 0)?,
            name: row.get(1)?,
            category_id: row.get(2)?,
            amount: decimal_at(row, 3)?,
            period: text_enum_at(row, 4)?,
            start_date: date_at(row, 5)?,
            rollover: row.get(6)?,
            rolled_amount: decimal_at(row, 7)?,
            alert_threshold: row.get(8)?,
            last_rollover_start: opt_date_at(row, 9)?,
            meta: meta_at(row, 10)?,
        })
    }

    fn save(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.prepare_cached(
            "INSERT INTO budgets(id, name, category_id, amount, period, start_date, rollover,
                rolled_amount, alert_threshold, last_rollover_start, sync_status, created_at,
                updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13)
             ON CONFLICT(id) DO UPDATE SET
                name=excluded.name, category_id=excluded.category_id, amount=excluded.amount,
                period=excluded.period, start_date=excluded.start_date,
                rollover=excluded.rollover, rolled_amount=excluded.rolled_amount,
                alert_threshold=excluded.alert_threshold,
                last_rollover_start=excluded.last_rollover_start,
                sync_status=excluded.sync_status, created_at=excluded.created_at,
                updated_at=excluded.updated_at",
        )?
        .execute(params![
            self.id.to_string(),
            self.name,
            self.category_id,
            self.amount.to_string(),
            self.period.as_str(),
            self.start_date.to_string(),
            self.rollover,
            self.rolled_amount.to_string(),
            self.alert_threshold,
            opt_day(&self.last_rollover_start),
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
