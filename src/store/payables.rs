// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};
use uuid::Uuid;

use super::{
    Record, date_at, decimal_at, invalid_row, json_at, meta_at, opt_date_at, opt_decimal_at,
    opt_text, opt_uuid_at, uuid_at,
};
use crate::error::{LedgerError, Result};
use crate::models::{Payable, PayableSchedule, PaymentRecord, RecordMeta, RecurrenceRule};
use crate::utils::format_stamp;

impl Record for Payable {
    const TABLE: &'static str = "payables";
    const ENTITY: &'static str = "payable";
    const COLUMNS: &'static str = "id, name, amount, due_date, category_id, note, is_paid, \
        paid_date, paid_from_account_id, linked_transaction_id, paid_amount, is_recurring, \
        recurrence_rule, parent_payable_id, sync_status, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let is_paid: bool = row.get(6)?;
        let paid = (
            opt_date_at(row, 7)?,
            opt_uuid_at(row, 8)?,
            opt_uuid_at(row, 9)?,
            opt_decimal_at(row, 10)?,
        );
        let payment = match (is_paid, paid) {
            (true, (Some(paid_date), Some(paid_from_account_id), Some(linked_transaction_id), Some(amount))) => {
                Some(PaymentRecord {
                    paid_date,
                    paid_from_account_id,
                    linked_transaction_id,
                    amount,
                })
            }
            (false, (None, None, None, None)) => None,
            _ => return Err(invalid_row(6, "paid fields must be set or cleared together")),
        };

        let is_recurring: bool = row.get(11)?;
        let rule: Option<RecurrenceRule> = json_at(row, 12)?;
        let schedule = match (is_recurring, rule) {
            (true, Some(rule)) => PayableSchedule::Recurring { rule },
            (false, None) => PayableSchedule::OneOff,
            _ => return Err(invalid_row(11, "recurring flag disagrees with recurrence rule")),
        };

        Ok(Payable {
            id: uuid_at(row, 0)?,
            name: row.get(1)?,
            amount: decimal_at(row, 2)?,
            due_date: date_at(row, 3)?,
            category_id: row.get(4)?,
            note: row.get(5)?,
            schedule,
            payment,
            parent_payable_id: opt_uuid_at(row, 13)?,
            meta: meta_at(row, 14)?,
        })
    }

    fn save(&self, conn: &Connection) -> rusqlite::Result<()> {
        let rule = self
            .schedule
            .rule()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let payment = self.payment.as_ref();
        conn.prepare_cached(
            "INSERT INTO payables(id, name, amount, due_date, category_id, note, is_paid,
                paid_date, paid_from_account_id, linked_transaction_id, paid_amount,
                is_recurring, recurrence_rule, parent_payable_id, sync_status, created_at,
                updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17)
             ON CONFLICT(id) DO UPDATE SET
                name=excluded.name, amount=excluded.amount, due_date=excluded.due_date,
                category_id=excluded.category_id, note=excluded.note, is_paid=excluded.is_paid,
                paid_date=excluded.paid_date, paid_from_account_id=excluded.paid_from_account_id,
                linked_transaction_id=excluded.linked_transaction_id,
                paid_amount=excluded.paid_amount, is_recurring=excluded.is_recurring,
                recurrence_rule=excluded.recurrence_rule,
                parent_payable_id=excluded.parent_payable_id, sync_status=excluded.sync_status,
                created_at=excluded.created_at, updated_at=excluded.updated_at",
        )?
        .execute(params![
            self.id.to_string(),
            self.name,
            self.amount.to_string(),
            self.due_date.to_string(),
            self.category_id,
            self.note,
            self.is_paid(),
            payment.map(|p| p.paid_date.to_string()),
            payment.map(|p| p.paid_from_account_id.to_string()),
            payment.map(|p| p.linked_transaction_id.to_string()),
            payment.map(|p| p.amount.to_string()),
            self.is_recurring(),
            rule,
            opt_text(&self.parent_payable_id),
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

pub fn list(conn: &Connection, include_paid: bool) -> Result<Vec<Payable>> {
    if include_paid {
        super::select(conn, "ORDER BY due_date, name", [])
    } else {
        super::select(conn, "AND is_paid=0 ORDER BY due_date, name", [])
    }
}

pub fn unpaid_due_between(
    conn: &Connection,
    from: Option<NaiveDate>,
    to: NaiveDate,
) -> Result<Vec<Payable>> {
    match from {
        Some(from) => super::select(
            conn,
            "AND is_paid=0 AND due_date>=?1 AND due_date<=?2 ORDER BY due_date, name",
            params![from.to_string(), to.to_string()],
        ),
        None => super::select(
            conn,
            "AND is_paid=0 AND due_date<=?1 ORDER BY due_date, name",
            params![to.to_string()],
        ),
    }
}

pub fn live_successor(conn: &Connection, parent_id: Uuid) -> Result<Option<Payable>> {
    let mut found: Vec<Payable> = super::select(
        conn,
        "AND parent_payable_id=?1 ORDER BY created_at",
        params![parent_id.to_string()],
    )?;
    if found.len() > 1 {
        return Err(LedgerError::Corrupt(format!(
            "payable {} has {} live successors",
            parent_id,
            found.len()
        )));
    }
    Ok(found.pop())
}
