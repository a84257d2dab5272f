// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::{Connection, Row, ToSql, params};
use uuid::Uuid;

use super::{
    Record, date_at, decimal_at, invalid_row, meta_at, opt_text, opt_uuid_at, text_enum_at,
    uuid_at,
};
use crate::error::Result;
use crate::models::{RecordMeta, Transaction, TransactionSource};
use crate::utils::format_stamp;

impl Record for Transaction {
    const TABLE: &'static str = "transactions";
    const ENTITY: &'static str = "transaction";
    const COLUMNS: &'static str = "id, account_id, direction, amount, date, category_id, payee, \
        note, source, transfer_id, linked_payable_id, is_split, is_reconciled, \
        sync_status, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let source_kind: String = row.get(8)?;
        let transfer_id = opt_uuid_at(row, 9)?;
        let payable_id = opt_uuid_at(row, 10)?;
        let source = match (source_kind.as_str(), transfer_id, payable_id) {
            ("direct", None, None) => TransactionSource::Direct,
            ("adjustment", None, None) => TransactionSource::Adjustment,
            ("transfer", Some(transfer_id), None) => TransactionSource::Transfer { transfer_id },
            ("payable", None, Some(payable_id)) => TransactionSource::Payable { payable_id },
            (other, _, _) => {
                return Err(invalid_row(
                    8,
                    format!("transaction source '{}' with mismatched links", other),
                ));
            }
        };
        Ok(Transaction {
            id: uuid_at(row, 0)?,
            account_id: uuid_at(row, 1)?,
            direction: text_enum_at(row, 2)?,
            amount: decimal_at(row, 3)?,
            date: date_at(row, 4)?,
            category_id: row.get(5)?,
            payee: row.get(6)?,
            note: row.get(7)?,
            source,
            is_split: row.get(11)?,
            is_reconciled: row.get(12)?,
            meta: meta_at(row, 13)?,
        })
    }

    fn save(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.prepare_cached(
            "INSERT INTO transactions(id, account_id, direction, amount, date, category_id,
                payee, note, source, transfer_id, linked_payable_id, is_split, is_reconciled,
                sync_status, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)
             ON CONFLICT(id) DO UPDATE SET
                account_id=excluded.account_id, direction=excluded.direction,
                amount=excluded.amount, date=excluded.date, category_id=excluded.category_id,
                payee=excluded.payee, note=excluded.note, source=excluded.source,
                transfer_id=excluded.transfer_id, linked_payable_id=excluded.linked_payable_id,
                is_split=excluded.is_split, is_reconciled=excluded.is_reconciled,
                sync_status=excluded.sync_status, created_at=excluded.created_at,
                updated_at=excluded.updated_at",
        )?
        .execute(params![
            self.id.to_string(),
            self.account_id.to_string(),
            self.direction.as_str(),
            self.amount.to_string(),
            self.date.to_string(),
            self.category_id,
            self.payee,
            self.note,
            self.source.as_str(),
            opt_text(&self.transfer_id()),
            opt_text(&self.linked_payable_id()),
            self.is_split,
            self.is_reconciled,
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

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub account_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category_id: Option<String>,
}

pub fn list(conn: &Connection, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
    let mut clause = String::new();
    let mut values: Vec<String> = Vec::new();

    if let Some(id) = filter.account_id {
        values.push(id.to_string());
        clause.push_str(&format!(" AND account_id=?{}", values.len()));
    }
    if let Some(from) = filter.from {
        values.push(from.to_string());
        clause.push_str(&format!(" AND date>=?{}", values.len()));
    }
    if let Some(to) = filter.to {
        values.push(to.to_string());
        clause.push_str(&format!(" AND date<=?{}", values.len()));
    }
    if let Some(cat) = &filter.category_id {
        values.push(cat.clone());
        clause.push_str(&format!(" AND category_id=?{}", values.len()));
    }
    clause.push_str(" ORDER BY date DESC, created_at DESC");

    let params: Vec<&dyn ToSql> = values.iter().map(|s| s as &dyn ToSql).collect();
    super::select(conn, &clause, rusqlite::params_from_iter(params))
}

pub fn for_account(conn: &Connection, account_id: Uuid) -> Result<Vec<Transaction>> {
    super::select(
        conn,
        "AND account_id=?1 ORDER BY date, created_at",
        params![account_id.to_string()],
    )
}

pub fn debits_between(conn: &Connection, from: NaiveDate, to: NaiveDate) -> Result<Vec<Transaction>> {
    super::select(
        conn,
        "AND direction='debit' AND date>=?1 AND date<=?2 ORDER BY date",
        params![from.to_string(), to.to_string()],
    )
}
