// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{
    Record, decimal_at, invalid_row, meta_at, opt_decimal_at, opt_num, require, text_enum_at,
    uuid_at,
};
use crate::error::Result;
use crate::models::{Account, AccountKind, AccountTerms, PaymentSchedule, RecordMeta};
use crate::utils::format_stamp;

impl Record for Account {
    const TABLE: &'static str = "accounts";
    const ENTITY: &'static str = "account";
    const COLUMNS: &'static str = "id, name, kind, balance, opening_balance, credit_limit, \
        payment_due_day, apr, principal, rate, payment_schedule, is_active, \
        sync_status, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let kind: AccountKind = text_enum_at(row, 2)?;
        let credit_limit = opt_decimal_at(row, 5)?;
        let payment_due_day: Option<u32> = row.get(6)?;
        let apr = opt_decimal_at(row, 7)?;
        let principal = opt_decimal_at(row, 8)?;
        let rate = opt_decimal_at(row, 9)?;
        let schedule: Option<String> = row.get(10)?;
        let payment_schedule = schedule
            .map(|s| s.parse::<PaymentSchedule>())
            .transpose()
            .map_err(|e| invalid_row(10, e.to_string()))?;

        let credit_fields = credit_limit.is_some() || payment_due_day.is_some() || apr.is_some();
        let loan_fields = principal.is_some() || rate.is_some() || payment_schedule.is_some();
        let terms = match kind {
            AccountKind::Bank if credit_fields || loan_fields => {
                return Err(invalid_row(2, "bank account with credit or loan terms"));
            }
            AccountKind::Credit if loan_fields => {
                return Err(invalid_row(2, "credit account with loan terms"));
            }
            AccountKind::Loan if credit_fields => {
                return Err(invalid_row(2, "loan account with credit terms"));
            }
            AccountKind::Bank => AccountTerms::Bank,
            AccountKind::Credit => AccountTerms::Credit {
                credit_limit,
                payment_due_day,
                apr,
            },
            AccountKind::Loan => AccountTerms::Loan {
                principal,
                rate,
                payment_schedule,
            },
        };

        Ok(Account {
            id: uuid_at(row, 0)?,
            name: row.get(1)?,
            terms,
            balance: decimal_at(row, 3)?,
            opening_balance: decimal_at(row, 4)?,
            is_active: row.get(11)?,
            meta: meta_at(row, 12)?,
        })
    }

    fn save(&self, conn: &Connection) -> rusqlite::Result<()> {
        let (credit_limit, payment_due_day, apr, principal, rate, schedule) = match &self.terms {
            AccountTerms::Bank => (None, None, None, None, None, None),
            AccountTerms::Credit {
                credit_limit,
                payment_due_day,
                apr,
            } => (*credit_limit, *payment_due_day, *apr, None, None, None),
            AccountTerms::Loan {
                principal,
                rate,
                payment_schedule,
            } => (None, None, None, *principal, *rate, payment_schedule.map(|s| s.as_str())),
        };
        conn.prepare_cached(
            "INSERT INTO accounts(id, name, kind, balance, opening_balance, credit_limit,
                payment_due_day, apr, principal, rate, payment_schedule, is_active,
                sync_status, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15)
             ON CONFLICT(id) DO UPDATE SET
                name=excluded.name, kind=excluded.kind, balance=excluded.balance,
                opening_balance=excluded.opening_balance, credit_limit=excluded.credit_limit,
                payment_due_day=excluded.payment_due_day, apr=excluded.apr,
                principal=excluded.principal, rate=excluded.rate,
                payment_schedule=excluded.payment_schedule, is_active=excluded.is_active,
                sync_status=excluded.sync_status, created_at=excluded.created_at,
                updated_at=excluded.updated_at",
        )?
        .execute(params![
            self.id.to_string(),
            self.name,
            self.kind().as_str(),
            self.balance.to_string(),
            self.opening_balance.to_string(),
            opt_num(&credit_limit),
            payment_due_day,
            opt_num(&apr),
            opt_num(&principal),
            opt_num(&rate),
            schedule,
            self.is_active,
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

/// Read-modify-write of one balance; callers run it inside a scoped transaction.
pub fn apply_delta(conn: &Connection, id: Uuid, delta: Decimal) -> Result<Account> {
    let mut account: Account = require(conn, id)?;
    account.balance += delta;
    account.meta.touch();
    account.save(conn)?;
    Ok(account)
}

pub fn list(conn: &Connection) -> Result<Vec<Account>> {
    super::select(conn, "ORDER BY name, created_at", [])
}

pub fn has_live_transactions(conn: &Connection, id: Uuid) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE account_id=?1 AND sync_status!='deleted'",
        params![id.to_string()],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}
