// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use super::LedgerEngine;
use super::accounts::AccountSummary;
use crate::error::{LedgerError, Result};
use crate::models::Payable;
use crate::store::{accounts, payables};

/// Spendable cash after reserving for bills due by `target_date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Draft {
    pub today: NaiveDate,
    pub target_date: NaiveDate,
    pub available_balance: Decimal,
    pub payables_total: Decimal,
    pub payables: Vec<Payable>,
    pub safe_to_spend: Decimal,
    pub bank_total: Decimal,
    pub credit_total: Decimal,
    pub loan_total: Decimal,
    pub net_worth: Decimal,
}

impl LedgerEngine {
    pub fn get_draft(
        &self,
        today: NaiveDate,
        target_date: NaiveDate,
        include_overdue: bool,
    ) -> Result<Draft> {
        if target_date < today {
            return Err(LedgerError::validation(format!(
                "draft target {} is before today {}",
                target_date, today
            )));
        }
        let conn = self.store.conn();
        let summary = AccountSummary::from_accounts(&accounts::list(conn)?);
        let from = (!include_overdue).then_some(today);
        let due = payables::unpaid_due_between(conn, from, target_date)?;
        let payables_total: Decimal = due.iter().map(|p| p.amount).sum();
        let available_balance = summary.bank_total;
        Ok(Draft {
            today,
            target_date,
            available_balance,
            payables_total,
            payables: due,
            safe_to_spend: (available_balance - payables_total).max(Decimal::ZERO),
            bank_total: summary.bank_total,
            credit_total: summary.credit_total,
            loan_total: summary.loan_total,
            net_worth: summary.net_worth,
        })
    }

    /// Draft over the configured horizon.
    pub fn get_draft_default(&self, today: NaiveDate) -> Result<Draft> {
        let target = today + Duration::days(i64::from(self.settings.draft_horizon_days));
        self.get_draft(today, target, self.settings.draft_include_overdue)
    }
}
