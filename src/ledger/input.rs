// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{AccountTerms, BudgetPeriod, Direction, PayableSchedule};

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub terms: AccountTerms,
    pub opening_balance: Decimal,
}

impl NewAccount {
    pub fn bank(name: impl Into<String>, opening_balance: Decimal) -> Self {
        Self {
            name: name.into(),
            terms: AccountTerms::Bank,
            opening_balance,
        }
    }

    pub fn credit(name: impl Into<String>, owed: Decimal, credit_limit: Option<Decimal>) -> Self {
        Self {
            name: name.into(),
            terms: AccountTerms::Credit {
                credit_limit,
                payment_due_day: None,
                apr: None,
            },
            opening_balance: owed,
        }
    }

    pub fn loan(name: impl Into<String>, owed: Decimal) -> Self {
        Self {
            name: name.into(),
            terms: AccountTerms::Loan {
                principal: Some(owed),
                rate: None,
                payment_schedule: None,
            },
            opening_balance: owed,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub terms: Option<AccountTerms>,
    pub is_active: Option<bool>,
    /// When set, the update fails with `Conflict` unless the stored record still carries this stamp.
    pub expected_updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub direction: Direction,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category_id: Option<String>,
    pub payee: Option<String>,
    pub note: Option<String>,
    pub allow_overdraft: bool,
}

impl NewTransaction {
    pub fn new(account_id: Uuid, direction: Direction, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            account_id,
            direction,
            amount,
            date,
            category_id: None,
            payee: None,
            note: None,
            allow_overdraft: false,
        }
    }

    pub fn debit(account_id: Uuid, amount: Decimal, date: NaiveDate) -> Self {
        Self::new(account_id, Direction::Debit, amount, date)
    }

    pub fn credit(account_id: Uuid, amount: Decimal, date: NaiveDate) -> Self {
        Self::new(account_id, Direction::Credit, amount, date)
    }

    pub fn category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = Some(payee.into());
        self
    }
}

/// `Some(None)` on a nested option clears the field.
#[derive(Debug, Clone, Default)]
pub struct TransactionChanges {
    pub account_id: Option<Uuid>,
    pub direction: Option<Direction>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
    pub category_id: Option<Option<String>>,
    pub payee: Option<Option<String>>,
    pub note: Option<Option<String>>,
    pub allow_overdraft: bool,
}

#[derive(Debug, Clone)]
pub struct NewSplit {
    pub category_id: Option<String>,
    pub amount: Decimal,
    pub note: Option<String>,
}

impl NewSplit {
    pub fn new(category_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            category_id: Some(category_id.into()),
            amount,
            note: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub allow_overdraft: bool,
}

impl NewTransfer {
    pub fn new(from_account_id: Uuid, to_account_id: Uuid, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
            date,
            note: None,
            allow_overdraft: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPayable {
    pub name: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub category_id: Option<String>,
    pub note: Option<String>,
    pub schedule: PayableSchedule,
}

impl NewPayable {
    pub fn new(name: impl Into<String>, amount: Decimal, due_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            amount,
            due_date,
            category_id: None,
            note: None,
            schedule: PayableSchedule::OneOff,
        }
    }

    pub fn schedule(mut self, schedule: PayableSchedule) -> Self {
        self.schedule = schedule;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PayableChanges {
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub category_id: Option<Option<String>>,
    pub note: Option<Option<String>>,
    pub schedule: Option<PayableSchedule>,
}

#[derive(Debug, Clone)]
pub struct MarkPaid {
    pub payable_id: Uuid,
    pub from_account_id: Uuid,
    /// Defaults to the payable's amount.
    pub actual_amount: Option<Decimal>,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    pub allow_overdraft: bool,
}

impl MarkPaid {
    pub fn new(payable_id: Uuid, from_account_id: Uuid) -> Self {
        Self {
            payable_id,
            from_account_id,
            actual_amount: None,
            date: None,
            allow_overdraft: false,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub name: String,
    pub category_id: Option<String>,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub rollover: bool,
    pub alert_threshold: u8,
}

impl NewBudget {
    pub fn new(name: impl Into<String>, amount: Decimal, period: BudgetPeriod, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            category_id: None,
            amount,
            period,
            start_date,
            rollover: false,
            alert_threshold: 80,
        }
    }

    pub fn category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_rollover(mut self) -> Self {
        self.rollover = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct BudgetChanges {
    pub name: Option<String>,
    pub category_id: Option<Option<String>>,
    pub amount: Option<Decimal>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<NaiveDate>,
    pub rollover: Option<bool>,
    pub alert_threshold: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: Decimal,
    pub linked_account_id: Option<Uuid>,
    pub target_date: Option<NaiveDate>,
}

impl NewGoal {
    pub fn new(name: impl Into<String>, target_amount: Decimal) -> Self {
        Self {
            name: name.into(),
            target_amount,
            linked_account_id: None,
            target_date: None,
        }
    }
}
