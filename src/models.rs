// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::utils::{last_day_of_month, now_stamp, stamp_after};

#[derive(Error, Debug)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a fieldless enum persisted as a lowercase TEXT column.
macro_rules! text_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $label,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum!(SyncStatus, "sync status", {
    Synced => "synced",
    Dirty => "dirty",
    Deleted => "deleted",
});

text_enum!(AccountKind, "account kind", {
    Bank => "bank",
    Credit => "credit",
    Loan => "loan",
});

text_enum!(Direction, "direction", {
    Debit => "debit",
    Credit => "credit",
});

text_enum!(PaymentSchedule, "payment schedule", {
    Weekly => "weekly",
    Biweekly => "biweekly",
    Monthly => "monthly",
});

text_enum!(BudgetPeriod, "budget period", {
    Daily => "daily",
    Weekly => "weekly",
    Biweekly => "biweekly",
    Monthly => "monthly",
    Yearly => "yearly",
});

/// Sync bookkeeping carried by every persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordMeta {
    pub fn new() -> Self {
        let now = now_stamp();
        Self {
            sync_status: SyncStatus::Dirty,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks a local change. `updated_at` strictly increases even within one clock tick.
    pub fn touch(&mut self) {
        if self.sync_status != SyncStatus::Deleted {
            self.sync_status = SyncStatus::Dirty;
        }
        self.updated_at = stamp_after(self.updated_at);
    }

    pub fn tombstone(&mut self) {
        self.sync_status = SyncStatus::Deleted;
        self.updated_at = stamp_after(self.updated_at);
    }

    pub fn is_deleted(&self) -> bool {
        self.sync_status == SyncStatus::Deleted
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Mode-specific account fields. A bank account cannot carry a credit limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountTerms {
    Bank,
    Credit {
        credit_limit: Option<Decimal>,
        payment_due_day: Option<u32>,
        apr: Option<Decimal>,
    },
    Loan {
        principal: Option<Decimal>,
        rate: Option<Decimal>,
        payment_schedule: Option<PaymentSchedule>,
    },
}

impl AccountTerms {
    pub fn kind(&self) -> AccountKind {
        match self {
            Self::Bank => AccountKind::Bank,
            Self::Credit { .. } => AccountKind::Credit,
            Self::Loan { .. } => AccountKind::Loan,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub terms: AccountTerms,
    /// For credit and loan accounts this is the amount owed.
    pub balance: Decimal,
    pub opening_balance: Decimal,
    pub is_active: bool,
    pub meta: RecordMeta,
}

impl Account {
    pub fn kind(&self) -> AccountKind {
        self.terms.kind()
    }

    pub fn available_credit(&self) -> Option<Decimal> {
        match self.terms {
            AccountTerms::Credit {
                credit_limit: Some(limit),
                ..
            } => Some(limit - self.balance),
            _ => None,
        }
    }

    /// A credit account with an outstanding balance past this month's due day.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        let AccountTerms::Credit {
            payment_due_day: Some(day),
            ..
        } = self.terms
        else {
            return false;
        };
        let due = day.min(last_day_of_month(today.year(), today.month()));
        self.balance > Decimal::ZERO && today.day() > due
    }
}

/// How a transaction came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionSource {
    Direct,
    Transfer { transfer_id: Uuid },
    Payable { payable_id: Uuid },
    Adjustment,
}

impl TransactionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Transfer { .. } => "transfer",
            Self::Payable { .. } => "payable",
            Self::Adjustment => "adjustment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub direction: Direction,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category_id: Option<String>,
    pub payee: Option<String>,
    pub note: Option<String>,
    pub source: TransactionSource,
    pub is_split: bool,
    pub is_reconciled: bool,
    pub meta: RecordMeta,
}

impl Transaction {
    pub fn transfer_id(&self) -> Option<Uuid> {
        match self.source {
            TransactionSource::Transfer { transfer_id } => Some(transfer_id),
            _ => None,
        }
    }

    pub fn linked_payable_id(&self) -> Option<Uuid> {
        match self.source {
            TransactionSource::Payable { payable_id } => Some(payable_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSplit {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub category_id: Option<String>,
    pub amount: Decimal,
    pub note: Option<String>,
    pub meta: RecordMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: Uuid,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: Option<String>,
    pub from_transaction_id: Uuid,
    pub to_transaction_id: Uuid,
    pub meta: RecordMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frequency {
    Daily {
        interval: u32,
    },
    Weekly {
        interval: u32,
        day_of_week: Option<Weekday>,
    },
    Biweekly {
        interval: u32,
        day_of_week: Option<Weekday>,
    },
    Monthly {
        interval: u32,
        day_of_month: Option<u32>,
    },
    Yearly {
        interval: u32,
    },
}

impl Frequency {
    pub fn interval(&self) -> u32 {
        match *self {
            Self::Daily { interval }
            | Self::Weekly { interval, .. }
            | Self::Biweekly { interval, .. }
            | Self::Monthly { interval, .. }
            | Self::Yearly { interval } => interval,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PayableSchedule {
    OneOff,
    Recurring { rule: RecurrenceRule },
}

impl PayableSchedule {
    pub fn rule(&self) -> Option<&RecurrenceRule> {
        match self {
            Self::OneOff => None,
            Self::Recurring { rule } => Some(rule),
        }
    }
}

/// Paid-state fields; present or absent as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub paid_date: NaiveDate,
    pub paid_from_account_id: Uuid,
    pub linked_transaction_id: Uuid,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payable {
    pub id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub category_id: Option<String>,
    pub note: Option<String>,
    pub schedule: PayableSchedule,
    pub payment: Option<PaymentRecord>,
    pub parent_payable_id: Option<Uuid>,
    pub meta: RecordMeta,
}

impl Payable {
    pub fn is_paid(&self) -> bool {
        self.payment.is_some()
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self.schedule, PayableSchedule::Recurring { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub name: String,
    /// `None` budgets track all spending.
    pub category_id: Option<String>,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    pub rollover: bool,
    pub rolled_amount: Decimal,
    /// Percent of the effective limit at which the budget alerts.
    pub alert_threshold: u8,
    pub last_rollover_start: Option<NaiveDate>,
    pub meta: RecordMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub linked_account_id: Option<Uuid>,
    pub target_date: Option<NaiveDate>,
    pub is_completed: bool,
    pub meta: RecordMeta,
}
