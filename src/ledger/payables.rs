// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::LedgerEngine;
use super::input::{MarkPaid, NewPayable, PayableChanges};
use super::posting::{self, Entry};
use crate::error::{LedgerError, Result};
use crate::models::{
    Direction, Payable, PayableSchedule, PaymentRecord, RecordMeta, Transaction, TransactionSource,
};
use crate::recurrence::{anchor_rule, next_occurrence, reanchor_rule, validate_rule};
use crate::store::{self, Record, payables};
use crate::utils::{normalize_text, require_positive, today};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentOutcome {
    pub payable: Payable,
    pub transaction: Transaction,
    pub successor: Option<Payable>,
}

fn prepare_schedule(schedule: PayableSchedule, due: NaiveDate) -> Result<PayableSchedule> {
    match schedule {
        PayableSchedule::OneOff => Ok(PayableSchedule::OneOff),
        PayableSchedule::Recurring { rule } => {
            validate_rule(&rule)?;
            Ok(PayableSchedule::Recurring {
                rule: anchor_rule(rule, due),
            })
        }
    }
}

fn validate_payable_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("payable name must not be empty"));
    }
    Ok(name.to_string())
}

/// The next instance of a recurring payable, reusing one left behind by an
/// earlier payment.
fn successor_for(conn: &Connection, paid: &Payable) -> Result<Option<Payable>> {
    let Some(rule) = paid.schedule.rule() else {
        return Ok(None);
    };
    if let Some(existing) = payables::live_successor(conn, paid.id)? {
        debug!(payable_id = %paid.id, successor_id = %existing.id, "reusing successor");
        return Ok(Some(existing));
    }
    let Some(due_date) = next_occurrence(paid.due_date, rule) else {
        debug!(payable_id = %paid.id, "recurrence ended");
        return Ok(None);
    };
    let next = Payable {
        id: Uuid::new_v4(),
        name: paid.name.clone(),
        amount: paid.amount,
        due_date,
        category_id: paid.category_id.clone(),
        note: paid.note.clone(),
        schedule: paid.schedule,
        payment: None,
        parent_payable_id: Some(paid.id),
        meta: RecordMeta::new(),
    };
    next.save(conn)?;
    Ok(Some(next))
}

impl LedgerEngine {
    pub fn create_payable(&mut self, input: NewPayable) -> Result<Payable> {
        let name = validate_payable_name(&input.name)?;
        require_positive(input.amount, "payable amount")?;
        let payable = Payable {
            id: Uuid::new_v4(),
            name,
            amount: input.amount,
            due_date: input.due_date,
            category_id: normalize_text(input.category_id),
            note: normalize_text(input.note),
            schedule: prepare_schedule(input.schedule, input.due_date)?,
            payment: None,
            parent_payable_id: None,
            meta: RecordMeta::new(),
        };
        self.store.scoped(|conn| Ok(payable.save(conn)?))?;
        info!(payable_id = %payable.id, due = %payable.due_date, amount = %payable.amount, "payable created");
        Ok(payable)
    }

    pub fn update_payable(&mut self, id: Uuid, changes: PayableChanges) -> Result<Payable> {
        let name = changes.name.as_deref().map(validate_payable_name).transpose()?;
        if let Some(amount) = changes.amount {
            require_positive(amount, "payable amount")?;
        }
        let payable = self.store.scoped(|conn| {
            let mut payable: Payable = store::require(conn, id)?;
            if payable.is_paid() && (changes.amount.is_some() || changes.due_date.is_some()) {
                return Err(LedgerError::validation(
                    "mark the payable unpaid before changing its amount or due date",
                ));
            }
            if let Some(name) = name {
                payable.name = name;
            }
            if let Some(amount) = changes.amount {
                payable.amount = amount;
            }
            if let Some(due_date) = changes.due_date {
                payable.due_date = due_date;
                if let PayableSchedule::Recurring { rule } = payable.schedule {
                    payable.schedule = PayableSchedule::Recurring {
                        rule: reanchor_rule(rule, due_date),
                    };
                }
            }
            if let Some(category_id) = changes.category_id {
                payable.category_id = normalize_text(category_id);
            }
            if let Some(note) = changes.note {
                payable.note = normalize_text(note);
            }
            if let Some(schedule) = changes.schedule {
                payable.schedule = prepare_schedule(schedule, payable.due_date)?;
            }
            store::touch_and_save(conn, &mut payable)?;
            Ok(payable)
        })?;
        info!(payable_id = %id, "payable updated");
        Ok(payable)
    }

    pub fn delete_payable(&mut self, id: Uuid) -> Result<()> {
        self.store.scoped(|conn| {
            let payable: Payable = store::require(conn, id)?;
            if payable.is_paid() {
                return Err(LedgerError::validation(
                    "mark the payable unpaid before deleting it",
                ));
            }
            store::tombstone::<Payable>(conn, id).map(|_| ())
        })?;
        info!(payable_id = %id, "payable deleted");
        Ok(())
    }

    pub fn get_payable(&self, id: Uuid) -> Result<Payable> {
        store::require(self.store.conn(), id)
    }

    pub fn list_payables(&self, include_paid: bool) -> Result<Vec<Payable>> {
        payables::list(self.store.conn(), include_paid)
    }

    /// Unpaid payables due on or before `until`, overdue ones included.
    pub fn upcoming_payables(&self, until: NaiveDate) -> Result<Vec<Payable>> {
        payables::unpaid_due_between(self.store.conn(), None, until)
    }

    /// Debits the paying account, records the payment, and schedules the next
    /// instance of a recurring payable, all in one scope.
    pub fn mark_payable_paid(&mut self, input: MarkPaid) -> Result<PaymentOutcome> {
        if let Some(amount) = input.actual_amount {
            require_positive(amount, "payment amount")?;
        }
        let allow = self.overdraft_allowed(input.allow_overdraft);
        let paid_date = input.date.unwrap_or_else(today);

        let outcome = self.store.scoped(|conn| {
            let mut payable: Payable = store::require(conn, input.payable_id)?;
            if payable.is_paid() {
                return Err(LedgerError::validation(format!(
                    "payable {} is already paid",
                    payable.id
                )));
            }
            let amount = input.actual_amount.unwrap_or(payable.amount);
            let transaction = posting::post(
                conn,
                Entry {
                    account_id: input.from_account_id,
                    direction: Direction::Debit,
                    amount,
                    date: paid_date,
                    category_id: payable.category_id.clone(),
                    payee: Some(payable.name.clone()),
                    note: payable.note.clone(),
                    source: TransactionSource::Payable {
                        payable_id: payable.id,
                    },
                },
                allow,
            )?;
            payable.payment = Some(PaymentRecord {
                paid_date,
                paid_from_account_id: input.from_account_id,
                linked_transaction_id: transaction.id,
                amount,
            });
            store::touch_and_save(conn, &mut payable)?;
            let successor = successor_for(conn, &payable)?;
            Ok(PaymentOutcome {
                payable,
                transaction,
                successor,
            })
        })?;
        info!(
            payable_id = %outcome.payable.id,
            account_id = %input.from_account_id,
            amount = %outcome.transaction.amount,
            successor = ?outcome.successor.as_ref().map(|s| s.due_date),
            "payable paid"
        );
        Ok(outcome)
    }

    /// Reverses the payment. A successor generated by the payment is kept.
    pub fn mark_payable_unpaid(&mut self, id: Uuid) -> Result<Payable> {
        let payable = self.store.scoped(|conn| {
            let mut payable: Payable = store::require(conn, id)?;
            let Some(payment) = payable.payment.take() else {
                return Err(LedgerError::validation(format!(
                    "payable {} is not paid",
                    payable.id
                )));
            };
            match store::find::<Transaction>(conn, payment.linked_transaction_id)? {
                Some(tx) => {
                    posting::reverse(conn, tx)?;
                }
                None => warn!(
                    payable_id = %id,
                    transaction_id = %payment.linked_transaction_id,
                    "linked payment transaction already gone"
                ),
            }
            store::touch_and_save(conn, &mut payable)?;
            Ok(payable)
        })?;
        info!(payable_id = %id, "payable marked unpaid");
        Ok(payable)
    }
}
