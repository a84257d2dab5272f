// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::LedgerEngine;
use super::input::{AccountChanges, NewAccount};
use super::posting::{self, Entry};
use crate::accounting::{entry_for, transaction_delta};
use crate::error::{LedgerError, Result};
use crate::models::{Account, AccountKind, AccountTerms, RecordMeta, Transaction, TransactionSource};
use crate::store::{self, Record, accounts, transactions};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountView {
    pub account: Account,
    pub available_credit: Option<Decimal>,
    pub is_overdue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub bank_total: Decimal,
    pub credit_total: Decimal,
    pub loan_total: Decimal,
    pub net_worth: Decimal,
    pub account_count: usize,
}

impl AccountSummary {
    pub(crate) fn from_accounts<'a>(accounts: impl IntoIterator<Item = &'a Account>) -> Self {
        let mut summary = AccountSummary {
            bank_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
            loan_total: Decimal::ZERO,
            net_worth: Decimal::ZERO,
            account_count: 0,
        };
        for account in accounts.into_iter().filter(|a| a.is_active) {
            match account.kind() {
                AccountKind::Bank => summary.bank_total += account.balance,
                AccountKind::Credit => summary.credit_total += account.balance,
                AccountKind::Loan => summary.loan_total += account.balance,
            }
            summary.account_count += 1;
        }
        summary.net_worth = summary.bank_total - summary.credit_total - summary.loan_total;
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceDrift {
    pub account_id: Uuid,
    pub name: String,
    pub stored: Decimal,
    pub derived: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileOutcome {
    pub account: Account,
    pub adjustment: Option<Transaction>,
    pub marked: usize,
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("account name must not be empty"));
    }
    Ok(name.to_string())
}

fn validate_terms(terms: &AccountTerms) -> Result<()> {
    let negative = |v: &Option<Decimal>| v.is_some_and(|d| d < Decimal::ZERO);
    match terms {
        AccountTerms::Bank => Ok(()),
        AccountTerms::Credit {
            credit_limit,
            payment_due_day,
            apr,
        } => {
            if negative(credit_limit) || negative(apr) {
                return Err(LedgerError::validation(
                    "credit limit and APR must not be negative",
                ));
            }
            if payment_due_day.is_some_and(|d| !(1..=31).contains(&d)) {
                return Err(LedgerError::validation(
                    "payment due day must be between 1 and 31",
                ));
            }
            Ok(())
        }
        AccountTerms::Loan {
            principal, rate, ..
        } => {
            if negative(principal) || negative(rate) {
                return Err(LedgerError::validation(
                    "loan principal and rate must not be negative",
                ));
            }
            Ok(())
        }
    }
}

fn derived_balance(account: &Account, txs: &[Transaction]) -> Decimal {
    let kind = account.kind();
    txs.iter()
        .fold(account.opening_balance, |acc, tx| acc + transaction_delta(tx, kind))
}

impl LedgerEngine {
    pub fn create_account(&mut self, input: NewAccount) -> Result<Account> {
        let name = validate_name(&input.name)?;
        validate_terms(&input.terms)?;
        let account = Account {
            id: Uuid::new_v4(),
            name,
            terms: input.terms,
            balance: input.opening_balance,
            opening_balance: input.opening_balance,
            is_active: true,
            meta: RecordMeta::new(),
        };
        self.store.scoped(|tx| Ok(account.save(tx)?))?;
        info!(account_id = %account.id, kind = %account.kind(), "account created");
        Ok(account)
    }

    pub fn update_account(&mut self, id: Uuid, changes: AccountChanges) -> Result<Account> {
        let name = changes.name.as_deref().map(validate_name).transpose()?;
        if let Some(terms) = &changes.terms {
            validate_terms(terms)?;
        }
        let account = self.store.scoped(|tx| {
            let mut account: Account = store::require(tx, id)?;
            if let Some(expected) = changes.expected_updated_at {
                if account.meta.updated_at != expected {
                    return Err(LedgerError::Conflict {
                        entity: Account::ENTITY,
                        id,
                    });
                }
            }
            if let Some(terms) = changes.terms {
                if terms.kind() != account.kind() && accounts::has_live_transactions(tx, id)? {
                    return Err(LedgerError::validation(
                        "cannot change the kind of an account that has transactions",
                    ));
                }
                account.terms = terms;
            }
            if let Some(name) = name {
                account.name = name;
            }
            if let Some(active) = changes.is_active {
                account.is_active = active;
            }
            store::touch_and_save(tx, &mut account)?;
            Ok(account)
        })?;
        info!(account_id = %id, "account updated");
        Ok(account)
    }

    /// Soft delete. The account must have no live transactions left; a
    /// second call reports `NotFound`.
    pub fn delete_account(&mut self, id: Uuid) -> Result<()> {
        self.store.scoped(|tx| {
            store::require::<Account>(tx, id)?;
            if accounts::has_live_transactions(tx, id)? {
                return Err(LedgerError::validation(
                    "delete the account's transactions and transfers before the account",
                ));
            }
            store::tombstone::<Account>(tx, id).map(|_| ())
        })?;
        info!(account_id = %id, "account deleted");
        Ok(())
    }

    pub fn get_account(&self, id: Uuid) -> Result<Account> {
        store::require(self.store.conn(), id)
    }

    pub fn account_view(&self, id: Uuid, today: NaiveDate) -> Result<AccountView> {
        let account = self.get_account(id)?;
        Ok(AccountView {
            available_credit: account.available_credit(),
            is_overdue: account.is_overdue(today),
            account,
        })
    }

    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        accounts::list(self.store.conn())
    }

    pub fn adjust_balance(&mut self, id: Uuid, delta: Decimal) -> Result<Account> {
        self.store.scoped(|tx| accounts::apply_delta(tx, id, delta))
    }

    /// Optimistic variant of [`LedgerEngine::adjust_balance`] for multi-writer callers.
    pub fn adjust_balance_if_unchanged(
        &mut self,
        id: Uuid,
        delta: Decimal,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Account> {
        self.store.scoped(|tx| {
            let current: Account = store::require(tx, id)?;
            if current.meta.updated_at != expected_updated_at {
                return Err(LedgerError::Conflict {
                    entity: Account::ENTITY,
                    id,
                });
            }
            accounts::apply_delta(tx, id, delta)
        })
    }

    pub fn get_summary(&self) -> Result<AccountSummary> {
        Ok(AccountSummary::from_accounts(&self.list_accounts()?))
    }

    /// Balance derived from the opening balance and every live transaction.
    pub fn recalculate(&self, id: Uuid) -> Result<Decimal> {
        let conn = self.store.conn();
        let account: Account = store::require(conn, id)?;
        let txs = transactions::for_account(conn, id)?;
        Ok(derived_balance(&account, &txs))
    }

    pub fn verify_balances(&self) -> Result<Vec<BalanceDrift>> {
        let conn = self.store.conn();
        let mut drift = Vec::new();
        for account in accounts::list(conn)? {
            let derived = derived_balance(&account, &transactions::for_account(conn, account.id)?);
            if derived != account.balance {
                warn!(account_id = %account.id, stored = %account.balance, %derived, "balance drift");
                drift.push(BalanceDrift {
                    account_id: account.id,
                    name: account.name,
                    stored: account.balance,
                    derived,
                });
            }
        }
        Ok(drift)
    }

    /// Marks transactions up to `as_of` reconciled and books one adjustment
    /// closing any gap to `statement_balance`.
    pub fn reconcile_account(
        &mut self,
        id: Uuid,
        statement_balance: Decimal,
        as_of: NaiveDate,
    ) -> Result<ReconcileOutcome> {
        let outcome = self.store.scoped(|tx| {
            let account: Account = store::require(tx, id)?;
            let mut marked = 0;
            for mut t in transactions::for_account(tx, id)? {
                if t.date <= as_of && !t.is_reconciled {
                    t.is_reconciled = true;
                    store::touch_and_save(tx, &mut t)?;
                    marked += 1;
                }
            }
            let adjustment = match entry_for(statement_balance - account.balance, account.kind()) {
                Some((direction, amount)) => Some(posting::post(
                    tx,
                    Entry {
                        account_id: id,
                        direction,
                        amount,
                        date: as_of,
                        category_id: None,
                        payee: Some("Reconciliation adjustment".to_string()),
                        note: None,
                        source: TransactionSource::Adjustment,
                    },
                    true,
                )?),
                None => None,
            };
            Ok(ReconcileOutcome {
                account: store::require(tx, id)?,
                adjustment,
                marked,
            })
        })?;
        info!(
            account_id = %id,
            marked = outcome.marked,
            adjusted = outcome.adjustment.is_some(),
            "account reconciled"
        );
        Ok(outcome)
    }
}
