// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::LedgerEngine;
use super::input::{BudgetChanges, NewBudget};
use crate::error::{LedgerError, Result};
use crate::models::{Budget, BudgetPeriod, RecordMeta, TransactionSource};
use crate::store::{self, Record, splits, transactions};
use crate::utils::{last_day_of_month, normalize_text, require_positive};

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The budget window containing `as_of`. Biweekly windows count from
/// `start_date`; every other period uses calendar boundaries, weeks starting Sunday.
pub fn period_window(period: BudgetPeriod, start_date: NaiveDate, as_of: NaiveDate) -> DateWindow {
    match period {
        BudgetPeriod::Daily => DateWindow {
            start: as_of,
            end: as_of,
        },
        BudgetPeriod::Weekly => {
            let start = as_of - Duration::days(i64::from(as_of.weekday().num_days_from_sunday()));
            DateWindow {
                start,
                end: start + Duration::days(6),
            }
        }
        BudgetPeriod::Biweekly => {
            let k = (as_of - start_date).num_days().div_euclid(14);
            let start = start_date + Duration::days(14 * k);
            DateWindow {
                start,
                end: start + Duration::days(13),
            }
        }
        BudgetPeriod::Monthly => {
            let (y, m) = (as_of.year(), as_of.month());
            DateWindow {
                start: as_of.with_day(1).unwrap_or(as_of),
                end: NaiveDate::from_ymd_opt(y, m, last_day_of_month(y, m)).unwrap_or(as_of),
            }
        }
        BudgetPeriod::Yearly => {
            let y = as_of.year();
            DateWindow {
                start: NaiveDate::from_ymd_opt(y, 1, 1).unwrap_or(as_of),
                end: NaiveDate::from_ymd_opt(y, 12, 31).unwrap_or(as_of),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    pub budget: Budget,
    pub window: DateWindow,
    /// Debits in the window, excluding transfer legs.
    pub spent: Decimal,
    /// Budget amount plus any amount rolled into this window.
    pub limit: Decimal,
    pub remaining: Decimal,
    pub percent_used: Decimal,
    pub is_over_budget: bool,
    pub is_alert: bool,
}

fn validate_budget_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("budget name must not be empty"));
    }
    Ok(name.to_string())
}

fn validate_threshold(threshold: u8) -> Result<()> {
    if threshold > 100 {
        return Err(LedgerError::validation(format!(
            "alert threshold must be at most 100, got {}",
            threshold
        )));
    }
    Ok(())
}

/// Rolled funds belong to the window right after the one they were rolled from.
fn rolled_into(budget: &Budget, window: &DateWindow) -> Decimal {
    if !budget.rollover {
        return Decimal::ZERO;
    }
    match budget.last_rollover_start {
        Some(from) => {
            let source = period_window(budget.period, budget.start_date, from);
            if source.end + Duration::days(1) == window.start {
                budget.rolled_amount
            } else {
                Decimal::ZERO
            }
        }
        None => Decimal::ZERO,
    }
}

/// Debits in the window that count against the budget. Transfer legs are
/// excluded; split transactions count through their split categories.
fn spent_in(conn: &Connection, budget: &Budget, window: &DateWindow) -> Result<Decimal> {
    let mut spent = Decimal::ZERO;
    for tx in transactions::debits_between(conn, window.start, window.end)? {
        if matches!(tx.source, TransactionSource::Transfer { .. }) {
            continue;
        }
        let Some(category) = &budget.category_id else {
            spent += tx.amount;
            continue;
        };
        if tx.is_split {
            spent += splits::for_transaction(conn, tx.id)?
                .iter()
                .filter(|s| s.category_id.as_ref() == Some(category))
                .map(|s| s.amount)
                .sum::<Decimal>();
        } else if tx.category_id.as_ref() == Some(category) {
            spent += tx.amount;
        }
    }
    Ok(spent)
}

fn progress(conn: &Connection, budget: Budget, as_of: NaiveDate) -> Result<BudgetProgress> {
    let window = period_window(budget.period, budget.start_date, as_of);
    let spent = spent_in(conn, &budget, &window)?;
    let limit = budget.amount + rolled_into(&budget, &window);
    let remaining = limit - spent;
    let percent_used = if limit > Decimal::ZERO {
        (spent / limit * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    } else if spent > Decimal::ZERO {
        Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    let is_alert = percent_used >= Decimal::from(budget.alert_threshold);
    Ok(BudgetProgress {
        window,
        spent,
        limit,
        remaining,
        percent_used,
        is_over_budget: remaining < Decimal::ZERO,
        is_alert,
        budget,
    })
}

impl LedgerEngine {
    pub fn create_budget(&mut self, input: NewBudget) -> Result<Budget> {
        let name = validate_budget_name(&input.name)?;
        require_positive(input.amount, "budget amount")?;
        validate_threshold(input.alert_threshold)?;
        let budget = Budget {
            id: Uuid::new_v4(),
            name,
            category_id: normalize_text(input.category_id),
            amount: input.amount,
            period: input.period,
            start_date: input.start_date,
            rollover: input.rollover,
            rolled_amount: Decimal::ZERO,
            alert_threshold: input.alert_threshold,
            last_rollover_start: None,
            meta: RecordMeta::new(),
        };
        self.store.scoped(|conn| Ok(budget.save(conn)?))?;
        info!(budget_id = %budget.id, period = %budget.period, amount = %budget.amount, "budget created");
        Ok(budget)
    }

    /// Changing the period or start date discards any pending rollover.
    pub fn update_budget(&mut self, id: Uuid, changes: BudgetChanges) -> Result<Budget> {
        let name = changes.name.as_deref().map(validate_budget_name).transpose()?;
        if let Some(amount) = changes.amount {
            require_positive(amount, "budget amount")?;
        }
        if let Some(threshold) = changes.alert_threshold {
            validate_threshold(threshold)?;
        }
        let budget = self.store.scoped(|conn| {
            let mut budget: Budget = store::require(conn, id)?;
            if let Some(name) = name {
                budget.name = name;
            }
            if let Some(category_id) = changes.category_id {
                budget.category_id = normalize_text(category_id);
            }
            if let Some(amount) = changes.amount {
                budget.amount = amount;
            }
            let reshaped = changes.period.is_some_and(|p| p != budget.period)
                || changes.start_date.is_some_and(|d| d != budget.start_date);
            if let Some(period) = changes.period {
                budget.period = period;
            }
            if let Some(start_date) = changes.start_date {
                budget.start_date = start_date;
            }
            if let Some(rollover) = changes.rollover {
                budget.rollover = rollover;
            }
            if let Some(threshold) = changes.alert_threshold {
                budget.alert_threshold = threshold;
            }
            if reshaped || !budget.rollover {
                budget.rolled_amount = Decimal::ZERO;
                budget.last_rollover_start = None;
            }
            store::touch_and_save(conn, &mut budget)?;
            Ok(budget)
        })?;
        info!(budget_id = %id, "budget updated");
        Ok(budget)
    }

    pub fn delete_budget(&mut self, id: Uuid) -> Result<()> {
        self.store
            .scoped(|conn| store::tombstone::<Budget>(conn, id).map(|_| ()))?;
        info!(budget_id = %id, "budget deleted");
        Ok(())
    }

    pub fn get_budget(&self, id: Uuid) -> Result<Budget> {
        store::require(self.store.conn(), id)
    }

    pub fn list_budgets(&self) -> Result<Vec<Budget>> {
        store::select(self.store.conn(), "ORDER BY name", [])
    }

    pub fn get_budget_progress(&self, id: Uuid, as_of: NaiveDate) -> Result<BudgetProgress> {
        let conn = self.store.conn();
        progress(conn, store::require(conn, id)?, as_of)
    }

    pub fn budget_progress_all(&self, as_of: NaiveDate) -> Result<Vec<BudgetProgress>> {
        let conn = self.store.conn();
        self.list_budgets()?
            .into_iter()
            .map(|b| progress(conn, b, as_of))
            .collect()
    }

    /// Carries `max(0, remaining)` of the window containing `as_of` into the next one.
    pub fn process_rollover(&mut self, id: Uuid, as_of: NaiveDate) -> Result<Budget> {
        let budget = self.store.scoped(|conn| {
            let budget: Budget = store::require(conn, id)?;
            if !budget.rollover {
                return Err(LedgerError::validation(format!(
                    "budget {} does not roll over",
                    budget.id
                )));
            }
            let current = progress(conn, budget, as_of)?;
            if current.budget.last_rollover_start == Some(current.window.start) {
                return Err(LedgerError::validation(format!(
                    "window starting {} was already rolled over",
                    current.window.start
                )));
            }
            let mut budget = current.budget;
            budget.rolled_amount = current.remaining.max(Decimal::ZERO);
            budget.last_rollover_start = Some(current.window.start);
            store::touch_and_save(conn, &mut budget)?;
            Ok(budget)
        })?;
        info!(budget_id = %id, rolled = %budget.rolled_amount, "budget rolled over");
        Ok(budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn weekly_window_starts_sunday() {
        // 2024-05-15 is a Wednesday
        let w = period_window(BudgetPeriod::Weekly, d("2024-01-01"), d("2024-05-15"));
        assert_eq!(w.start, d("2024-05-12"));
        assert_eq!(w.end, d("2024-05-18"));
    }

    #[test]
    fn daily_window_is_the_day_itself() {
        let w = period_window(BudgetPeriod::Daily, d("2024-01-01"), d("2024-02-29"));
        assert_eq!((w.start, w.end), (d("2024-02-29"), d("2024-02-29")));
        assert!(w.contains(d("2024-02-29")));
        assert!(!w.contains(d("2024-03-01")));
    }

    #[test]
    fn biweekly_window_anchors_to_start_date() {
        let start = d("2024-01-03");
        let w = period_window(BudgetPeriod::Biweekly, start, d("2024-01-20"));
        assert_eq!(w.start, d("2024-01-17"));
        assert_eq!(w.end, d("2024-01-30"));

        let before = period_window(BudgetPeriod::Biweekly, start, d("2024-01-02"));
        assert_eq!(before.start, d("2023-12-20"));
    }

    #[test]
    fn monthly_and_yearly_use_calendar_bounds() {
        let m = period_window(BudgetPeriod::Monthly, d("2023-06-10"), d("2024-02-10"));
        assert_eq!((m.start, m.end), (d("2024-02-01"), d("2024-02-29")));
        let y = period_window(BudgetPeriod::Yearly, d("2023-06-10"), d("2024-02-10"));
        assert_eq!((y.start, y.end), (d("2024-01-01"), d("2024-12-31")));
        assert!(y.contains(d("2024-12-31")));
    }
}
