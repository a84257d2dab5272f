// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{Duration, NaiveDate};

use super::{maybe_print_json, pretty_table};
use crate::ledger::{Draft, LedgerEngine};
use crate::utils::{fmt_money, parse_date, today};

pub fn compute(engine: &LedgerEngine, m: &clap::ArgMatches, today: NaiveDate) -> Result<Draft> {
    let settings = engine.settings();
    let target = match m.get_one::<String>("until") {
        Some(s) => parse_date(s)?,
        None => today + Duration::days(i64::from(settings.draft_horizon_days)),
    };
    let include_overdue = settings.draft_include_overdue && !m.get_flag("no-overdue");
    Ok(engine.get_draft(today, target, include_overdue)?)
}

pub fn handle(engine: &LedgerEngine, m: &clap::ArgMatches) -> Result<()> {
    let draft = compute(engine, m, today())?;
    if maybe_print_json(m.get_flag("json"), &draft)? {
        return Ok(());
    }
    let rows = draft
        .payables
        .iter()
        .map(|p| vec![p.due_date.to_string(), p.name.clone(), fmt_money(&p.amount)])
        .collect();
    println!("{}", pretty_table(&["Due", "Bill", "Amount"], rows));
    println!(
        "Through {}: available {} - bills {} = safe to spend {}",
        draft.target_date,
        fmt_money(&draft.available_balance),
        fmt_money(&draft.payables_total),
        fmt_money(&draft.safe_to_spend)
    );
    Ok(())
}
