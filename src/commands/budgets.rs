// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::{maybe_print_json, pretty_table};
use crate::ledger::LedgerEngine;
use crate::utils::{fmt_money, parse_date, today};

pub fn handle(engine: &LedgerEngine, m: &clap::ArgMatches) -> Result<()> {
    let as_of = match m.get_one::<String>("as-of") {
        Some(s) => parse_date(s)?,
        None => today(),
    };
    let progress = engine.budget_progress_all(as_of)?;
    if maybe_print_json(m.get_flag("json"), &progress)? {
        return Ok(());
    }

    let rows = progress
        .iter()
        .map(|p| {
            let flag = if p.is_over_budget {
                "over"
            } else if p.is_alert {
                "alert"
            } else {
                ""
            };
            vec![
                p.budget.name.clone(),
                format!("{}..{}", p.window.start, p.window.end),
                fmt_money(&p.limit),
                fmt_money(&p.spent),
                fmt_money(&p.remaining),
                format!("{}%", p.percent_used),
                flag.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Budget", "Window", "Limit", "Spent", "Remaining", "Used", ""],
            rows
        )
    );
    Ok(())
}
