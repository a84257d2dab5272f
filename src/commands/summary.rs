// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde_json::json;

use super::{maybe_print_json, pretty_table};
use crate::ledger::LedgerEngine;
use crate::utils::{fmt_money, today};

pub fn handle(engine: &LedgerEngine, m: &clap::ArgMatches) -> Result<()> {
    let summary = engine.get_summary()?;
    let today = today();
    let mut views = Vec::new();
    for account in engine.list_accounts()? {
        views.push(engine.account_view(account.id, today)?);
    }
    if maybe_print_json(m.get_flag("json"), &json!({ "summary": summary, "accounts": views }))? {
        return Ok(());
    }

    let rows = views
        .iter()
        .map(|v| {
            vec![
                v.account.name.clone(),
                v.account.kind().to_string(),
                fmt_money(&v.account.balance),
                v.available_credit.as_ref().map(fmt_money).unwrap_or_default(),
                if v.is_overdue { "overdue".into() } else { String::new() },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Account", "Kind", "Balance", "Available", "Status"], rows)
    );
    println!(
        "{}",
        pretty_table(
            &["Bank", "Credit owed", "Loans owed", "Net worth"],
            vec![vec![
                fmt_money(&summary.bank_total),
                fmt_money(&summary.credit_total),
                fmt_money(&summary.loan_total),
                fmt_money(&summary.net_worth),
            ]],
        )
    );
    Ok(())
}
