// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::Serialize;

use super::{maybe_print_json, pretty_table};
use crate::ledger::LedgerEngine;
use crate::models::Transaction;
use crate::store;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub code: &'static str,
    pub detail: String,
}

pub fn find_issues(engine: &LedgerEngine) -> Result<Vec<Issue>> {
    let conn = engine.store().conn();
    let mut issues = Vec::new();

    // 1) Stored balances that no longer match the ledger
    for drift in engine.verify_balances()? {
        issues.push(Issue {
            code: "balance_drift",
            detail: format!(
                "{} ({}): stored {} vs derived {}",
                drift.name, drift.account_id, drift.stored, drift.derived
            ),
        });
    }

    // 2) Transfers with a leg gone
    for transfer in engine.list_transfers()? {
        for leg in [transfer.from_transaction_id, transfer.to_transaction_id] {
            if store::find::<Transaction>(conn, leg)?.is_none() {
                issues.push(Issue {
                    code: "transfer_missing_leg",
                    detail: format!("transfer {} lacks transaction {}", transfer.id, leg),
                });
            }
        }
    }

    // 3) Paid bills whose payment transaction is gone
    for payable in engine.list_payables(true)? {
        if let Some(payment) = &payable.payment {
            if store::find::<Transaction>(conn, payment.linked_transaction_id)?.is_none() {
                issues.push(Issue {
                    code: "payment_missing_transaction",
                    detail: format!(
                        "{} ({}) lacks transaction {}",
                        payable.name, payable.id, payment.linked_transaction_id
                    ),
                });
            }
        }
    }
    Ok(issues)
}

pub fn handle(engine: &LedgerEngine, m: &clap::ArgMatches) -> Result<()> {
    let issues = find_issues(engine)?;
    if maybe_print_json(m.get_flag("json"), &issues)? {
        return Ok(());
    }
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.code.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
