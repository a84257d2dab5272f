// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::{maybe_print_json, pretty_table};
use crate::ledger::{EntityKind, LedgerEngine, SyncRecord};

pub fn pending(engine: &LedgerEngine, m: &clap::ArgMatches) -> Result<Vec<SyncRecord>> {
    let kinds = match m.get_one::<String>("kind") {
        Some(k) => vec![k.parse::<EntityKind>()?],
        None => EntityKind::ALL.to_vec(),
    };
    let mut out = Vec::new();
    for kind in kinds {
        out.extend(engine.dirty_records(kind)?);
    }
    Ok(out)
}

pub fn handle(engine: &LedgerEngine, m: &clap::ArgMatches) -> Result<()> {
    let records = pending(engine, m)?;
    if maybe_print_json(m.get_flag("json"), &records)? {
        return Ok(());
    }
    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.kind().to_string(),
                r.id().to_string(),
                r.meta().sync_status.to_string(),
                r.meta().updated_at.to_rfc3339(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Kind", "Id", "Status", "Updated"], rows)
    );
    Ok(())
}
