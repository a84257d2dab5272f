// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command, crate_version};

use crate::ledger::EntityKind;

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

pub fn build_cli() -> Command {
    Command::new("billfold")
        .version(crate_version!())
        .about("Local personal finance ledger: accounts, bills, budgets")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_name("PATH")
                .help("Database file (overrides settings)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("PATH")
                .help("Settings file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Raise log verbosity"),
        )
        .subcommand(Command::new("init").about("Create the database and schema"))
        .subcommand(
            Command::new("summary")
                .about("Balances per account kind and net worth")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check stored balances and links for drift")
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("draft")
                .about("Safe-to-spend after upcoming bills")
                .arg(
                    Arg::new("until")
                        .long("until")
                        .value_name("YYYY-MM-DD")
                        .help("Reserve for bills due on or before this date"),
                )
                .arg(
                    Arg::new("no-overdue")
                        .long("no-overdue")
                        .action(ArgAction::SetTrue)
                        .help("Ignore bills already past due"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("budgets")
                .about("Progress of every budget")
                .arg(
                    Arg::new("as-of")
                        .long("as-of")
                        .value_name("YYYY-MM-DD")
                        .help("Evaluate the window containing this date"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("sync")
                .about("Show records waiting to be pushed")
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .value_parser(PossibleValuesParser::new(EntityKind::ALL.map(|k| k.as_str())))
                        .help("Only this entity kind"),
                )
                .arg(json_flag()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let m = build_cli().get_matches_from(["billfold", "draft", "--until", "2025-02-01", "--db", "x.sqlite"]);
        assert_eq!(m.get_one::<String>("db").map(String::as_str), Some("x.sqlite"));
        let (name, sub) = m.subcommand().unwrap();
        assert_eq!(name, "draft");
        assert_eq!(sub.get_one::<String>("until").map(String::as_str), Some("2025-02-01"));
    }

    #[test]
    fn rejects_unknown_sync_kind() {
        let res = build_cli().try_get_matches_from(["billfold", "sync", "--kind", "envelope"]);
        assert!(res.is_err());
    }
}
