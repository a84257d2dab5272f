// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use billfold::settings::{load_settings_from, save_settings_to};
use billfold::{LedgerEngine, cli, commands, db};

fn init_logging(settings_level: &str, verbosity: u8) {
    let level = match verbosity {
        0 => settings_level,
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,billfold={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let config_path = match matches.get_one::<String>("config") {
        Some(path) => PathBuf::from(path),
        None => db::default_config_path()?,
    };
    let mut settings = load_settings_from(&config_path)?;
    if let Some(path) = matches.get_one::<String>("db") {
        settings.database_path = Some(PathBuf::from(path));
    }
    init_logging(&settings.log_level, matches.get_count("verbose"));

    let db_path = settings.resolved_db_path()?;
    let engine = LedgerEngine::builder()
        .settings(settings)
        .build()
        .with_context(|| format!("opening ledger at {}", db_path.display()))?;

    match matches.subcommand() {
        Some(("init", _)) => {
            if !config_path.exists() {
                save_settings_to(&config_path, engine.settings())?;
                println!("Settings written to {}", config_path.display());
            }
            println!("Database initialized at {}", db_path.display());
        }
        Some(("summary", sub)) => commands::summary::handle(&engine, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&engine, sub)?,
        Some(("draft", sub)) => commands::draft::handle(&engine, sub)?,
        Some(("budgets", sub)) => commands::budgets::handle(&engine, sub)?,
        Some(("sync", sub)) => commands::sync::handle(&engine, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
