// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db;
use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Lets bank accounts go negative without a per-call override.
    #[serde(default)]
    pub allow_bank_overdraft: bool,
    #[serde(default = "default_true")]
    pub draft_include_overdue: bool,
    #[serde(default = "default_draft_horizon_days")]
    pub draft_horizon_days: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_draft_horizon_days() -> u32 {
    14
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: None,
            allow_bank_overdraft: false,
            draft_include_overdue: default_true(),
            draft_horizon_days: default_draft_horizon_days(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(p) => Ok(p.clone()),
            None => db::default_db_path(),
        }
    }
}

/// Missing file means defaults; a malformed one is an error.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| LedgerError::Config(format!("{}: {}", path.display(), e)))
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json =
        serde_json::to_string_pretty(settings).map_err(|e| LedgerError::Config(e.to_string()))?;
    fs::write(path, format!("{json}\n"))?;
    Ok(())
}
