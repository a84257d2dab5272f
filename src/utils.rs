// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Duration, Local, NaiveDate, SecondsFormat, SubsecRound, Utc};
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", s))
    })
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
    }
}

/// Current instant truncated to the precision timestamps are persisted with.
pub fn now_stamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn stamp_after(prev: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_stamp();
    if now > prev {
        now
    } else {
        prev + Duration::microseconds(1)
    }
}

pub fn format_stamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_stamp(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

pub fn require_positive(amount: Decimal, what: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "{} must be positive, got {}",
            what, amount
        )));
    }
    Ok(())
}

pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
