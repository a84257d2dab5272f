// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{LedgerError, Result};
use crate::models::{Frequency, RecurrenceRule};
use crate::utils::last_day_of_month;

pub fn validate_rule(rule: &RecurrenceRule) -> Result<()> {
    if rule.frequency.interval() == 0 {
        return Err(LedgerError::validation("recurrence interval must be at least 1"));
    }
    if let Frequency::Monthly {
        day_of_month: Some(day),
        ..
    } = rule.frequency
    {
        if !(1..=31).contains(&day) {
            return Err(LedgerError::validation(format!(
                "day of month must be between 1 and 31, got {}",
                day
            )));
        }
    }
    Ok(())
}

/// Pins a monthly rule to the due date's day so that clamped months
/// (the 31st landing on the 28th) recover on the following occurrence.
pub fn anchor_rule(mut rule: RecurrenceRule, due: NaiveDate) -> RecurrenceRule {
    if let Frequency::Monthly {
        interval,
        day_of_month: None,
    } = rule.frequency
    {
        rule.frequency = Frequency::Monthly {
            interval,
            day_of_month: Some(due.day()),
        };
    }
    rule
}

/// Moves a monthly anchor to a new due date's day.
pub fn reanchor_rule(mut rule: RecurrenceRule, due: NaiveDate) -> RecurrenceRule {
    if let Frequency::Monthly { interval, .. } = rule.frequency {
        rule.frequency = Frequency::Monthly {
            interval,
            day_of_month: Some(due.day()),
        };
    }
    rule
}

/// Due date of the instance following one due on `due`, or `None` once past
/// the rule's end or past the last representable date.
pub fn next_occurrence(due: NaiveDate, rule: &RecurrenceRule) -> Option<NaiveDate> {
    let next = match rule.frequency {
        Frequency::Daily { interval } => add_days(due, 1, interval)?,
        Frequency::Weekly {
            interval,
            day_of_week,
        } => align_weekday(add_days(due, 7, interval)?, day_of_week)?,
        Frequency::Biweekly {
            interval,
            day_of_week,
        } => align_weekday(add_days(due, 14, interval)?, day_of_week)?,
        Frequency::Monthly {
            interval,
            day_of_month,
        } => add_months_clamped(due, interval, day_of_month.unwrap_or(due.day()))?,
        Frequency::Yearly { interval } => {
            add_months_clamped(due, interval.checked_mul(12)?, due.day())?
        }
    };
    match rule.end_date {
        Some(end) if next > end => None,
        _ => Some(next),
    }
}

fn add_days(date: NaiveDate, unit: u64, interval: u32) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(unit.checked_mul(u64::from(interval))?))
}

fn align_weekday(date: NaiveDate, day_of_week: Option<chrono::Weekday>) -> Option<NaiveDate> {
    match day_of_week {
        Some(target) => {
            let ahead = (7 + target.num_days_from_sunday() - date.weekday().num_days_from_sunday()) % 7;
            date.checked_add_days(Days::new(u64::from(ahead)))
        }
        None => Some(date),
    }
}

fn add_months_clamped(date: NaiveDate, months: u32, day: u32) -> Option<NaiveDate> {
    let index = (date.year() * 12 + date.month0() as i32).checked_add(i32::try_from(months).ok()?)?;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, day.min(last_day_of_month(year, month)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn rule(frequency: Frequency) -> RecurrenceRule {
        RecurrenceRule {
            frequency,
            end_date: None,
        }
    }

    #[test]
    fn monthly_clamps_to_month_end_and_recovers() {
        let r = anchor_rule(
            rule(Frequency::Monthly {
                interval: 1,
                day_of_month: None,
            }),
            date("2025-01-31"),
        );
        let feb = next_occurrence(date("2025-01-31"), &r).unwrap();
        assert_eq!(feb, date("2025-02-28"));
        assert_eq!(next_occurrence(feb, &r).unwrap(), date("2025-03-31"));
        assert_eq!(
            next_occurrence(date("2024-01-31"), &r).unwrap(),
            date("2024-02-29")
        );
    }

    #[test]
    fn day_based_frequencies_add_days() {
        let start = date("2025-03-10");
        let daily = rule(Frequency::Daily { interval: 3 });
        assert_eq!(next_occurrence(start, &daily).unwrap(), date("2025-03-13"));
        let weekly = rule(Frequency::Weekly {
            interval: 1,
            day_of_week: None,
        });
        assert_eq!(next_occurrence(start, &weekly).unwrap(), date("2025-03-17"));
        let biweekly = rule(Frequency::Biweekly {
            interval: 2,
            day_of_week: None,
        });
        assert_eq!(next_occurrence(start, &biweekly).unwrap(), date("2025-04-07"));
    }

    #[test]
    fn weekly_aligns_forward_to_weekday() {
        // 2025-03-10 is a Monday; a Friday rule lands on the Friday after +7 days.
        let r = rule(Frequency::Weekly {
            interval: 1,
            day_of_week: Some(Weekday::Fri),
        });
        assert_eq!(
            next_occurrence(date("2025-03-10"), &r).unwrap(),
            date("2025-03-21")
        );
    }

    #[test]
    fn yearly_and_end_date() {
        let mut r = rule(Frequency::Yearly { interval: 1 });
        assert_eq!(
            next_occurrence(date("2024-02-29"), &r).unwrap(),
            date("2025-02-28")
        );
        r.end_date = Some(date("2025-01-01"));
        assert!(next_occurrence(date("2024-02-29"), &r).is_none());
    }

    #[test]
    fn zero_interval_rejected() {
        assert!(validate_rule(&rule(Frequency::Daily { interval: 0 })).is_err());
        assert!(
            validate_rule(&rule(Frequency::Monthly {
                interval: 1,
                day_of_month: Some(32)
            }))
            .is_err()
        );
    }

    #[test]
    fn huge_intervals_end_the_series() {
        let start = date("2025-03-10");
        assert!(next_occurrence(start, &rule(Frequency::Daily { interval: u32::MAX })).is_none());
        let weekly = rule(Frequency::Weekly {
            interval: u32::MAX,
            day_of_week: Some(Weekday::Fri),
        });
        assert!(next_occurrence(start, &weekly).is_none());
        let biweekly = rule(Frequency::Biweekly {
            interval: u32::MAX,
            day_of_week: None,
        });
        assert!(next_occurrence(start, &biweekly).is_none());
        let monthly = rule(Frequency::Monthly {
            interval: u32::MAX,
            day_of_month: Some(31),
        });
        assert!(next_occurrence(start, &monthly).is_none());
        assert!(next_occurrence(start, &rule(Frequency::Yearly { interval: 400_000_000 })).is_none());
        assert!(next_occurrence(start, &rule(Frequency::Yearly { interval: 1_000_000 })).is_none());
    }

    #[test]
    fn reanchor_follows_new_due_day() {
        let r = anchor_rule(
            rule(Frequency::Monthly {
                interval: 1,
                day_of_month: None,
            }),
            date("2025-01-15"),
        );
        let r = reanchor_rule(r, date("2025-01-31"));
        assert_eq!(next_occurrence(date("2025-01-31"), &r).unwrap(), date("2025-02-28"));
    }
}
