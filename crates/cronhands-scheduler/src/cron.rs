//! Cron expression engine.
//!
//! Wraps [`cron::Schedule`] with the grammar accepted by the task API:
//!
//! `second minute hour day_of_month month day_of_week [year]`
//!
//! Examples:
//! - `"0/5 * * * * ?"` - every 5 seconds, starting at second 0
//! - `"5/10 * * * * ?"` - every 10 seconds, starting at second 5
//! - `"0 0 9 * * MON-FRI"` - 9 AM on weekdays
//!
//! `?` is accepted as "any value" in every field. Numeric days of the week
//! count from Monday: 1 is Monday, 0 and 7 are Sunday, so `1-5` means
//! Monday to Friday. Parsing is stateless and fire times are computed in the
//! process-local time zone.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, TimeZone};
use cron::Schedule;

use crate::error::SchedulerError;

/// A parsed cron expression.
#[derive(Debug, Clone)]
pub struct CronExpression {
    source: String,
    schedule: Schedule,
}

impl CronExpression {
    /// Parse an expression. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidExpression`] if the expression is
    /// empty, has the wrong number of fields or does not parse.
    pub fn parse(expression: &str) -> Result<Self, SchedulerError> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(SchedulerError::invalid(expression, "expression is empty"));
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if !(6..=7).contains(&fields.len()) {
            return Err(SchedulerError::invalid(
                expression,
                format!("expected 6 or 7 fields, found {}", fields.len()),
            ));
        }

        let mut normalized = Vec::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            let field = if index == DAY_OF_WEEK_FIELD {
                normalize_day_of_week(field).map_err(|e| SchedulerError::invalid(expression, e))?
            } else if *field == "?" {
                "*".to_string()
            } else {
                field.to_string()
            };
            normalized.push(field);
        }
        let normalized = normalized.join(" ");

        let schedule = Schedule::from_str(&normalized)
            .map_err(|e| SchedulerError::invalid(expression, e.to_string()))?;

        Ok(Self {
            source: trimmed.to_string(),
            schedule,
        })
    }

    /// The expression as written (trimmed).
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Next fire time strictly after `after`.
    pub fn next_after<Z: TimeZone>(&self, after: &DateTime<Z>) -> Option<DateTime<Z>> {
        self.schedule.after(after).next()
    }

    /// Next fire time after now, in local time.
    pub fn next_fire_time(&self) -> Option<DateTime<Local>> {
        self.next_after(&Local::now())
    }

    /// The next `count` fire times after now.
    pub fn upcoming(&self, count: usize) -> Vec<DateTime<Local>> {
        self.schedule.upcoming(Local).take(count).collect()
    }
}

const DAY_OF_WEEK_FIELD: usize = 5;

/// Day names indexed by number; 0 and 7 are both Sunday.
const WEEKDAYS: [&str; 8] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];

fn weekday_number(token: &str) -> Result<usize, String> {
    if let Ok(number) = token.parse::<usize>() {
        return if number < WEEKDAYS.len() {
            Ok(number)
        } else {
            Err(format!("day of week {} is out of range 0-7", number))
        };
    }
    let upper = token.to_ascii_uppercase();
    WEEKDAYS[1..]
        .iter()
        .position(|name| *name == upper)
        .map(|i| i + 1)
        .ok_or_else(|| format!("invalid day of week '{}'", token))
}

/// Rewrite a numeric day-of-week field as day names, which the `cron` crate
/// numbers differently (it counts Sunday as 1).
fn normalize_day_of_week(field: &str) -> Result<String, String> {
    if field == "?" {
        return Ok("*".to_string());
    }
    if !field.bytes().any(|b| b.is_ascii_digit()) {
        return Ok(field.to_string());
    }

    let mut days = BTreeSet::new();
    for item in field.split(',') {
        let (range, step) = match item.split_once('/') {
            Some((range, step)) => match step.parse::<usize>() {
                Ok(step) if step > 0 => (range, Some(step)),
                _ => return Err(format!("invalid day-of-week increment in '{}'", item)),
            },
            None => (item, None),
        };

        let (start, end) = match range {
            "*" | "?" => (1, 7),
            _ => match range.split_once('-') {
                Some((start, end)) => (weekday_number(start)?, weekday_number(end)?),
                None => {
                    let start = weekday_number(range)?;
                    (start, if step.is_some() { 7 } else { start })
                }
            },
        };
        if start > end {
            return Err(format!("day-of-week range '{}' is reversed", range));
        }

        days.extend((start..=end).step_by(step.unwrap_or(1)).map(|day| day % 7));
    }

    Ok(days
        .into_iter()
        .map(|day| WEEKDAYS[day])
        .collect::<Vec<_>>()
        .join(","))
}

impl FromStr for CronExpression {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
