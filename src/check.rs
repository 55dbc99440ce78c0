//! `cronhands check`: validate the configuration and preview fire times.

use std::fmt::Write as _;

use cronhands_config::{Config, ConfigValidator};
use cronhands_scheduler::CronExpression;

/// Render the check report. Returns the report and whether the config is valid.
pub(crate) fn check_config(config: &Config, count: usize) -> (String, bool) {
    let mut out = String::new();
    let mut valid = true;

    match ConfigValidator::validate(config) {
        Ok(result) => {
            for error in &result.errors {
                let _ = writeln!(out, "error: {}: {}", error.path, error.message);
            }
            for warning in &result.warnings {
                let _ = writeln!(out, "warning: {}: {}", warning.path, warning.message);
            }
            valid &= result.is_valid();
        }
        Err(e) => {
            let _ = writeln!(out, "error: {}", e);
            valid = false;
        }
    }

    let expressions = std::iter::once((
        "scheduler.default_cron_expression".to_string(),
        config.scheduler.default_cron_expression.as_str(),
    ))
    .chain(config.static_scheduler.jobs.iter().map(|job| {
        (
            format!("static_scheduler.{}", job.name),
            job.cron_expression.as_str(),
        )
    }));

    for (name, expression) in expressions {
        match CronExpression::parse(expression) {
            Ok(cron) => {
                let _ = writeln!(out, "{} [{}]", name, cron);
                let upcoming = cron.upcoming(count);
                if upcoming.is_empty() {
                    let _ = writeln!(out, "  (never fires again)");
                }
                for time in upcoming {
                    let _ = writeln!(out, "  {}", time.format("%Y-%m-%d %H:%M:%S %:z"));
                }
            }
            Err(e) => {
                let _ = writeln!(out, "{} [{}]: {}", name, expression.trim(), e);
                valid = false;
            }
        }
    }

    let _ = writeln!(out, "{}", if valid { "Configuration OK" } else { "Configuration invalid" });
    (out, valid)
}
