//! Configuration validation.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    ///
    /// Cron expressions are only checked for their field count here; full
    /// parsing happens when the scheduler arms them.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_scheduler(config, &mut result);
        Self::validate_static_scheduler(config, &mut result);

        Ok(result)
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_scheduler(config: &Config, result: &mut ValidationResult) {
        let scheduler = &config.scheduler;

        if scheduler.pool_size == 0 {
            result.add_error(ValidationError::new(
                "scheduler.pool_size",
                "pool_size must be greater than 0",
            ));
        }

        if scheduler.pool_size > 256 {
            result.add_warning(ValidationWarning::new(
                "scheduler.pool_size",
                "pool_size is very high (>256), firings rarely need that much parallelism",
            ));
        }

        Self::check_expression(
            "scheduler.default_cron_expression",
            &scheduler.default_cron_expression,
            result,
        );

        if !scheduler.remove_on_cancel {
            result.add_warning(ValidationWarning::new(
                "scheduler.remove_on_cancel",
                "cancelled schedules linger until their next fire time",
            ));
        }
    }

    fn validate_static_scheduler(config: &Config, result: &mut ValidationResult) {
        let static_scheduler = &config.static_scheduler;

        if static_scheduler.pool_size == 0 && !static_scheduler.jobs.is_empty() {
            result.add_error(ValidationError::new(
                "static_scheduler.pool_size",
                "pool_size must be greater than 0",
            ));
        }

        let mut names = HashSet::new();
        for (i, job) in static_scheduler.jobs.iter().enumerate() {
            let path = format!("static_scheduler.jobs[{}]", i);

            if job.name.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("{}.name", path),
                    "Job name cannot be empty",
                ));
            } else if !names.insert(job.name.as_str()) {
                result.add_error(ValidationError::new(
                    format!("{}.name", path),
                    format!("Duplicate static job name '{}'", job.name),
                ));
            }

            Self::check_expression(
                &format!("{}.cron_expression", path),
                &job.cron_expression,
                result,
            );
        }
    }

    fn check_expression(path: &str, expression: &str, result: &mut ValidationResult) {
        let fields = expression.split_whitespace().count();
        if fields == 0 {
            result.add_error(ValidationError::new(path, "Cron expression cannot be empty"));
        } else if !(6..=7).contains(&fields) {
            result.add_error(ValidationError::new(
                path,
                format!(
                    "Cron expression must have 6 or 7 fields (seconds first), found {}",
                    fields
                ),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
