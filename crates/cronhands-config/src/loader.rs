//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, or defaults when the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        let mut result = content.to_string();
        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.cronhands`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }

    /// Directory holding runtime state such as logs.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".cronhands"))
            .unwrap_or_else(|| PathBuf::from(".cronhands"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.scheduler.pool_size, 5);
    }

    #[test]
    fn test_load_scheduler_config() {
        let content = r#"
            [server]
            host = "0.0.0.0"
            port = 3000

            [scheduler]
            pool_size = 8
            remove_on_cancel = false
            default_cron_expression = "0/10 * * * * ?"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.scheduler.pool_size, 8);
        assert!(!config.scheduler.remove_on_cancel);
        assert_eq!(config.scheduler.default_cron_expression, "0/10 * * * * ?");
        assert_eq!(config.scheduler.thread_name_prefix, "task-scheduler-");
    }

    #[test]
    fn test_load_static_jobs() {
        let content = r#"
            [static_scheduler]
            pool_size = 2

            [[static_scheduler.jobs]]
            name = "task1"
            cron_expression = "0/3 * * * * ?"
            message = "static task 1 running"

            [[static_scheduler.jobs]]
            name = "task2"
            cron_expression = "0/6 * * * * ?"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        let jobs = &config.static_scheduler.jobs;
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].message(), "static task 1 running");
        assert_eq!(jobs[1].message(), "task2");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[scheduler]").unwrap();
        writeln!(file, "pool_size = 3").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.scheduler.pool_size, 3);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/cronhands.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/cronhands.toml")).unwrap();
        assert_eq!(config.scheduler.pool_size, 5);
    }

    #[test]
    fn test_load_or_default_keeps_parse_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid = [unclosed").unwrap();
        assert!(ConfigLoader::load_or_default(file.path()).is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test-only variable name not read by any other test
        unsafe {
            std::env::set_var("CRONHANDS_TEST_CRON", "0/7 * * * * ?");
        }
        let content = r#"
            [scheduler]
            default_cron_expression = "${CRONHANDS_TEST_CRON}"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.scheduler.default_cron_expression, "0/7 * * * * ?");
        unsafe {
            std::env::remove_var("CRONHANDS_TEST_CRON");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_CRONHANDS_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(ConfigLoader::expand_path("/usr/local/bin"), "/usr/local/bin");

        let expanded = ConfigLoader::expand_path("~/test");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/test"));
    }

    #[test]
    fn test_home_dir() {
        assert!(ConfigLoader::home_dir().ends_with(".cronhands"));
    }
}
