//! Load: config loading from file and environment variables.

use std::path::Path;
use std::str::FromStr;

use super::model::{ConfigError, IngestConfig};

pub const CONFIG_FILE_ENV: &str = "ACCESSLOG_CONFIG_FILE";
pub const DEFAULT_CONFIG_FILE: &str = "accesslog.toml";

impl IngestConfig {
    /// Load configuration from file, then apply environment overrides
    /// Priority: Environment Variables > Config File > Defaults
    ///
    /// `config_path` wins over `ACCESSLOG_CONFIG_FILE`. A missing default
    /// file is not an error; a missing explicit file is.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let explicit = config_path
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_FILE_ENV).ok());

        let mut config = match explicit {
            Some(path) => {
                tracing::info!("Loading configuration from: {}", path);
                Self::from_file(&path)?
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::info!("Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => {
                tracing::debug!("No config file, using defaults and environment variables");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Apply `ACCESSLOG_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("ACCESSLOG_PATH") {
            self.path = Some(path);
        }
        if let Some(output) = lookup("ACCESSLOG_OUTPUT") {
            self.output = parse_value("ACCESSLOG_OUTPUT", &output)?;
        }
        if let Some(policy) = lookup("ACCESSLOG_ON_NO_MATCH") {
            self.on_no_match = parse_value("ACCESSLOG_ON_NO_MATCH", &policy)?;
        }
        if let Some(max) = lookup("ACCESSLOG_MAX_LINE_BYTES") {
            self.max_line_bytes = parse_value("ACCESSLOG_MAX_LINE_BYTES", &max)?;
        }
        Ok(())
    }

    /// Validate that configuration values are sane
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.path.as_deref() {
            None => return Err(ConfigError::Invalid("path is required".to_string())),
            Some(p) if p.trim().is_empty() => {
                return Err(ConfigError::Invalid("path must not be empty".to_string()))
            }
            Some(_) => {}
        }
        if self.max_line_bytes == 0 {
            return Err(ConfigError::Invalid("max_line_bytes must be > 0".to_string()));
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use crate::stream::{NoMatchPolicy, OutputFormat};

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn valid_config() -> IngestConfig {
        IngestConfig {
            path: Some("/var/log/nginx/access.log".to_string()),
            ..IngestConfig::default()
        }
    }

    // ── File loading ────────────────────────────────────────────

    #[test]
    fn test_from_file_full() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "path = \"/tmp/access.log\"\noutput = \"text\"\non_no_match = \"abort\"\nmax_line_bytes = 4096"
        )
        .unwrap();
        let config = IngestConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.path.as_deref(), Some("/tmp/access.log"));
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.on_no_match, NoMatchPolicy::Abort);
        assert_eq!(config.max_line_bytes, 4096);
    }

    #[test]
    fn test_from_file_partial_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "path = \"a.log\"").unwrap();
        let config = IngestConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.on_no_match, NoMatchPolicy::Skip);
        assert_eq!(config.max_line_bytes, crate::parser::MAX_LINE_SIZE);
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "output = \"yaml\"").unwrap();
        let result = IngestConfig::from_file(file.path().to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_from_file_missing() {
        let result = IngestConfig::from_file("/nonexistent/accesslog.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "path = \"from-file.log\"").unwrap();
        let config = IngestConfig::load(Some(file.path().to_str().unwrap())).unwrap();
        assert!(config.path.is_some());
    }

    // ── Overrides ───────────────────────────────────────────────

    #[test]
    fn test_overrides_win_over_file_values() {
        let mut config = valid_config();
        config
            .apply_overrides(env(&[
                ("ACCESSLOG_PATH", "-"),
                ("ACCESSLOG_OUTPUT", "text"),
                ("ACCESSLOG_ON_NO_MATCH", "abort"),
                ("ACCESSLOG_MAX_LINE_BYTES", " 512 "),
            ]))
            .unwrap();
        assert_eq!(config.path.as_deref(), Some("-"));
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.on_no_match, NoMatchPolicy::Abort);
        assert_eq!(config.max_line_bytes, 512);
    }

    #[test]
    fn test_overrides_absent_keep_values() {
        let mut config = valid_config();
        config.apply_overrides(env(&[])).unwrap();
        assert_eq!(config, valid_config());
    }

    #[test]
    fn test_overrides_reject_bad_values() {
        let mut config = valid_config();
        let result = config.apply_overrides(env(&[("ACCESSLOG_MAX_LINE_BYTES", "lots")]));
        match result {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "ACCESSLOG_MAX_LINE_BYTES"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    // ── Validation ──────────────────────────────────────────────

    #[test]
    fn test_validate_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_path() {
        let result = IngestConfig::default().validate();
        assert!(result.unwrap_err().to_string().contains("path"));
    }

    #[test]
    fn test_validate_blank_path() {
        let config = IngestConfig {
            path: Some("  ".to_string()),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_max_line_bytes() {
        let config = IngestConfig {
            max_line_bytes: 0,
            ..valid_config()
        };
        assert!(config.validate().unwrap_err().to_string().contains("max_line_bytes"));
    }
}
