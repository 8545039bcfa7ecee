//! TOML configuration loading and validation.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use portfolio_rebalancer_core::models::settings::{Settings, UnitPolicy};

use crate::error::{Error, Result};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "rebalancer.toml";

/// Top-level configuration. Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub portfolio: PortfolioConfig,
    pub rebalance: RebalanceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioConfig {
    #[serde(default = "default_portfolio_file")]
    pub file: PathBuf,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            file: default_portfolio_file(),
        }
    }
}

fn default_portfolio_file() -> PathBuf {
    PathBuf::from("portfolio.json")
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RebalanceConfig {
    #[serde(default)]
    pub unit_policy: UnitPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".into()
}

const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl Config {
    /// Load config from a TOML file.
    ///
    /// When `required` is false a missing file yields the defaults; any
    /// other read or parse failure is an error.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Parse and validate config text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Engine settings derived from the `[rebalance]` section.
    pub fn settings(&self) -> Settings {
        Settings {
            unit_policy: self.rebalance.unit_policy,
        }
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        if self.portfolio.file.as_os_str().is_empty() {
            return Err(Error::Config("portfolio file must not be empty".into()));
        }
        if !LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::Config(format!(
                "unknown log level '{}' (expected one of {})",
                self.logging.level,
                LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.portfolio.file, PathBuf::from("portfolio.json"));
        assert_eq!(config.rebalance.unit_policy, UnitPolicy::Whole);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn full_config() {
        let config = Config::from_toml(
            r#"
            [portfolio]
            file = "data/main.json"

            [rebalance]
            unit_policy = "fractional"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.portfolio.file, PathBuf::from("data/main.json"));
        assert_eq!(config.settings().unit_policy, UnitPolicy::Fractional);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn unknown_unit_policy_is_a_parse_error() {
        let err = Config::from_toml("[rebalance]\nunit_policy = \"lots\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let err = Config::from_toml("[logging]\nlevel = \"loud\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_optional_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml"), false).unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml"), true).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rebalancer.toml");
        std::fs::write(&path, "[portfolio]\nfile = \"p.json\"\n").unwrap();
        let config = Config::load(&path, true).unwrap();
        assert_eq!(config.portfolio.file, PathBuf::from("p.json"));
    }
}
