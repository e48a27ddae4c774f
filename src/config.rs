//! Runtime configuration
//!
//! The regulatory constants (daily reference table, kJ factors) travel as an
//! explicit `LabelConfig` value. Paths come from the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nutrition::{DailyValueTable, EnergyFactors};

/// Optional JSON file overriding the regulatory constants
pub const CONFIG_PATH_VAR: &str = "NUTRI_CONFIG_PATH";
/// Directory PDF exports go to when no path is given
pub const EXPORT_DIR_VAR: &str = "NUTRI_EXPORT_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid energy factor {name}: {value}")]
    InvalidFactor { name: &'static str, value: f64 },
}

/// Reference data used to compute label columns
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelConfig {
    #[serde(default)]
    pub daily_values: DailyValueTable,
    #[serde(default)]
    pub energy_factors: EnergyFactors,
}

impl LabelConfig {
    /// Parse and validate a config document.
    ///
    /// Missing sections keep the Brazilian defaults.
    pub fn from_json(json: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: LabelConfig = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json, &path.display().to_string())
    }

    /// Config from `NUTRI_CONFIG_PATH`, or the defaults when unset
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => {
                tracing::info!(path = %path, "Loading label config");
                Self::load(Path::new(path.trim()))
            }
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let factors = [
            ("carbohydrate", self.energy_factors.carbohydrate),
            ("protein", self.energy_factors.protein),
            ("fat", self.energy_factors.fat),
        ];
        for (name, value) in factors {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidFactor { name, value });
            }
        }
        Ok(())
    }
}

/// Project root when running from `target/{debug,release}`, else the exe directory
fn project_dir() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }
    path
}

/// Export directory from `NUTRI_EXPORT_DIR`, defaulting to `<project>/exports`
pub fn export_dir() -> PathBuf {
    std::env::var(EXPORT_DIR_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| project_dir().join("exports"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LabelConfig::default();
        assert_eq!(config.energy_factors, EnergyFactors::KCAL_DERIVED);
        assert_eq!(config.daily_values.get("Carboidratos (g)"), Some(300.0));
    }

    #[test]
    fn test_partial_override() {
        let config = LabelConfig::from_json(
            r#"{"energy_factors": {"carbohydrate": 17, "protein": 17, "fat": 37}}"#,
            "inline",
        )
        .unwrap();
        assert_eq!(config.energy_factors, EnergyFactors::ROUNDED);
        assert_eq!(config.daily_values, DailyValueTable::brazil());
    }

    #[test]
    fn test_table_override_replaces_defaults() {
        let config =
            LabelConfig::from_json(r#"{"daily_values": {"Sódio (mg)": 2300}}"#, "inline").unwrap();
        assert_eq!(config.daily_values.get("sodio"), Some(2300.0));
        assert_eq!(config.daily_values.get("Carboidratos (g)"), None);
    }

    #[test]
    fn test_rejects_negative_factor() {
        let err = LabelConfig::from_json(
            r#"{"energy_factors": {"carbohydrate": -1, "protein": 17, "fat": 37}}"#,
            "inline",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFactor { name: "carbohydrate", .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = LabelConfig::from_json("{", "broken.json").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
