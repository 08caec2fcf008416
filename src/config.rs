// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the health report engine

use crate::errors::ReportError;
use crate::models::Goals;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory.
const LOCAL_CONFIG_FILE: &str = "health_report.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Weekly targets the report scores against. Required.
    pub goals: Goals,
    /// Rollup ledger persistence.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Optional narrative generation endpoint.
    pub narrative: Option<NarrativeConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// Path to the JSON rollup ledger file.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NarrativeConfig {
    /// HTTP endpoint that turns report facts into narrative copy.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Bearer token, overridable via NARRATIVE_API_KEY.
    pub api_key: Option<String>,
}

/// Parse-time shape where goals may be absent so the missing case can
/// be reported as a configuration error instead of a toml error.
#[derive(Debug, Deserialize)]
struct RawConfig {
    goals: Option<Goals>,
    #[serde(default)]
    ledger: LedgerConfig,
    narrative: Option<NarrativeConfig>,
}

impl Config {
    /// Load configuration from an explicit path, the working directory,
    /// or the platform config directory, in that order.
    pub fn load(path: Option<String>) -> Result<Self> {
        dotenv::dotenv().ok();

        let config_path = match path {
            Some(explicit) => {
                let p = PathBuf::from(&explicit);
                if !p.exists() {
                    return Err(ReportError::Configuration(format!(
                        "config file not found: {explicit}"
                    ))
                    .into());
                }
                p
            }
            None => match Self::discover() {
                Some(found) => found,
                None => {
                    return Err(ReportError::Configuration(
                        "no config file found; create health_report.toml with a [goals] section"
                            .to_string(),
                    )
                    .into())
                }
            },
        };

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        let raw: RawConfig = toml::from_str(&content).context("Failed to parse config file")?;

        let goals = match raw.goals {
            Some(goals) if !goals.is_empty() => goals,
            _ => {
                return Err(ReportError::Configuration(
                    "goals must be configured; fill in the [goals] section".to_string(),
                )
                .into())
            }
        };

        let mut narrative = raw.narrative;
        if let Some(cfg) = narrative.as_mut() {
            if let Ok(key) = std::env::var("NARRATIVE_API_KEY") {
                cfg.api_key = Some(key);
            }
        }

        Ok(Self {
            goals,
            ledger: raw.ledger,
            narrative,
        })
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        let global = dirs::config_dir().map(|p| p.join("health-report/config.toml"))?;
        if global.exists() {
            return Some(global);
        }
        None
    }

    #[allow(dead_code)]
    pub fn save(&self, path: Option<String>) -> Result<()> {
        let config_path = path.unwrap_or_else(|| {
            dirs::config_dir()
                .map(|p| p.join("health-report/config.toml"))
                .unwrap_or_else(|| "config.toml".into())
                .to_string_lossy()
                .to_string()
        });

        let parent = Path::new(&config_path)
            .parent()
            .context("Invalid config path")?;
        fs::create_dir_all(parent)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Helper function to create sample goals
    fn create_sample_goals() -> Goals {
        Goals {
            steps: Some(70_000.0),
            sleep_minutes: Some(444.0),
            resting_heart_rate: Some(52.0),
            weekly_training_load: Some(20_000.0),
            weekly_work_hours: Some(45.0),
            steps_floor: 6000.0,
            steps_floor_days: 5,
        }
    }

    /// Helper function to create a temporary config file
    fn create_temp_config_file(content: &str) -> (TempDir, String) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("health_report.toml");
        fs::write(&config_path, content).expect("Failed to write temp config");
        (temp_dir, config_path.to_string_lossy().to_string())
    }

    #[test]
    fn test_config_load_from_file() {
        let config_content = r#"
[goals]
steps = 70000.0
sleep_minutes = 444.0
resting_heart_rate = 52.0
weekly_training_load = 20000.0
weekly_work_hours = 45.0

[ledger]
path = "./rollups.json"

[narrative]
endpoint = "http://localhost:9090/narrative"
timeout_secs = 20
"#;

        let (_temp_dir, config_path) = create_temp_config_file(config_content);

        let config = Config::load(Some(config_path)).expect("Failed to load config");

        assert_eq!(config.goals.steps, Some(70_000.0));
        assert_eq!(config.goals.sleep_minutes, Some(444.0));
        assert_eq!(config.goals.steps_floor, 6000.0);
        assert_eq!(config.goals.steps_floor_days, 5);
        assert_eq!(config.ledger.path.as_deref(), Some("./rollups.json"));

        let narrative = config.narrative.expect("narrative config present");
        assert_eq!(narrative.endpoint, "http://localhost:9090/narrative");
        assert_eq!(narrative.timeout_secs, Some(20));
    }

    #[test]
    fn test_config_load_goal_defaults() {
        let config_content = r#"
[goals]
steps = 70000.0
sleep_minutes = 420.0
stepsFloor = 5000.0
"#;
        let (_temp_dir, config_path) = create_temp_config_file(config_content);

        let config = Config::load(Some(config_path)).expect("Failed to load config");
        assert_eq!(config.goals.steps_floor, 5000.0);
        assert_eq!(config.goals.steps_floor_days, 5);
        assert!(config.goals.weekly_work_hours.is_none());
        assert!(config.narrative.is_none());
    }

    #[test]
    fn test_config_missing_goals_is_fatal() {
        let config_content = r#"
[ledger]
path = "./rollups.json"
"#;
        let (_temp_dir, config_path) = create_temp_config_file(config_content);

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("goals must be configured"));
    }

    #[test]
    fn test_config_empty_goals_is_fatal() {
        let config_content = "[goals]\n";
        let (_temp_dir, config_path) = create_temp_config_file(config_content);

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("goals must be configured"));
    }

    #[test]
    fn test_config_explicit_path_must_exist() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let missing = temp_dir.path().join("nope.toml");

        let err = Config::load(Some(missing.to_string_lossy().to_string())).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let invalid_toml = "this is not valid toml [[[";
        let (_temp_dir, config_path) = create_temp_config_file(invalid_toml);

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_save_creates_directory() {
        let config = Config {
            goals: create_sample_goals(),
            ledger: LedgerConfig {
                path: Some("./rollups.json".to_string()),
            },
            narrative: None,
        };
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let nested_path = temp_dir.path().join("nested").join("config.toml");
        let nested_path_str = nested_path.to_string_lossy().to_string();

        config
            .save(Some(nested_path_str.clone()))
            .expect("Failed to save config");

        assert!(nested_path.exists());

        let loaded = Config::load(Some(nested_path_str)).expect("Failed to load saved config");
        assert_eq!(loaded.goals.steps, config.goals.steps);
        assert_eq!(loaded.ledger.path, config.ledger.path);
    }
}
