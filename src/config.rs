//! Application configuration.
//!
//! Settings are read from `config.toml` in the platform config directory,
//! then overridden by `SPRINTDESK_*` environment variables. A missing file
//! yields the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domain::{ProjectId, Sprint, UserId};

/// Timeouts applied to each kind of request, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub generate_secs: u64,
    pub send_secs: u64,
    pub analyze_secs: u64,
    pub default_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            generate_secs: 60,
            send_secs: 30,
            analyze_secs: 180,
            default_secs: 30,
        }
    }
}

impl Timeouts {
    pub fn generate(&self) -> Duration {
        Duration::from_secs(self.generate_secs)
    }

    pub fn send(&self) -> Duration {
        Duration::from_secs(self.send_secs)
    }

    pub fn analyze(&self) -> Duration {
        Duration::from_secs(self.analyze_secs)
    }

    pub fn default_request(&self) -> Duration {
        Duration::from_secs(self.default_secs)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project-management backend.
    pub api_base_url: String,
    /// AI bridge serving project analysis.
    pub ai_base_url: String,
    /// Signed-in user, recorded as the assigner of generated tasks.
    pub user_id: Option<UserId>,
    /// Project the task assistant adds tasks to.
    pub project_id: Option<ProjectId>,
    /// Sprints offered by the task assistant.
    pub sprints: Vec<Sprint>,
    /// Keychain account holding the API token.
    pub keychain_account: String,
    /// Delay before the offline placeholder draft is shown.
    pub fallback_delay_ms: u64,
    pub timeouts: Timeouts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            ai_base_url: "http://localhost:8001".to_string(),
            user_id: None,
            project_id: None,
            sprints: Vec::new(),
            keychain_account: "default".to_string(),
            fallback_delay_ms: 1000,
            timeouts: Timeouts::default(),
        }
    }
}

impl Config {
    /// Default location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "sprintdesk", "SprintDesk")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads from the default location and applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Reads a config file, returning defaults when it does not exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    /// Applies `SPRINTDESK_*` overrides using `lookup` to read variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("SPRINTDESK_API_URL") {
            self.api_base_url = url;
        }
        if let Some(url) = lookup("SPRINTDESK_AI_URL") {
            self.ai_base_url = url;
        }
        if let Some(id) = lookup("SPRINTDESK_USER_ID") {
            let id: i64 = id.parse().context("SPRINTDESK_USER_ID must be a number")?;
            self.user_id = Some(UserId(id));
        }
        if let Some(id) = lookup("SPRINTDESK_PROJECT_ID") {
            let id: i64 = id.parse().context("SPRINTDESK_PROJECT_ID must be a number")?;
            self.project_id = Some(ProjectId(id));
        }
        Ok(())
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::SprintId;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
api_base_url = "https://pms.example.com"
project_id = 12

[[sprints]]
id = 4
name = "Sprint 4"
active = true

[timeouts]
analyze_secs = 300
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.api_base_url, "https://pms.example.com");
        assert_eq!(config.project_id, Some(ProjectId(12)));
        assert_eq!(config.sprints, vec![Sprint::new(SprintId(4), "Sprint 4").active()]);
        assert_eq!(config.timeouts.analyze_secs, 300);
        assert_eq!(config.timeouts.generate_secs, 60);
        assert_eq!(config.ai_base_url, "http://localhost:8001");
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_base_url = [").unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SPRINTDESK_API_URL", "http://10.0.0.2:8000"),
            ("SPRINTDESK_USER_ID", "42"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api_base_url, "http://10.0.0.2:8000");
        assert_eq!(config.user_id, Some(UserId(42)));
        assert_eq!(config.project_id, None);
    }

    #[test]
    fn non_numeric_id_override_fails() {
        let mut config = Config::default();
        let result = config.apply_env(|key| {
            (key == "SPRINTDESK_PROJECT_ID").then(|| "abc".to_string())
        });
        assert!(result.is_err());
    }
}
