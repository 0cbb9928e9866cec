use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Lower bound for the pause between two Jikan requests.
pub const MIN_REQUEST_INTERVAL_MS: u64 = 300;

const LOCAL_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub jikan: JikanConfig,

    pub resolver: ResolverConfig,

    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Emit logs as JSON lines instead of the human readable format.
    pub json_logs: bool,

    /// Tokio worker threads; 0 lets tokio pick one per core.
    pub worker_threads: usize,

    /// SQLite pool bounds.
    pub max_db_connections: u32,
    pub min_db_connections: u32,

    /// User identifier used when `--user` is not given on the command line.
    pub default_user: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/animelog.db".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
            default_user: "local".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanConfig {
    pub base_url: String,

    /// Per-request HTTP timeout.
    pub request_timeout_seconds: u64,

    /// Minimum pause between two consecutive metadata requests of one run.
    pub min_request_interval_ms: u64,

    pub user_agent: String,
}

impl Default for JikanConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            request_timeout_seconds: 30,
            min_request_interval_ms: MIN_REQUEST_INTERVAL_MS,
            user_agent: "animelog/0.1".to_string(),
        }
    }
}

impl JikanConfig {
    #[must_use]
    pub const fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Wall-clock cap for one season resolution run. When it elapses the run
    /// falls back to a single season built from the search result.
    pub max_resolution_seconds: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_resolution_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub enabled: bool,

    pub check_interval_minutes: u32,

    pub cron_expression: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_minutes: 360,
            cron_expression: None,
        }
    }
}

impl Config {
    /// Reads the first config file found on the search path, or falls back
    /// to defaults when there is none.
    pub fn load() -> Result<Self> {
        match Self::search_paths().into_iter().find(|p| p.exists()) {
            Some(path) => {
                info!(path = %path.display(), "Loading config");
                Self::load_from_path(&path)
            }
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid TOML in {}", path.display()))
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Cannot write {}", path.display()))
    }

    /// `./config.toml`, then the platform config dir, then `~/.animelog`.
    fn search_paths() -> Vec<PathBuf> {
        std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
            .chain(dirs::config_dir().map(|d| d.join("animelog").join(LOCAL_CONFIG_FILE)))
            .chain(dirs::home_dir().map(|h| h.join(".animelog").join(LOCAL_CONFIG_FILE)))
            .collect()
    }

    /// Writes a default `config.toml` into the working directory. Returns
    /// `false` when one is already there.
    pub fn create_default_if_missing() -> Result<bool> {
        let path = Path::new(LOCAL_CONFIG_FILE);
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to_path(path)?;
        info!(path = %path.display(), "Created default config file");
        Ok(true)
    }

    pub fn validate(&self) -> Result<()> {
        if self.jikan.base_url.is_empty() {
            anyhow::bail!("Jikan base URL cannot be empty");
        }

        if self.jikan.min_request_interval_ms < MIN_REQUEST_INTERVAL_MS {
            anyhow::bail!(
                "jikan.min_request_interval_ms must be at least {MIN_REQUEST_INTERVAL_MS} (got {})",
                self.jikan.min_request_interval_ms
            );
        }

        if self.resolver.max_resolution_seconds == 0 {
            anyhow::bail!("resolver.max_resolution_seconds must be > 0");
        }

        if self.scheduler.enabled
            && self.scheduler.check_interval_minutes == 0
            && self.scheduler.cron_expression.is_none()
        {
            anyhow::bail!(
                "scheduler.check_interval_minutes must be > 0 unless scheduler.cron_expression is set"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.jikan.min_request_interval_ms, 300);
        assert_eq!(config.scheduler.check_interval_minutes, 360);
        assert_eq!(config.general.default_user, "local");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_saved_config_loads_back() {
        let path = std::env::temp_dir()
            .join(format!("animelog-config-{}", uuid::Uuid::new_v4()))
            .join("config.toml");

        let mut config = Config::default();
        config.general.default_user = "alice".to_string();
        config.scheduler.cron_expression = Some("0 0 */6 * * *".to_string());
        config.save_to_path(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        for section in ["[general]", "[jikan]", "[resolver]", "[scheduler]"] {
            assert!(raw.contains(section), "missing {section}");
        }

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.general.default_user, "alice");
        assert_eq!(loaded.scheduler.cron_expression.as_deref(), Some("0 0 */6 * * *"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let raw = r#"
            [general]
            log_level = "debug"

            [jikan]
            min_request_interval_ms = 500
        "#;

        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(
            config.jikan.min_request_interval(),
            Duration::from_millis(500)
        );

        assert_eq!(config.jikan.base_url, "https://api.jikan.moe/v4");
        assert_eq!(config.resolver.max_resolution_seconds, 120);
    }

    #[test]
    fn test_rejects_aggressive_request_interval() {
        let mut config = Config::default();
        config.jikan.min_request_interval_ms = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_interval_without_cron() {
        let mut config = Config::default();
        config.scheduler.check_interval_minutes = 0;
        assert!(config.validate().is_err());

        config.scheduler.cron_expression = Some("0 0 */6 * * *".to_string());
        assert!(config.validate().is_ok());
    }
}
