//! Panel configuration, read from an optional RON file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use panel_core::Timings;
use panel_engine::BackendSettings;
use panel_logging::{panel_debug, panel_info};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILENAME: &str = "panel.ron";
pub const DEFAULT_STATE_DIR: &str = ".proxy_panel";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub base_url: String,
    pub csrf_token: Option<String>,
    pub session_cookie: Option<String>,
    /// Holds the persisted status banner and the log file.
    pub state_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub timings: TimingsConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let backend = BackendSettings::default();
        Self {
            base_url: backend.base_url,
            csrf_token: None,
            session_cookie: None,
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            connect_timeout_secs: backend.connect_timeout.as_secs(),
            request_timeout_secs: backend.request_timeout.as_secs(),
            timings: TimingsConfig::default(),
        }
    }
}

/// Optional overrides of the controller delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimingsConfig {
    pub poll_interval_secs: u64,
    pub poll_ceiling_secs: u64,
    pub job_reload_delay_secs: u64,
    pub action_reload_delay_secs: u64,
    pub crawl_status_refresh_secs: u64,
    pub toast_lifetime_ms: u64,
    pub toast_fade_ms: u64,
}

impl Default for TimingsConfig {
    fn default() -> Self {
        let timings = Timings::default();
        Self {
            poll_interval_secs: timings.poll_interval.as_secs(),
            poll_ceiling_secs: timings.poll_ceiling.as_secs(),
            job_reload_delay_secs: timings.job_reload_delay.as_secs(),
            action_reload_delay_secs: timings.action_reload_delay.as_secs(),
            crawl_status_refresh_secs: timings.crawl_status_refresh.as_secs(),
            toast_lifetime_ms: duration_ms(timings.toast_lifetime),
            toast_fade_ms: duration_ms(timings.toast_fade),
        }
    }
}

impl TimingsConfig {
    pub fn to_timings(self) -> Timings {
        Timings {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            poll_ceiling: Duration::from_secs(self.poll_ceiling_secs),
            job_reload_delay: Duration::from_secs(self.job_reload_delay_secs),
            action_reload_delay: Duration::from_secs(self.action_reload_delay_secs),
            crawl_status_refresh: Duration::from_secs(self.crawl_status_refresh_secs),
            toast_lifetime: Duration::from_millis(self.toast_lifetime_ms),
            toast_fade: Duration::from_millis(self.toast_fade_ms),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl PanelConfig {
    /// Reads `path`. A missing file yields the defaults unless it was named explicitly.
    pub fn load(path: &Path, explicit: bool) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !explicit => {
                panel_debug!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config {}", path.display()))
            }
        };

        let config: Self = ron::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        panel_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }
        if self.timings.poll_interval_secs == 0 {
            bail!("timings.poll_interval_secs must be at least 1");
        }
        if self.timings.poll_ceiling_secs == 0 {
            bail!("timings.poll_ceiling_secs must be at least 1");
        }
        Ok(())
    }

    pub fn timings(&self) -> Timings {
        self.timings.to_timings()
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.base_url.clone(),
            csrf_token: self.csrf_token.clone(),
            session_cookie: self.session_cookie.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..BackendSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_default_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = PanelConfig::load(&temp.path().join(DEFAULT_CONFIG_FILENAME), false).unwrap();
        assert_eq!(config, PanelConfig::default());
        assert_eq!(config.timings(), Timings::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(PanelConfig::load(&temp.path().join("other.ron"), true).is_err());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(
                base_url: "http://panel.local:8000/admin/",
                csrf_token: Some("tok"),
                timings: (poll_interval_secs: 2, toast_fade_ms: 250),
            )"#,
        )
        .unwrap();

        let config = PanelConfig::load(&path, true).unwrap();
        assert_eq!(config.base_url, "http://panel.local:8000/admin/");
        assert_eq!(config.csrf_token.as_deref(), Some("tok"));
        assert_eq!(config.state_dir, PathBuf::from(DEFAULT_STATE_DIR));

        let timings = config.timings();
        assert_eq!(timings.poll_interval, Duration::from_secs(2));
        assert_eq!(timings.toast_fade, Duration::from_millis(250));
        assert_eq!(timings.poll_ceiling, Duration::from_secs(180));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(&path, "(base_url: 42").unwrap();
        assert!(PanelConfig::load(&path, false).is_err());
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut config = PanelConfig::default();
        config.timings.poll_interval_secs = 0;
        assert!(config.validate().is_err());
        assert!(PanelConfig::default().validate().is_ok());
    }
}
