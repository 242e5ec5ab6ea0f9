use std::ops::RangeInclusive;

use thiserror::Error;

pub const CRAWLER_INTERVAL_MINUTES: RangeInclusive<i64> = 1..=1440;
pub const SCORE_INTERVAL_MINUTES: RangeInclusive<i64> = 1..=1440;
pub const MIN_SCORE: RangeInclusive<i64> = 0..=100;
pub const CAPTCHA_RETRIES: RangeInclusive<i64> = 0..=20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
}

/// Proxy pool scheduling settings edited from the settings form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    pub crawler_interval: i64,
    pub score_interval: i64,
    pub min_score: i64,
    pub captcha_retries: i64,
    pub auto_crawler: bool,
    pub auto_score: bool,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            crawler_interval: 60,
            score_interval: 30,
            min_score: 60,
            captcha_retries: 5,
            auto_crawler: false,
            auto_score: false,
        }
    }
}

impl ProxySettings {
    /// Checks every numeric field against its allowed range, reporting the first violation.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check("crawler_interval", self.crawler_interval, CRAWLER_INTERVAL_MINUTES)?;
        check("score_interval", self.score_interval, SCORE_INTERVAL_MINUTES)?;
        check("min_score", self.min_score, MIN_SCORE)?;
        check("captcha_retries", self.captcha_retries, CAPTCHA_RETRIES)?;
        Ok(())
    }
}

fn check(field: &'static str, value: i64, range: RangeInclusive<i64>) -> Result<(), SettingsError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::OutOfRange {
            field,
            min: *range.start(),
            max: *range.end(),
            value,
        })
    }
}

/// Details of one proxy server entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IpDetails {
    pub server: String,
    pub country: String,
    pub city: String,
    pub isp: String,
    pub score: Option<f64>,
    pub ping_ms: Option<f64>,
    pub speed_mbps: Option<f64>,
    pub updated_at: String,
}

/// Write operations on a single proxy server entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpMutation {
    Update,
    Delete,
}

impl IpMutation {
    pub fn past_tense(self) -> &'static str {
        match self {
            IpMutation::Update => "updated",
            IpMutation::Delete => "deleted",
        }
    }
}
