use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Records older than this are dropped instead of restored.
pub const STATUS_MAX_AGE_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

impl StatusKind {
    pub fn title(self) -> &'static str {
        match self {
            StatusKind::Info => "Info",
            StatusKind::Success => "Success",
            StatusKind::Warning => "Warning",
            StatusKind::Error => "Error",
        }
    }
}

/// The single most-recent status shown in the banner and persisted across reloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: StatusKind,
    pub message: String,
    #[serde(default)]
    pub details: Option<String>,
    pub time: DateTime<Utc>,
}

impl StatusRecord {
    pub fn new(
        status: StatusKind,
        message: impl Into<String>,
        details: Option<String>,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            details: details.filter(|text| !text.trim().is_empty()),
            time,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now.signed_duration_since(self.time)
    }

    /// True once the record is strictly older than the 24 hour window.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.age(now) > TimeDelta::hours(STATUS_MAX_AGE_HOURS)
    }
}
