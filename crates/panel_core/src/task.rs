use std::fmt;

use chrono::{DateTime, Utc};

/// Identifies one polling run; replies tagged with an older generation are stale.
pub type PollGeneration = u64;

/// Long-running backend jobs the panel can launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobKind {
    Crawl,
    Score,
}

impl JobKind {
    pub fn label(self) -> &'static str {
        match self {
            JobKind::Crawl => "IP crawl",
            JobKind::Score => "IP scoring",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status code reported by the task status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatusCode {
    Success,
    Failure,
    Pending,
    Started,
    Other(String),
}

impl TaskStatusCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "SUCCESS" => TaskStatusCode::Success,
            "FAILURE" => TaskStatusCode::Failure,
            "PENDING" => TaskStatusCode::Pending,
            "STARTED" => TaskStatusCode::Started,
            other => TaskStatusCode::Other(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatusCode::Success | TaskStatusCode::Failure)
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatusCode::Success => "SUCCESS",
            TaskStatusCode::Failure => "FAILURE",
            TaskStatusCode::Pending => "PENDING",
            TaskStatusCode::Started => "STARTED",
            TaskStatusCode::Other(code) => code,
        }
    }
}

/// One successful answer from the task status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskProgress {
    pub status: TaskStatusCode,
    pub error: Option<String>,
}

/// Coarse crawler state reported by the crawl status endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlState {
    Running,
    Completed,
    Unknown,
    Other(String),
}

impl CrawlState {
    pub fn parse(state: &str) -> Self {
        match state {
            "running" => CrawlState::Running,
            "completed" => CrawlState::Completed,
            "unknown" => CrawlState::Unknown,
            other => CrawlState::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub state: CrawlState,
    pub message: String,
    pub details: Option<String>,
    /// Present when the backend exposes the id of the running job.
    pub task_id: Option<String>,
}

/// Accepted job submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitAccepted {
    pub task_id: Option<String>,
    pub message: Option<String>,
}

/// Outcome of a backend request as the UI sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    /// The backend answered `success: true`.
    Accepted(T),
    /// The backend answered `success: false`, with its error text when given.
    Rejected(Option<String>),
    /// Transport failure: connect error, timeout, bad status or undecodable body.
    Unreachable(String),
}

impl<T> Reply<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Reply::Accepted(_))
    }
}

/// The single task currently tracked by the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollHandle {
    pub generation: PollGeneration,
    pub task_id: String,
    pub started_at: DateTime<Utc>,
    pub ticks: u32,
}
