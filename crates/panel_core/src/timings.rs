use std::time::Duration;

/// Delays driving the poller, reloads and toasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub poll_interval: Duration,
    /// Hard upper bound on how long one task is monitored.
    pub poll_ceiling: Duration,
    /// Delay before reloading after a job finishes or is accepted.
    pub job_reload_delay: Duration,
    /// Delay before reloading after an IP entry was updated or deleted.
    pub action_reload_delay: Duration,
    pub crawl_status_refresh: Duration,
    pub toast_lifetime: Duration,
    pub toast_fade: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            poll_ceiling: Duration::from_secs(180),
            job_reload_delay: Duration::from_secs(10),
            action_reload_delay: Duration::from_secs(2),
            crawl_status_refresh: Duration::from_secs(5),
            toast_lifetime: Duration::from_secs(5),
            toast_fade: Duration::from_millis(500),
        }
    }
}
