use std::time::Duration;

use crate::{IpMutation, JobKind, PollGeneration, ProxySettings, StatusRecord, ToastId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Overwrite the persisted status record.
    PersistStatus(StatusRecord),
    ClearPersistedStatus,
    FetchCrawlStatus,
    ScheduleCrawlStatusRefresh { after: Duration },
    SubmitJob { job: JobKind },
    /// Arm the recurring poll timer, replacing any previous one.
    StartPollTimer {
        generation: PollGeneration,
        every: Duration,
    },
    /// Arm the monitoring ceiling, replacing any previous one.
    StartPollCeiling {
        generation: PollGeneration,
        after: Duration,
    },
    /// Cancel both poll timers. Cancelling idle timers is a no-op.
    StopPollTimers,
    CheckTask {
        generation: PollGeneration,
        task_id: String,
    },
    ScheduleReload { after: Duration },
    ScheduleToastExpiry { id: ToastId, after: Duration },
    ScheduleToastRemoval { id: ToastId, after: Duration },
    CancelToastTimers { id: ToastId },
    FetchIpDetails { server: String },
    MutateIp { mutation: IpMutation, server: String },
    FetchSettings,
    SaveSettings(ProxySettings),
    /// Drop all timers and state, then restore from storage.
    Reload,
}
