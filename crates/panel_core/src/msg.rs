use chrono::{DateTime, Utc};

use crate::{
    CrawlReport, IpDetails, IpMutation, JobKind, PollGeneration, ProxySettings, Reply,
    StatusKind, StatusRecord, SubmitAccepted, TaskProgress, ToastId, ToastKind,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Replace the status banner and persist it.
    ShowStatus {
        status: StatusKind,
        message: String,
        details: Option<String>,
        now: DateTime<Utc>,
    },
    /// User dismissed the status banner.
    HideStatus,
    /// Start-up (or reload) with whatever record was found in storage.
    Restore {
        persisted: Option<StatusRecord>,
        now: DateTime<Utc>,
    },
    /// Re-query the crawl status while the backend reports a running crawl.
    CrawlStatusRefreshDue,
    CrawlStatusReceived {
        reply: Reply<CrawlReport>,
        now: DateTime<Utc>,
    },
    /// Begin tracking a submitted task.
    StartPolling {
        task_id: String,
        now: DateTime<Utc>,
    },
    /// The recurring poll timer fired.
    PollTick { generation: PollGeneration },
    TaskStatusReceived {
        generation: PollGeneration,
        reply: Reply<TaskProgress>,
        now: DateTime<Utc>,
    },
    /// The monitoring ceiling elapsed without a terminal status.
    PollCeilingReached {
        generation: PollGeneration,
        now: DateTime<Utc>,
    },
    /// User asked to launch a job.
    SubmitJob { job: JobKind, now: DateTime<Utc> },
    JobSubmitted {
        job: JobKind,
        reply: Reply<SubmitAccepted>,
        now: DateTime<Utc>,
    },
    Notify {
        title: String,
        message: String,
        kind: ToastKind,
    },
    /// Toast lifetime elapsed; start fading.
    ToastExpired { id: ToastId },
    /// Fade finished; remove the toast.
    ToastFaded { id: ToastId },
    /// User closed a toast.
    ToastDismissed { id: ToastId },
    ShowIpDetails { server: String },
    IpDetailsReceived {
        server: String,
        reply: Reply<IpDetails>,
    },
    MutateIp { mutation: IpMutation, server: String },
    IpMutated {
        mutation: IpMutation,
        server: String,
        reply: Reply<()>,
    },
    LoadSettings,
    SettingsLoaded { reply: Reply<ProxySettings> },
    SaveSettings { settings: ProxySettings },
    SettingsSaved { reply: Reply<()> },
    ModalClosed,
    /// A scheduled reload is due.
    ReloadDue,
    /// Fallback for placeholder wiring.
    NoOp,
}
