//! Panel core: pure state machine for the status banner, task poller and toasts.
mod effect;
mod msg;
mod settings;
mod state;
mod status;
mod task;
mod timings;
mod toast;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use settings::{
    IpDetails, IpMutation, ProxySettings, SettingsError, CAPTCHA_RETRIES,
    CRAWLER_INTERVAL_MINUTES, MIN_SCORE, SCORE_INTERVAL_MINUTES,
};
pub use state::{AppState, Modal};
pub use status::{StatusKind, StatusRecord, STATUS_MAX_AGE_HOURS};
pub use task::{
    CrawlReport, CrawlState, JobKind, PollGeneration, PollHandle, Reply, SubmitAccepted,
    TaskProgress, TaskStatusCode,
};
pub use timings::Timings;
pub use toast::{ToastId, ToastKind, ToastPhase, ToastRecord};
pub use update::update;
pub use view_model::{AppViewModel, BannerView, PollView, ToastView};
