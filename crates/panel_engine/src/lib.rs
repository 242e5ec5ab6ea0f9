//! Panel engine: backend HTTP client, timers and status persistence.
mod client;
mod engine;
mod persist;
mod scheduler;
mod status_store;
mod types;

pub use client::{settings_form, Backend, BackendSettings, ReqwestBackend};
pub use engine::{EngineCommand, EngineHandle};
pub use persist::{ensure_state_dir, AtomicFileWriter, PersistError};
pub use scheduler::{Fired, Scheduler};
pub use status_store::{StatusStore, STATUS_FILENAME};
pub use types::{
    ActionReply, BackendError, CrawlStatusReply, DataReply, EngineEvent, FailureKind,
    IpDetailsData, IpOperation, JobEndpoint, ProxySettingsData, SubmitReply, TaskStatusReply,
};
