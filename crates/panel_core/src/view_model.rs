use chrono::{DateTime, Utc};

use crate::{JobKind, Modal, StatusKind, ToastId, ToastKind};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub banner: Option<BannerView>,
    pub toasts: Vec<ToastView>,
    pub polling: Option<PollView>,
    pub modal: Option<Modal>,
    pub submitting: Vec<JobKind>,
    pub reload_pending: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerView {
    pub kind: StatusKind,
    pub title: String,
    pub message: String,
    pub details: Option<String>,
    /// Time of the original event, also after a restore.
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastView {
    pub id: ToastId,
    pub title: String,
    pub message: String,
    pub kind: ToastKind,
    pub fading: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollView {
    pub task_id: String,
    pub ticks: u32,
    pub started_at: DateTime<Utc>,
}
