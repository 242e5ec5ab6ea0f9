use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::view_model::{AppViewModel, BannerView, PollView, ToastView};
use crate::{
    IpDetails, JobKind, PollGeneration, PollHandle, ProxySettings, StatusRecord, Timings, ToastId,
    ToastKind, ToastPhase, ToastRecord,
};

/// Content of the currently open dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    IpDetails(IpDetails),
    Settings(ProxySettings),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    timings: Timings,
    banner: Option<StatusRecord>,
    poll: Option<PollHandle>,
    last_generation: PollGeneration,
    submitting: BTreeSet<JobKind>,
    toasts: BTreeMap<ToastId, ToastRecord>,
    last_toast_id: ToastId,
    modal: Option<Modal>,
    reload_pending: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timings(timings: Timings) -> Self {
        Self {
            timings,
            ..Self::default()
        }
    }

    /// Blank state for a reload. Poll generations and toast ids keep counting,
    /// so replies addressed to the discarded state stay stale.
    pub fn reloaded(&self) -> Self {
        Self {
            timings: self.timings,
            last_generation: self.last_generation,
            last_toast_id: self.last_toast_id,
            ..Self::default()
        }
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn banner(&self) -> Option<&StatusRecord> {
        self.banner.as_ref()
    }

    pub fn active_poll(&self) -> Option<&PollHandle> {
        self.poll.as_ref()
    }

    pub fn toast_count(&self) -> usize {
        self.toasts.len()
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn is_submitting(&self, job: JobKind) -> bool {
        self.submitting.contains(&job)
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            banner: self.banner.as_ref().map(|record| BannerView {
                kind: record.status,
                title: record.status.title().to_string(),
                message: record.message.clone(),
                details: record.details.clone(),
                time: record.time,
            }),
            toasts: self
                .toasts
                .values()
                .map(|toast| ToastView {
                    id: toast.id,
                    title: toast.title.clone(),
                    message: toast.message.clone(),
                    kind: toast.kind,
                    fading: toast.phase == ToastPhase::Fading,
                })
                .collect(),
            polling: self.poll.as_ref().map(|poll| PollView {
                task_id: poll.task_id.clone(),
                ticks: poll.ticks,
                started_at: poll.started_at,
            }),
            modal: self.modal.clone(),
            submitting: self.submitting.iter().copied().collect(),
            reload_pending: self.reload_pending,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_banner(&mut self, record: StatusRecord) {
        self.banner = Some(record);
        self.mark_dirty();
    }

    pub(crate) fn clear_banner(&mut self) {
        if self.banner.take().is_some() {
            self.mark_dirty();
        }
    }

    /// Replaces any tracked task; the previous generation becomes stale.
    pub(crate) fn begin_poll(&mut self, task_id: String, now: DateTime<Utc>) -> PollGeneration {
        self.last_generation += 1;
        self.poll = Some(PollHandle {
            generation: self.last_generation,
            task_id,
            started_at: now,
            ticks: 0,
        });
        self.mark_dirty();
        self.last_generation
    }

    pub(crate) fn is_current_poll(&self, generation: PollGeneration) -> bool {
        self.poll
            .as_ref()
            .is_some_and(|poll| poll.generation == generation)
    }

    pub(crate) fn record_tick(&mut self, generation: PollGeneration) -> Option<String> {
        let poll = self.poll.as_mut().filter(|poll| poll.generation == generation)?;
        poll.ticks += 1;
        Some(poll.task_id.clone())
    }

    pub(crate) fn end_poll(&mut self) -> Option<PollHandle> {
        let ended = self.poll.take();
        if ended.is_some() {
            self.mark_dirty();
        }
        ended
    }

    /// Returns false when a submission of `job` is already in flight.
    pub(crate) fn begin_submit(&mut self, job: JobKind) -> bool {
        let inserted = self.submitting.insert(job);
        if inserted {
            self.mark_dirty();
        }
        inserted
    }

    pub(crate) fn finish_submit(&mut self, job: JobKind) {
        if self.submitting.remove(&job) {
            self.mark_dirty();
        }
    }

    pub(crate) fn push_toast(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: ToastKind,
    ) -> ToastId {
        self.last_toast_id += 1;
        let id = self.last_toast_id;
        self.toasts.insert(
            id,
            ToastRecord {
                id,
                title: title.into(),
                message: message.into(),
                kind,
                phase: ToastPhase::Visible,
            },
        );
        self.mark_dirty();
        id
    }

    /// Moves a visible toast into its fade; false if it is gone or already fading.
    pub(crate) fn fade_toast(&mut self, id: ToastId) -> bool {
        match self.toasts.get_mut(&id) {
            Some(toast) if toast.phase == ToastPhase::Visible => {
                toast.phase = ToastPhase::Fading;
                self.mark_dirty();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn remove_toast(&mut self, id: ToastId) -> bool {
        let removed = self.toasts.remove(&id).is_some();
        if removed {
            self.mark_dirty();
        }
        removed
    }

    pub(crate) fn open_modal(&mut self, modal: Modal) {
        self.modal = Some(modal);
        self.mark_dirty();
    }

    pub(crate) fn close_modal(&mut self) {
        if self.modal.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn is_settings_open(&self) -> bool {
        matches!(self.modal, Some(Modal::Settings(_)))
    }

    pub(crate) fn set_reload_pending(&mut self) {
        self.reload_pending = true;
        self.mark_dirty();
    }
}
