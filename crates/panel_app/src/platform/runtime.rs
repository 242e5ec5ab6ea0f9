use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use panel_core::{update, AppState, Msg, Timings};
use panel_engine::{Backend, StatusStore};
use panel_logging::{panel_debug, panel_trace, panel_warn};

use super::effects::{Clock, EffectRunner, Followup};
use super::render::Renderer;

/// Owns the controller state and feeds it every input as a [`Msg`].
pub struct PanelRuntime<R: Renderer> {
    state: AppState,
    effects: EffectRunner,
    renderer: R,
}

impl<R: Renderer> PanelRuntime<R> {
    /// Must be called within a tokio runtime.
    pub fn new(
        backend: Arc<dyn Backend>,
        store: StatusStore,
        timings: Timings,
        clock: Clock,
        renderer: R,
    ) -> Self {
        Self {
            state: AppState::with_timings(timings),
            effects: EffectRunner::new(backend, store, clock),
            renderer,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn is_idle(&self) -> bool {
        self.effects.is_idle()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.effects.now()
    }

    /// Shows the persisted banner (when still fresh) and asks for the crawl status.
    pub fn restore(&mut self) {
        let persisted = self.effects.load_status();
        let now = self.effects.now();
        self.dispatch(Msg::Restore { persisted, now });
    }

    /// Restores and processes events until the crawl status reply is applied,
    /// so later messages are not overwritten by it.
    pub async fn restore_settled(&mut self) {
        self.restore();
        while !self.effects.is_idle() {
            let Some(msg) = self.effects.next_msg().await else {
                break;
            };
            let settled = matches!(msg, Msg::CrawlStatusReceived { .. });
            self.dispatch(msg);
            if settled {
                break;
            }
        }
    }

    pub fn dispatch(&mut self, msg: Msg) {
        panel_trace!("Dispatching {:?}", msg);
        if let Msg::StartPolling { task_id, .. } = &msg {
            if task_id.trim().is_empty() {
                panel_warn!("Ignoring a monitoring request without a task id");
            }
        }
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        if was_dirty {
            self.renderer.present(&self.state.view());
        }

        for effect in effects {
            if self.effects.run(effect) == Followup::Reload {
                self.reload();
            }
        }
    }

    /// Processes events until nothing is in flight and no timer is armed,
    /// a pending crawl status refresh aside.
    pub async fn run_until_idle(&mut self) {
        self.run_until(|_| false).await;
        panel_debug!("Session idle");
    }

    /// Processes events until `done` holds for the state or the session is idle.
    pub async fn run_until(&mut self, mut done: impl FnMut(&AppState) -> bool) {
        while !done(&self.state) && !self.effects.is_idle() {
            match self.effects.next_msg().await {
                Some(msg) => self.dispatch(msg),
                None => break,
            }
        }
    }

    /// Processes events until `interrupt` completes, refreshing the crawl
    /// status whenever the session would otherwise go quiet.
    pub async fn run_until_interrupted(&mut self, interrupt: impl Future<Output = ()>) {
        tokio::pin!(interrupt);
        loop {
            if self.effects.is_idle() {
                self.effects
                    .schedule_refresh(self.state.timings().crawl_status_refresh);
            }
            tokio::select! {
                _ = &mut interrupt => break,
                msg = self.effects.next_msg() => match msg {
                    Some(msg) => self.dispatch(msg),
                    None => break,
                },
            }
        }
        self.effects.cancel_timers();
        panel_debug!("Watch interrupted");
    }

    fn reload(&mut self) {
        self.state = self.state.reloaded();
        self.renderer.present(&self.state.view());
        self.restore();
    }
}
