use std::sync::Arc;

use chrono::{DateTime, Utc};
use panel_core::{
    CrawlReport, CrawlState, Effect, IpDetails, IpMutation, JobKind, Msg, PollGeneration,
    ProxySettings, Reply, StatusRecord, SubmitAccepted, TaskProgress, TaskStatusCode, ToastId,
};
use panel_engine::{
    Backend, BackendError, EngineCommand, EngineEvent, EngineHandle, Fired, IpDetailsData,
    IpOperation, JobEndpoint, ProxySettingsData, Scheduler, StatusStore,
};
use panel_logging::{panel_debug, panel_info, panel_warn};
use tokio::sync::mpsc::UnboundedReceiver;

/// Source of wall-clock time for status records.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// One live timer per slot; re-arming a slot replaces its timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimerSlot {
    PollInterval,
    PollCeiling,
    CrawlStatusRefresh,
    Reload,
    ToastExpiry(ToastId),
    ToastRemoval(ToastId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    PollTick(PollGeneration),
    PollCeiling(PollGeneration),
    CrawlStatusRefresh,
    Reload,
    ToastExpired(ToastId),
    ToastFaded(ToastId),
}

impl TimerEvent {
    fn into_msg(self, now: DateTime<Utc>) -> Msg {
        match self {
            TimerEvent::PollTick(generation) => Msg::PollTick { generation },
            TimerEvent::PollCeiling(generation) => Msg::PollCeilingReached { generation, now },
            TimerEvent::CrawlStatusRefresh => Msg::CrawlStatusRefreshDue,
            TimerEvent::Reload => Msg::ReloadDue,
            TimerEvent::ToastExpired(id) => Msg::ToastExpired { id },
            TimerEvent::ToastFaded(id) => Msg::ToastFaded { id },
        }
    }
}

/// What the runtime must do after an effect ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    Continue,
    /// Timers are gone; state must be reset and restored.
    Reload,
}

/// Executes core effects against the backend, the timers and the status store,
/// and turns their results back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    engine_rx: UnboundedReceiver<EngineEvent>,
    timers: Scheduler<TimerSlot, TimerEvent>,
    timer_rx: UnboundedReceiver<Fired<TimerSlot, TimerEvent>>,
    store: StatusStore,
    in_flight: usize,
    clock: Clock,
}

impl EffectRunner {
    pub fn new(backend: Arc<dyn Backend>, store: StatusStore, clock: Clock) -> Self {
        let (engine, engine_rx) = EngineHandle::new(backend);
        let (timers, timer_rx) = Scheduler::new();
        Self {
            engine,
            engine_rx,
            timers,
            timer_rx,
            store,
            in_flight: 0,
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn load_status(&self) -> Option<StatusRecord> {
        self.store.load()
    }

    /// No request in flight and no timer armed. A pending crawl status refresh
    /// does not count; only a watching session waits for it.
    pub fn is_idle(&self) -> bool {
        let refresh = usize::from(self.timers.is_active(&TimerSlot::CrawlStatusRefresh));
        self.in_flight == 0 && self.timers.active_count() == refresh
    }

    pub fn cancel_timers(&mut self) {
        self.timers.cancel_all();
    }

    /// Arms a one-off crawl status refresh unless one is already pending.
    pub fn schedule_refresh(&mut self, after: std::time::Duration) {
        if !self.timers.is_active(&TimerSlot::CrawlStatusRefresh) {
            self.timers.once(
                TimerSlot::CrawlStatusRefresh,
                after,
                TimerEvent::CrawlStatusRefresh,
            );
        }
    }

    pub fn run(&mut self, effect: Effect) -> Followup {
        match effect {
            Effect::PersistStatus(record) => self.store.save_or_log(&record),
            Effect::ClearPersistedStatus => self.store.clear(),
            Effect::FetchCrawlStatus => self.send(EngineCommand::FetchCrawlStatus),
            Effect::ScheduleCrawlStatusRefresh { after } => {
                self.timers.once(
                    TimerSlot::CrawlStatusRefresh,
                    after,
                    TimerEvent::CrawlStatusRefresh,
                );
            }
            Effect::SubmitJob { job } => {
                panel_info!("Submitting {} job", job);
                self.send(EngineCommand::SubmitJob(endpoint_for(job)));
            }
            Effect::StartPollTimer { generation, every } => {
                self.timers.every(
                    TimerSlot::PollInterval,
                    every,
                    TimerEvent::PollTick(generation),
                );
            }
            Effect::StartPollCeiling { generation, after } => {
                self.timers.once(
                    TimerSlot::PollCeiling,
                    after,
                    TimerEvent::PollCeiling(generation),
                );
            }
            Effect::StopPollTimers => {
                self.timers.cancel(&TimerSlot::PollInterval);
                self.timers.cancel(&TimerSlot::PollCeiling);
            }
            Effect::CheckTask {
                generation,
                task_id,
            } => self.send(EngineCommand::CheckTask {
                tag: generation,
                task_id,
            }),
            Effect::ScheduleReload { after } => {
                panel_info!("Reload scheduled in {:?}", after);
                self.timers.once(TimerSlot::Reload, after, TimerEvent::Reload);
            }
            Effect::ScheduleToastExpiry { id, after } => {
                self.timers
                    .once(TimerSlot::ToastExpiry(id), after, TimerEvent::ToastExpired(id));
            }
            Effect::ScheduleToastRemoval { id, after } => {
                self.timers
                    .once(TimerSlot::ToastRemoval(id), after, TimerEvent::ToastFaded(id));
            }
            Effect::CancelToastTimers { id } => {
                self.timers.cancel(&TimerSlot::ToastExpiry(id));
                self.timers.cancel(&TimerSlot::ToastRemoval(id));
            }
            Effect::FetchIpDetails { server } => {
                self.send(EngineCommand::FetchIpDetails { server })
            }
            Effect::MutateIp { mutation, server } => self.send(EngineCommand::MutateIp {
                operation: operation_for(mutation),
                server,
            }),
            Effect::FetchSettings => self.send(EngineCommand::LoadSettings),
            Effect::SaveSettings(settings) => {
                self.send(EngineCommand::SaveSettings(settings_data(&settings)))
            }
            Effect::Reload => {
                panel_info!("Reloading");
                self.timers.cancel_all();
                return Followup::Reload;
            }
        }
        Followup::Continue
    }

    /// Waits for the next backend result or live timer event.
    ///
    /// Events from cancelled or replaced timers are dropped here.
    pub async fn next_msg(&mut self) -> Option<Msg> {
        loop {
            tokio::select! {
                Some(event) = self.engine_rx.recv() => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    return Some(event_to_msg(event, self.now()));
                }
                Some(fired) = self.timer_rx.recv() => {
                    if !self.timers.accept(&fired) {
                        panel_debug!("Dropping stale timer event {:?}", fired.key);
                        continue;
                    }
                    return Some(fired.payload.into_msg(self.now()));
                }
                else => return None,
            }
        }
    }

    fn send(&mut self, command: EngineCommand) {
        self.in_flight += 1;
        self.engine.dispatch(command);
    }
}

fn endpoint_for(job: JobKind) -> JobEndpoint {
    match job {
        JobKind::Crawl => JobEndpoint::CrawlOnce,
        JobKind::Score => JobEndpoint::ScoreOnce,
    }
}

fn job_for(endpoint: JobEndpoint) -> JobKind {
    match endpoint {
        JobEndpoint::CrawlOnce => JobKind::Crawl,
        JobEndpoint::ScoreOnce => JobKind::Score,
    }
}

fn operation_for(mutation: IpMutation) -> IpOperation {
    match mutation {
        IpMutation::Update => IpOperation::Update,
        IpMutation::Delete => IpOperation::Delete,
    }
}

fn mutation_for(operation: IpOperation) -> IpMutation {
    match operation {
        IpOperation::Update => IpMutation::Update,
        IpOperation::Delete => IpMutation::Delete,
    }
}

fn settings_data(settings: &ProxySettings) -> ProxySettingsData {
    ProxySettingsData {
        crawler_interval: settings.crawler_interval,
        score_interval: settings.score_interval,
        min_score: settings.min_score,
        captcha_retries: settings.captcha_retries,
        auto_crawler: settings.auto_crawler,
        auto_score: settings.auto_score,
    }
}

fn proxy_settings(data: ProxySettingsData) -> ProxySettings {
    ProxySettings {
        crawler_interval: data.crawler_interval,
        score_interval: data.score_interval,
        min_score: data.min_score,
        captcha_retries: data.captcha_retries,
        auto_crawler: data.auto_crawler,
        auto_score: data.auto_score,
    }
}

fn ip_details(server: &str, data: IpDetailsData) -> IpDetails {
    IpDetails {
        server: if data.server.is_empty() {
            server.to_string()
        } else {
            data.server
        },
        country: data.country.unwrap_or_default(),
        city: data.city.unwrap_or_default(),
        isp: data.isp.unwrap_or_default(),
        score: data.score,
        ping_ms: data.ping,
        speed_mbps: data.speed,
        updated_at: data.updated_at.unwrap_or_default(),
    }
}

fn transport_failure<T>(what: &str, err: BackendError) -> Reply<T> {
    panel_warn!("{} failed: {}", what, err);
    Reply::Unreachable(err.to_string())
}

/// Maps `success: true/false` replies onto accepted or rejected outcomes.
fn reply<T>(success: bool, error: Option<String>, accepted: impl FnOnce() -> T) -> Reply<T> {
    if success {
        Reply::Accepted(accepted())
    } else {
        Reply::Rejected(error)
    }
}

fn event_to_msg(event: EngineEvent, now: DateTime<Utc>) -> Msg {
    match event {
        EngineEvent::JobSubmitted { job, result } => Msg::JobSubmitted {
            job: job_for(job),
            reply: match result {
                Ok(body) => reply(body.success, body.error, || SubmitAccepted {
                    task_id: body.task_id,
                    message: body.message,
                }),
                Err(err) => transport_failure("Job submission", err),
            },
            now,
        },
        EngineEvent::TaskChecked {
            tag,
            task_id,
            result,
        } => Msg::TaskStatusReceived {
            generation: tag,
            reply: match result {
                Ok(body) => {
                    let error = body.result_error().or_else(|| body.error.clone());
                    reply(body.success, body.error.clone(), || TaskProgress {
                        status: TaskStatusCode::parse(&body.status),
                        error,
                    })
                }
                Err(err) => transport_failure(&format!("Status check of task {task_id}"), err),
            },
            now,
        },
        EngineEvent::CrawlStatus { result } => Msg::CrawlStatusReceived {
            reply: match result {
                Ok(body) => reply(body.success, body.error, || CrawlReport {
                    state: CrawlState::parse(&body.status),
                    message: body.message,
                    details: body.details,
                    task_id: body.task_id,
                }),
                Err(err) => transport_failure("Crawl status check", err),
            },
            now,
        },
        EngineEvent::IpDetails { server, result } => {
            let reply = match result {
                Ok(body) => match (body.success, body.data) {
                    (true, Some(data)) => Reply::Accepted(ip_details(&server, data)),
                    (_, _) => Reply::Rejected(body.error),
                },
                Err(err) => transport_failure(&format!("Details of {server}"), err),
            };
            Msg::IpDetailsReceived { server, reply }
        }
        EngineEvent::IpMutated {
            operation,
            server,
            result,
        } => {
            let reply = match result {
                Ok(body) => reply(body.success, body.error, || ()),
                Err(err) => transport_failure(&format!("{:?} of {server}", operation), err),
            };
            Msg::IpMutated {
                mutation: mutation_for(operation),
                server,
                reply,
            }
        }
        EngineEvent::SettingsLoaded { result } => Msg::SettingsLoaded {
            reply: match result {
                Ok(body) => match (body.success, body.data) {
                    (true, Some(data)) => Reply::Accepted(proxy_settings(data)),
                    (_, _) => Reply::Rejected(body.error),
                },
                Err(err) => transport_failure("Loading settings", err),
            },
        },
        EngineEvent::SettingsSaved { result } => Msg::SettingsSaved {
            reply: match result {
                Ok(body) => reply(body.success, body.error, || ()),
                Err(err) => transport_failure("Saving settings", err),
            },
        },
    }
}
