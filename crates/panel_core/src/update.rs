use chrono::{DateTime, Utc};

use crate::{
    AppState, CrawlReport, CrawlState, Effect, IpMutation, JobKind, Modal, Msg, PollGeneration,
    Reply, StatusKind, StatusRecord, SubmitAccepted, TaskProgress, TaskStatusCode, ToastKind,
};

const NETWORK_FAILURE: &str = "Network request failed, please try again later";
const UNKNOWN_ERROR: &str = "unknown error";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ShowStatus {
            status,
            message,
            details,
            now,
        } => vec![show_status(&mut state, status, message, details, now)],
        Msg::HideStatus => {
            state.clear_banner();
            vec![Effect::ClearPersistedStatus]
        }
        Msg::Restore { persisted, now } => {
            let mut effects = Vec::with_capacity(2);
            match persisted {
                Some(record) if record.is_expired(now) => {
                    effects.push(Effect::ClearPersistedStatus);
                }
                // Re-rendered as stored: the original timestamp stays and nothing is rewritten.
                Some(record) => state.set_banner(record),
                None => {}
            }
            effects.push(Effect::FetchCrawlStatus);
            effects
        }
        Msg::CrawlStatusRefreshDue => vec![Effect::FetchCrawlStatus],
        Msg::CrawlStatusReceived { reply, now } => match reply {
            Reply::Accepted(report) => apply_crawl_report(&mut state, report, now),
            Reply::Rejected(_) | Reply::Unreachable(_) => Vec::new(),
        },
        Msg::StartPolling { task_id, now } => start_polling(&mut state, &task_id, now),
        Msg::PollTick { generation } => match state.record_tick(generation) {
            Some(task_id) => vec![Effect::CheckTask {
                generation,
                task_id,
            }],
            None => Vec::new(),
        },
        Msg::TaskStatusReceived {
            generation,
            reply,
            now,
        } => {
            if !state.is_current_poll(generation) {
                return (state, Vec::new());
            }
            match reply {
                Reply::Accepted(progress) => apply_task_progress(&mut state, progress, now),
                // Skipped; the next tick retries.
                Reply::Rejected(_) | Reply::Unreachable(_) => Vec::new(),
            }
        }
        Msg::PollCeilingReached { generation, now } => {
            if !state.is_current_poll(generation) {
                return (state, Vec::new());
            }
            let ceiling = state.timings().poll_ceiling.as_secs();
            state.end_poll();
            vec![
                Effect::StopPollTimers,
                show_status(
                    &mut state,
                    StatusKind::Warning,
                    "Stopped monitoring the task".to_string(),
                    Some(format!(
                        "No final status after {ceiling} s; the task may still be running on the server"
                    )),
                    now,
                ),
            ]
        }
        Msg::SubmitJob { job, now } => {
            if !state.begin_submit(job) {
                return (state, Vec::new());
            }
            vec![
                show_status(
                    &mut state,
                    StatusKind::Info,
                    format!("{} task is running...", job.label()),
                    Some(running_hint(job).to_string()),
                    now,
                ),
                Effect::SubmitJob { job },
            ]
        }
        Msg::JobSubmitted { job, reply, now } => {
            state.finish_submit(job);
            apply_submit_reply(&mut state, job, reply, now)
        }
        Msg::Notify {
            title,
            message,
            kind,
        } => vec![notify(&mut state, title, message, kind)],
        Msg::ToastExpired { id } => {
            if state.fade_toast(id) {
                vec![Effect::ScheduleToastRemoval {
                    id,
                    after: state.timings().toast_fade,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::ToastFaded { id } => {
            state.remove_toast(id);
            Vec::new()
        }
        Msg::ToastDismissed { id } => {
            if state.remove_toast(id) {
                vec![Effect::CancelToastTimers { id }]
            } else {
                Vec::new()
            }
        }
        Msg::ShowIpDetails { server } => match non_empty(&server) {
            Some(server) => vec![Effect::FetchIpDetails { server }],
            None => vec![missing_server(&mut state)],
        },
        Msg::IpDetailsReceived { server: _, reply } => match reply {
            Reply::Accepted(details) => {
                state.open_modal(Modal::IpDetails(details));
                Vec::new()
            }
            Reply::Rejected(error) => vec![notify(
                &mut state,
                "Error",
                error.unwrap_or_else(|| "Failed to load details".to_string()),
                ToastKind::Danger,
            )],
            Reply::Unreachable(_) => vec![network_toast(&mut state)],
        },
        Msg::MutateIp { mutation, server } => match non_empty(&server) {
            Some(server) => vec![Effect::MutateIp { mutation, server }],
            None => vec![missing_server(&mut state)],
        },
        Msg::IpMutated {
            mutation,
            server,
            reply,
        } => apply_ip_mutation(&mut state, mutation, &server, reply),
        Msg::LoadSettings => vec![Effect::FetchSettings],
        Msg::SettingsLoaded { reply } => match reply {
            Reply::Accepted(settings) => {
                state.open_modal(Modal::Settings(settings));
                Vec::new()
            }
            Reply::Rejected(error) => vec![notify(
                &mut state,
                "Error",
                format!(
                    "Failed to load settings: {}",
                    error.as_deref().unwrap_or(UNKNOWN_ERROR)
                ),
                ToastKind::Danger,
            )],
            Reply::Unreachable(_) => vec![notify(
                &mut state,
                "Error",
                "Failed to load settings",
                ToastKind::Danger,
            )],
        },
        Msg::SaveSettings { settings } => match settings.validate() {
            Ok(()) => vec![Effect::SaveSettings(settings)],
            Err(err) => vec![notify(
                &mut state,
                "Invalid settings",
                err.to_string(),
                ToastKind::Warning,
            )],
        },
        Msg::SettingsSaved { reply } => match reply {
            Reply::Accepted(()) => {
                if state.is_settings_open() {
                    state.close_modal();
                }
                vec![notify(
                    &mut state,
                    "Success",
                    "Proxy settings saved",
                    ToastKind::Success,
                )]
            }
            Reply::Rejected(error) => vec![notify(
                &mut state,
                "Error",
                format!(
                    "Save failed: {}",
                    error.as_deref().unwrap_or(UNKNOWN_ERROR)
                ),
                ToastKind::Danger,
            )],
            Reply::Unreachable(_) => vec![notify(
                &mut state,
                "Error",
                "Failed to save settings",
                ToastKind::Danger,
            )],
        },
        Msg::ModalClosed => {
            state.close_modal();
            Vec::new()
        }
        Msg::ReloadDue => vec![Effect::Reload],
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn show_status(
    state: &mut AppState,
    status: StatusKind,
    message: String,
    details: Option<String>,
    now: DateTime<Utc>,
) -> Effect {
    let record = StatusRecord::new(status, message, details, now);
    state.set_banner(record.clone());
    Effect::PersistStatus(record)
}

fn notify(
    state: &mut AppState,
    title: impl Into<String>,
    message: impl Into<String>,
    kind: ToastKind,
) -> Effect {
    let id = state.push_toast(title, message, kind);
    Effect::ScheduleToastExpiry {
        id,
        after: state.timings().toast_lifetime,
    }
}

fn network_toast(state: &mut AppState) -> Effect {
    notify(state, "Error", NETWORK_FAILURE, ToastKind::Danger)
}

fn missing_server(state: &mut AppState) -> Effect {
    notify(
        state,
        "Error",
        "A server address is required",
        ToastKind::Warning,
    )
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn schedule_reload(state: &mut AppState, after: std::time::Duration) -> Effect {
    state.set_reload_pending();
    Effect::ScheduleReload { after }
}

/// Arms both poll timers for a fresh generation; an earlier poll becomes stale.
fn start_polling(state: &mut AppState, task_id: &str, now: DateTime<Utc>) -> Vec<Effect> {
    let Some(task_id) = non_empty(task_id) else {
        return Vec::new();
    };
    let timings = *state.timings();
    let generation: PollGeneration = state.begin_poll(task_id, now);
    vec![
        Effect::StartPollTimer {
            generation,
            every: timings.poll_interval,
        },
        Effect::StartPollCeiling {
            generation,
            after: timings.poll_ceiling,
        },
    ]
}

fn apply_task_progress(
    state: &mut AppState,
    progress: TaskProgress,
    now: DateTime<Utc>,
) -> Vec<Effect> {
    let task_id = state
        .active_poll()
        .map(|poll| poll.task_id.clone())
        .unwrap_or_default();
    let reload_after = state.timings().job_reload_delay;

    match progress.status {
        TaskStatusCode::Success => {
            state.end_poll();
            vec![
                Effect::StopPollTimers,
                show_status(
                    state,
                    StatusKind::Success,
                    "Task completed".to_string(),
                    Some(format!(
                        "Task {task_id} finished; reloading in {} s",
                        reload_after.as_secs()
                    )),
                    now,
                ),
                schedule_reload(state, reload_after),
            ]
        }
        TaskStatusCode::Failure => {
            state.end_poll();
            vec![
                Effect::StopPollTimers,
                show_status(
                    state,
                    StatusKind::Error,
                    "Task failed".to_string(),
                    Some(
                        progress
                            .error
                            .unwrap_or_else(|| format!("Task {task_id} reported a failure")),
                    ),
                    now,
                ),
            ]
        }
        TaskStatusCode::Pending => vec![show_status(
            state,
            StatusKind::Info,
            "Task queued, waiting to start".to_string(),
            Some(format!("Task {task_id}")),
            now,
        )],
        TaskStatusCode::Started => vec![show_status(
            state,
            StatusKind::Info,
            "Task is running".to_string(),
            Some(format!("Task {task_id}")),
            now,
        )],
        TaskStatusCode::Other(code) => vec![show_status(
            state,
            StatusKind::Warning,
            format!("Unrecognized task status: {code}"),
            Some(format!("Task {task_id}; still monitoring")),
            now,
        )],
    }
}

fn apply_crawl_report(state: &mut AppState, report: CrawlReport, now: DateTime<Utc>) -> Vec<Effect> {
    let CrawlReport {
        state: crawl_state,
        message,
        details,
        task_id,
    } = report;

    match crawl_state {
        CrawlState::Running => {
            let mut effects = vec![show_status(state, StatusKind::Info, message, details, now)];
            match task_id.as_deref().and_then(non_empty) {
                Some(task_id) => {
                    let already_tracked = state
                        .active_poll()
                        .is_some_and(|poll| poll.task_id == task_id);
                    if !already_tracked {
                        effects.extend(start_polling(state, &task_id, now));
                    }
                }
                None if state.active_poll().is_none() => {
                    effects.push(Effect::ScheduleCrawlStatusRefresh {
                        after: state.timings().crawl_status_refresh,
                    });
                }
                None => {}
            }
            effects
        }
        CrawlState::Completed => vec![show_status(state, StatusKind::Success, message, details, now)],
        CrawlState::Unknown => vec![show_status(state, StatusKind::Warning, message, details, now)],
        CrawlState::Other(_) => Vec::new(),
    }
}

fn apply_submit_reply(
    state: &mut AppState,
    job: JobKind,
    reply: Reply<SubmitAccepted>,
    now: DateTime<Utc>,
) -> Vec<Effect> {
    match reply {
        Reply::Accepted(accepted) => {
            let mut effects = vec![notify(
                state,
                "Success",
                format!("{} task started", job.label()),
                ToastKind::Success,
            )];
            effects.push(show_status(
                state,
                StatusKind::Success,
                format!("{} task started successfully", job.label()),
                Some(accepted.message.unwrap_or_else(|| started_hint(job).to_string())),
                now,
            ));
            match accepted.task_id.as_deref().and_then(non_empty) {
                Some(task_id) => effects.extend(start_polling(state, &task_id, now)),
                None => {
                    let after = state.timings().job_reload_delay;
                    effects.push(schedule_reload(state, after));
                }
            }
            effects
        }
        Reply::Rejected(error) => vec![
            notify(
                state,
                "Error",
                format!(
                    "{} request failed: {}",
                    job.label(),
                    error.as_deref().unwrap_or(UNKNOWN_ERROR)
                ),
                ToastKind::Danger,
            ),
            show_status(
                state,
                StatusKind::Error,
                format!("{} request failed", job.label()),
                Some(error.unwrap_or_else(|| {
                    format!("Starting the {} task failed, please retry later", job.label())
                })),
                now,
            ),
        ],
        Reply::Unreachable(detail) => vec![
            network_toast(state),
            show_status(
                state,
                StatusKind::Error,
                "Network request failed".to_string(),
                Some(if detail.trim().is_empty() {
                    "Could not reach the server, check the connection and retry".to_string()
                } else {
                    detail
                }),
                now,
            ),
        ],
    }
}

fn apply_ip_mutation(
    state: &mut AppState,
    mutation: IpMutation,
    server: &str,
    reply: Reply<()>,
) -> Vec<Effect> {
    match reply {
        Reply::Accepted(()) => {
            let after = state.timings().action_reload_delay;
            vec![
                notify(
                    state,
                    "Success",
                    format!("IP {server} {}", mutation.past_tense()),
                    ToastKind::Success,
                ),
                schedule_reload(state, after),
            ]
        }
        Reply::Rejected(error) => {
            let fallback = match mutation {
                IpMutation::Update => "Update failed",
                IpMutation::Delete => "Delete failed",
            };
            vec![notify(
                state,
                "Error",
                error.unwrap_or_else(|| fallback.to_string()),
                ToastKind::Danger,
            )]
        }
        Reply::Unreachable(_) => vec![network_toast(state)],
    }
}

fn running_hint(job: JobKind) -> &'static str {
    match job {
        JobKind::Crawl => "Please wait, the system is collecting new proxy IPs",
        JobKind::Score => "Please wait, the system is scoring proxy IP quality",
    }
}

fn started_hint(job: JobKind) -> &'static str {
    match job {
        JobKind::Crawl => "New proxy IPs are being collected in the background",
        JobKind::Score => "Proxy IP quality is being scored in the background",
    }
}
