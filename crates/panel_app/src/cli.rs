//! Command-line surface.

use std::future::Future;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use panel_core::{IpMutation, JobKind, Modal, Msg, ProxySettings, StatusKind, ToastKind};
use panel_logging::{panel_warn, LogDestination};

use crate::config::{PanelConfig, DEFAULT_CONFIG_FILENAME};
use crate::platform::{PanelRuntime, Renderer};

#[derive(Debug, Parser)]
#[command(
    name = "proxy-panel",
    version,
    about = "Drive the proxy pool admin panel from the terminal"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// RON config file; a missing default file is not an error.
    #[arg(long, global = true, value_name = "FILE", env = "PANEL_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_name = "URL", env = "PANEL_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, global = true, env = "PANEL_CSRF_TOKEN", hide_env_values = true)]
    pub csrf_token: Option<String>,

    /// Raw Cookie header sent with every request.
    #[arg(long, global = true, env = "PANEL_SESSION_COOKIE", hide_env_values = true)]
    pub session_cookie: Option<String>,

    #[arg(long, global = true, value_name = "DIR", env = "PANEL_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Log destination: terminal, file, both or off.
    #[arg(long, global = true, default_value = "terminal")]
    pub log: LogDestination,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalArgs {
    pub fn config_path(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILENAME), false),
        }
    }

    /// Command-line values win over the config file.
    pub fn apply(&self, config: &mut PanelConfig) {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(token) = &self.csrf_token {
            config.csrf_token = Some(token.clone());
        }
        if let Some(cookie) = &self.session_cookie {
            config.session_cookie = Some(cookie.clone());
        }
        if let Some(dir) = &self.state_dir {
            config.state_dir = dir.clone();
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the status banner and the crawler state.
    Status,
    /// Keep refreshing the panel until interrupted.
    Watch,
    /// Show a status banner and remember it for the next 24 hours.
    Show {
        #[arg(value_enum)]
        status: StatusArg,
        message: String,
        details: Option<String>,
    },
    /// Dismiss the status banner.
    Dismiss,
    /// Start a one-off proxy crawl and follow it.
    Crawl(ConfirmArgs),
    /// Start a one-off proxy scoring run and follow it.
    Score(ConfirmArgs),
    /// Follow an already submitted task.
    Poll { task_id: String },
    /// Show a transient notification.
    Notify {
        title: String,
        message: String,
        #[arg(long, value_enum, default_value_t = ToastKindArg::Info)]
        kind: ToastKindArg,
    },
    #[command(subcommand)]
    Ip(IpCommand),
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Debug, Subcommand)]
pub enum IpCommand {
    Show { server: String },
    /// Re-check one proxy server.
    Update { server: String },
    /// Remove one proxy server from the pool.
    Delete {
        server: String,
        #[command(flatten)]
        confirm: ConfirmArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    Show,
    /// Change some settings, keeping the others as stored on the server.
    Save(SettingsArgs),
}

#[derive(Debug, Clone, Copy, Default, Args)]
pub struct ConfirmArgs {
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct SettingsArgs {
    /// Minutes between automatic crawls.
    #[arg(long)]
    pub crawler_interval: Option<i64>,
    /// Minutes between automatic scoring runs.
    #[arg(long)]
    pub score_interval: Option<i64>,
    #[arg(long)]
    pub min_score: Option<i64>,
    #[arg(long)]
    pub captcha_retries: Option<i64>,
    #[arg(long, value_name = "on|off", value_parser = parse_switch)]
    pub auto_crawler: Option<bool>,
    #[arg(long, value_name = "on|off", value_parser = parse_switch)]
    pub auto_score: Option<bool>,
}

impl SettingsArgs {
    pub fn apply(&self, mut settings: ProxySettings) -> ProxySettings {
        if let Some(value) = self.crawler_interval {
            settings.crawler_interval = value;
        }
        if let Some(value) = self.score_interval {
            settings.score_interval = value;
        }
        if let Some(value) = self.min_score {
            settings.min_score = value;
        }
        if let Some(value) = self.captcha_retries {
            settings.captcha_retries = value;
        }
        if let Some(value) = self.auto_crawler {
            settings.auto_crawler = value;
        }
        if let Some(value) = self.auto_score {
            settings.auto_score = value;
        }
        settings
    }
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected on or off, got '{other}'")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Info,
    Success,
    Warning,
    Error,
}

impl From<StatusArg> for StatusKind {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Info => StatusKind::Info,
            StatusArg::Success => StatusKind::Success,
            StatusArg::Warning => StatusKind::Warning,
            StatusArg::Error => StatusKind::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToastKindArg {
    Success,
    Info,
    Warning,
    Danger,
}

impl From<ToastKindArg> for ToastKind {
    fn from(value: ToastKindArg) -> Self {
        match value {
            ToastKindArg::Success => ToastKind::Success,
            ToastKindArg::Info => ToastKind::Info,
            ToastKindArg::Warning => ToastKind::Warning,
            ToastKindArg::Danger => ToastKind::Danger,
        }
    }
}

impl Command {
    /// Question to ask before running, unless `--yes` was given.
    pub fn confirmation(&self) -> Option<String> {
        match self {
            Command::Crawl(args) if !args.yes => {
                Some("Start a one-off IP crawl now?".to_string())
            }
            Command::Score(args) if !args.yes => {
                Some("Start a one-off IP scoring run now?".to_string())
            }
            Command::Ip(IpCommand::Delete { server, confirm }) if !confirm.yes => {
                Some(format!("Delete IP {server}? This cannot be undone."))
            }
            _ => None,
        }
    }

    /// The message that starts this command. `Status` and `Watch` only restore;
    /// saving settings needs the stored values first.
    pub fn initial_msg(&self, now: DateTime<Utc>) -> Option<Msg> {
        match self {
            Command::Status | Command::Watch => None,
            Command::Show {
                status,
                message,
                details,
            } => Some(Msg::ShowStatus {
                status: (*status).into(),
                message: message.clone(),
                details: details.clone(),
                now,
            }),
            Command::Dismiss => Some(Msg::HideStatus),
            Command::Crawl(_) => Some(Msg::SubmitJob {
                job: JobKind::Crawl,
                now,
            }),
            Command::Score(_) => Some(Msg::SubmitJob {
                job: JobKind::Score,
                now,
            }),
            Command::Poll { task_id } => Some(Msg::StartPolling {
                task_id: task_id.clone(),
                now,
            }),
            Command::Notify {
                title,
                message,
                kind,
            } => Some(Msg::Notify {
                title: title.clone(),
                message: message.clone(),
                kind: (*kind).into(),
            }),
            Command::Ip(IpCommand::Show { server }) => Some(Msg::ShowIpDetails {
                server: server.clone(),
            }),
            Command::Ip(IpCommand::Update { server }) => Some(Msg::MutateIp {
                mutation: IpMutation::Update,
                server: server.clone(),
            }),
            Command::Ip(IpCommand::Delete { server, .. }) => Some(Msg::MutateIp {
                mutation: IpMutation::Delete,
                server: server.clone(),
            }),
            Command::Settings(_) => Some(Msg::LoadSettings),
        }
    }
}

/// Runs `command` on a restored session until it settles; `Watch` runs until
/// `interrupt` completes.
///
/// One-shot commands wait for the restore's crawl status reply first, so a
/// banner they show or hide is the one left behind.
pub async fn execute<R: Renderer>(
    runtime: &mut PanelRuntime<R>,
    command: &Command,
    interrupt: impl Future<Output = ()>,
) {
    if let Command::Watch = command {
        runtime.restore();
        runtime.run_until_interrupted(interrupt).await;
        return;
    }
    runtime.restore_settled().await;
    match command {
        Command::Settings(SettingsCommand::Save(args)) => {
            runtime.dispatch(Msg::LoadSettings);
            runtime
                .run_until(|state| matches!(state.modal(), Some(Modal::Settings(_))))
                .await;
            let current = match runtime.state().modal() {
                Some(Modal::Settings(settings)) => Some(settings.clone()),
                _ => None,
            };
            match current {
                Some(current) => runtime.dispatch(Msg::SaveSettings {
                    settings: args.apply(current),
                }),
                None => panel_warn!("Current settings unavailable; nothing saved"),
            }
            runtime.run_until_idle().await;
        }
        command => {
            if let Some(msg) = command.initial_msg(runtime.now()) {
                runtime.dispatch(msg);
            }
            runtime.run_until_idle().await;
        }
    }
}

/// Asks a yes/no question; anything but `y`/`yes` declines.
pub fn confirm(prompt: &str, mut input: impl BufRead, mut output: impl Write) -> io::Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
