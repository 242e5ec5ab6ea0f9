use std::fmt::Display;
use std::io::Write;

use chrono::{Local, TimeZone};
use panel_core::{AppViewModel, BannerView, IpDetails, Modal, ProxySettings, ToastView};
use panel_logging::panel_warn;

/// Presentation surface for view models.
pub trait Renderer {
    fn present(&mut self, view: &AppViewModel);
}

/// Prints the panel as plain text lines, skipping views that render identically.
pub struct TerminalRenderer<W: Write> {
    out: W,
    last: Vec<String>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn present(&mut self, view: &AppViewModel) {
        let lines = render_lines(view, &Local);
        if lines == self.last {
            return;
        }
        let result = lines
            .iter()
            .try_for_each(|line| writeln!(self.out, "{line}"))
            .and_then(|()| writeln!(self.out))
            .and_then(|()| self.out.flush());
        if let Err(err) = result {
            panel_warn!("Failed to write panel output: {}", err);
        }
        self.last = lines;
    }
}

/// Text rendition of a view; timestamps are shown in `tz`.
pub fn render_lines<Tz>(view: &AppViewModel, tz: &Tz) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut lines = Vec::new();

    match &view.banner {
        Some(banner) => lines.extend(banner_lines(banner, tz)),
        None => lines.push("No status".to_string()),
    }

    if let Some(poll) = &view.polling {
        lines.push(format!(
            "Monitoring task {} ({} checks since {})",
            poll.task_id,
            poll.ticks,
            poll.started_at
                .with_timezone(tz)
                .format("%H:%M:%S")
        ));
    }

    for job in &view.submitting {
        lines.push(format!("Submitting {job}..."));
    }

    match &view.modal {
        Some(Modal::IpDetails(details)) => lines.extend(ip_detail_lines(details)),
        Some(Modal::Settings(settings)) => lines.extend(settings_lines(settings)),
        None => {}
    }

    lines.extend(view.toasts.iter().map(toast_line));

    if view.reload_pending {
        lines.push("Reload pending".to_string());
    }
    lines
}

fn banner_lines<Tz>(banner: &BannerView, tz: &Tz) -> Vec<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut lines = vec![format!("[{}] {}", banner.title, banner.message)];
    if let Some(details) = &banner.details {
        lines.push(format!("    {details}"));
    }
    lines.push(format!(
        "    at {}",
        banner.time.with_timezone(tz).format("%Y-%m-%d %H:%M:%S")
    ));
    lines
}

fn ip_detail_lines(details: &IpDetails) -> Vec<String> {
    let or_dash = |value: &str| {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    };
    let metric = |value: Option<f64>, unit: &str| match value {
        Some(value) => format!("{value:.1}{unit}"),
        None => "-".to_string(),
    };
    vec![
        format!("IP {}", details.server),
        format!(
            "    location: {} / {}",
            or_dash(&details.country),
            or_dash(&details.city)
        ),
        format!("    isp: {}", or_dash(&details.isp)),
        format!("    score: {}", metric(details.score, "")),
        format!("    ping: {}", metric(details.ping_ms, " ms")),
        format!("    speed: {}", metric(details.speed_mbps, " Mbps")),
        format!("    updated: {}", or_dash(&details.updated_at)),
    ]
}

fn settings_lines(settings: &ProxySettings) -> Vec<String> {
    let switch = |enabled: bool| if enabled { "on" } else { "off" };
    vec![
        "Proxy settings".to_string(),
        format!("    crawler interval: {} min", settings.crawler_interval),
        format!("    score interval: {} min", settings.score_interval),
        format!("    min score: {}", settings.min_score),
        format!("    captcha retries: {}", settings.captcha_retries),
        format!("    auto crawler: {}", switch(settings.auto_crawler)),
        format!("    auto score: {}", switch(settings.auto_score)),
    ]
}

fn toast_line(toast: &ToastView) -> String {
    let marker = if toast.fading { "~" } else { "*" };
    format!(
        "{marker} ({}) {}: {}",
        toast.kind.as_str(),
        toast.title,
        toast.message
    )
}
