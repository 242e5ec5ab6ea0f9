use std::io;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use panel_app::cli::{self, Cli};
use panel_app::{system_clock, PanelConfig, PanelRuntime, TerminalRenderer};
use panel_engine::{ensure_state_dir, ReqwestBackend, StatusStore};
use panel_logging::{panel_info, LogDestination};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config_path, explicit) = cli.global.config_path();
    let mut config = PanelConfig::load(&config_path, explicit)?;
    cli.global.apply(&mut config);
    config.validate()?;

    if matches!(cli.global.log, LogDestination::File | LogDestination::Both) {
        ensure_state_dir(&config.state_dir)
            .with_context(|| format!("cannot use state dir {}", config.state_dir.display()))?;
    }
    panel_logging::initialize(
        cli.global.log,
        cli.global.log_level(),
        &panel_logging::default_log_path(&config.state_dir),
    );
    panel_info!("Using backend {}", config.base_url);

    if let Some(prompt) = cli.command.confirmation() {
        if !cli::confirm(&prompt, io::stdin().lock(), io::stdout())? {
            println!("Cancelled");
            return Ok(());
        }
    }

    let backend =
        ReqwestBackend::new(config.backend_settings()).context("invalid backend settings")?;
    let mut runtime = PanelRuntime::new(
        Arc::new(backend),
        StatusStore::new(&config.state_dir),
        config.timings(),
        system_clock(),
        TerminalRenderer::new(io::stdout()),
    );

    cli::execute(&mut runtime, &cli.command, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await;
    Ok(())
}
