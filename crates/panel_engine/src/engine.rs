use std::sync::Arc;

use panel_logging::panel_debug;
use tokio::sync::mpsc;

use crate::client::Backend;
use crate::{EngineEvent, IpOperation, JobEndpoint, ProxySettingsData};

/// Backend requests the engine can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    SubmitJob(JobEndpoint),
    /// `tag` is echoed back so stale replies can be recognized.
    CheckTask { tag: u64, task_id: String },
    FetchCrawlStatus,
    FetchIpDetails { server: String },
    MutateIp { operation: IpOperation, server: String },
    LoadSettings,
    SaveSettings(ProxySettingsData),
}

/// Runs backend requests as spawned tasks and reports each result as one [`EngineEvent`].
#[derive(Clone)]
pub struct EngineHandle {
    backend: Arc<dyn Backend>,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineHandle {
    pub fn new(backend: Arc<dyn Backend>) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Self { backend, event_tx }, event_rx)
    }

    /// Spawns the request; must be called within a tokio runtime.
    pub fn dispatch(&self, command: EngineCommand) {
        panel_debug!("Dispatching {:?}", command);
        let backend = self.backend.clone();
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let event = handle_command(backend.as_ref(), command).await;
            let _ = event_tx.send(event);
        });
    }
}

async fn handle_command(backend: &dyn Backend, command: EngineCommand) -> EngineEvent {
    match command {
        EngineCommand::SubmitJob(job) => EngineEvent::JobSubmitted {
            job,
            result: backend.submit_job(job).await,
        },
        EngineCommand::CheckTask { tag, task_id } => {
            let result = backend.check_task(&task_id).await;
            EngineEvent::TaskChecked {
                tag,
                task_id,
                result,
            }
        }
        EngineCommand::FetchCrawlStatus => EngineEvent::CrawlStatus {
            result: backend.crawl_status().await,
        },
        EngineCommand::FetchIpDetails { server } => {
            let result = backend.ip_details(&server).await;
            EngineEvent::IpDetails { server, result }
        }
        EngineCommand::MutateIp { operation, server } => {
            let result = backend.mutate_ip(operation, &server).await;
            EngineEvent::IpMutated {
                operation,
                server,
                result,
            }
        }
        EngineCommand::LoadSettings => EngineEvent::SettingsLoaded {
            result: backend.load_settings().await,
        },
        EngineCommand::SaveSettings(settings) => EngineEvent::SettingsSaved {
            result: backend.save_settings(&settings).await,
        },
    }
}
