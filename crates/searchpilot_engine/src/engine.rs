use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use pilot_logging::{pilot_debug, pilot_info, pilot_warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::client::{fetch_catalog, ClientSettings, ControlApi, ReqwestControlApi};
use crate::poller::poll_status;
use crate::wire::{GenerateRequest, StartRequest};
use crate::{ApiError, EngineEvent, EventSink, Generation, JobCommand};

/// One-shot calls to the executor. Each produces exactly one [`EngineEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    LoadQueries,
    SaveQueries(Vec<String>),
    GenerateQueries(GenerateRequest),
    FetchCatalog { browser: String, request: u64 },
    SetLevel { profile: String, level: u8, seq: u64 },
    Start(StartRequest),
    Command(JobCommand),
    CheckHealth,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    Request(ApiRequest),
    /// Starts polling unless this generation is already running. Any other
    /// running generation is cancelled first.
    StartPolling { generation: Generation },
    StopPolling { generation: Generation },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("client setup failed: {0}")]
    Client(#[from] ApiError),
    #[error("runtime setup failed: {0}")]
    Runtime(#[from] io::Error),
}

/// Owns a worker thread with a tokio runtime. Commands are queued through a
/// channel; results go to the [`EventSink`].
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: &ClientSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let api: Arc<dyn ControlApi> = Arc::new(ReqwestControlApi::new(settings)?);
        Ok(Self::with_api(api, settings.poll_interval, sink)?)
    }

    pub fn with_api(
        api: Arc<dyn ControlApi>,
        poll_interval: Duration,
        sink: Arc<dyn EventSink>,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();

        thread::Builder::new()
            .name("searchpilot-engine".to_string())
            .spawn(move || {
                let mut poller: Option<(Generation, CancellationToken)> = None;
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Request(request) => {
                            let api = api.clone();
                            let sink = sink.clone();
                            runtime.spawn(async move {
                                let event = execute(api.as_ref(), request).await;
                                sink.emit(event);
                            });
                        }
                        EngineCommand::StartPolling { generation } => {
                            if poller.as_ref().is_some_and(|(active, _)| *active == generation) {
                                pilot_debug!("Poller generation {} already running", generation);
                                continue;
                            }
                            if let Some((previous, token)) = poller.take() {
                                pilot_debug!("Replacing poller generation {}", previous);
                                token.cancel();
                            }
                            let token = CancellationToken::new();
                            runtime.spawn(poll_status(
                                api.clone(),
                                generation,
                                poll_interval,
                                sink.clone(),
                                token.clone(),
                            ));
                            poller = Some((generation, token));
                        }
                        EngineCommand::StopPolling { generation } => {
                            match poller.take() {
                                Some((active, token)) if active == generation => token.cancel(),
                                other => poller = other,
                            }
                        }
                    }
                }
                if let Some((_, token)) = poller.take() {
                    token.cancel();
                }
                pilot_info!("Engine command channel closed");
            })?;

        Ok(Self { cmd_tx })
    }

    pub fn dispatch(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            pilot_warn!("Engine thread is gone; command dropped");
        }
    }
}

async fn execute(api: &dyn ControlApi, request: ApiRequest) -> EngineEvent {
    match request {
        ApiRequest::LoadQueries => EngineEvent::QueriesLoaded(api.load_queries().await),
        ApiRequest::SaveQueries(queries) => {
            EngineEvent::QueriesSaved(api.save_queries(&queries).await)
        }
        ApiRequest::GenerateQueries(request) => {
            EngineEvent::QueriesGenerated(api.generate_queries(&request).await)
        }
        ApiRequest::FetchCatalog { browser, request } => {
            let result = fetch_catalog(api, &browser).await;
            EngineEvent::CatalogFetched {
                browser,
                request,
                result,
            }
        }
        ApiRequest::SetLevel {
            profile,
            level,
            seq,
        } => {
            let result = api.set_level(&profile, level).await;
            EngineEvent::LevelSet {
                profile,
                level,
                seq,
                result,
            }
        }
        ApiRequest::Start(request) => {
            pilot_info!(
                "Starting run: {} queries, browser {}, {} profile(s)",
                request.fruits.len(),
                request.browser,
                request.selected_profiles.len()
            );
            EngineEvent::StartCompleted(api.start(&request).await)
        }
        ApiRequest::Command(command) => {
            let result = api.send_command(command).await;
            if let Err(err) = &result {
                pilot_warn!("{} command failed: {}", command, err);
            }
            EngineEvent::CommandSent { command, result }
        }
        ApiRequest::CheckHealth => EngineEvent::HealthChecked(api.health().await),
    }
}
