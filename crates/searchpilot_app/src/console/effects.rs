use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};

use pilot_logging::{pilot_debug, pilot_info, pilot_warn};
use searchpilot_core::{
    Browser, Effect, EntityProgress, Level, Msg, Profile, ProgressSnapshot, StartParams,
};
use searchpilot_engine::{
    ApiError, ApiRequest, ClientSettings, EngineCommand, EngineError, EngineEvent, EngineHandle,
    EventSink, GenerateRequest, JobCommand, ProfileDto, ProgressDto, StartRequest, StatusDto,
};

use super::app::ConsoleEvent;
use super::persistence;

/// Carries out effects: network work goes to the engine, preferences go to
/// disk.
pub struct EffectRunner {
    engine: EngineHandle,
    state_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(
        settings: &ClientSettings,
        state_dir: PathBuf,
        events: mpsc::Sender<ConsoleEvent>,
    ) -> Result<Self, EngineError> {
        let sink = Arc::new(MsgSink { events });
        let engine = EngineHandle::new(settings, sink)?;
        Ok(Self { engine, state_dir })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::PersistPreferences(prefs) => {
                    persistence::save_preferences(&self.state_dir, &prefs);
                }
                other => {
                    if let Some(command) = engine_command(other) {
                        self.engine.dispatch(command);
                    }
                }
            }
        }
    }
}

fn engine_command(effect: Effect) -> Option<EngineCommand> {
    let request = match effect {
        Effect::LoadQueries => ApiRequest::LoadQueries,
        Effect::SaveQueries { queries } => ApiRequest::SaveQueries(queries),
        Effect::GenerateQueries {
            prompt,
            count,
            save,
        } => ApiRequest::GenerateQueries(GenerateRequest {
            prompt,
            count,
            save,
        }),
        Effect::FetchCatalog { browser, request } => ApiRequest::FetchCatalog {
            browser: browser.as_str().to_string(),
            request,
        },
        Effect::SetLevel {
            profile,
            level,
            seq,
        } => ApiRequest::SetLevel {
            profile,
            level: level.number(),
            seq,
        },
        Effect::StartJob(params) => ApiRequest::Start(start_request(params)),
        Effect::PauseJob => ApiRequest::Command(JobCommand::Pause),
        Effect::ResumeJob => ApiRequest::Command(JobCommand::Resume),
        Effect::StopJob => ApiRequest::Command(JobCommand::Stop),
        Effect::CheckHealth => ApiRequest::CheckHealth,
        Effect::StartPolling { generation } => {
            return Some(EngineCommand::StartPolling { generation })
        }
        Effect::StopPolling { generation } => {
            return Some(EngineCommand::StopPolling { generation })
        }
        Effect::PersistPreferences(_) => return None,
    };
    Some(EngineCommand::Request(request))
}

fn start_request(params: StartParams) -> StartRequest {
    pilot_info!(
        "StartJob queries={} browser={} profiles={} mobile={}",
        params.queries.len(),
        params.browser,
        params.selected_profiles.len(),
        params.mobile_enabled
    );
    StartRequest {
        fruits: params.queries,
        delay: params.delay_secs,
        browser: params.browser.as_str().to_string(),
        selected_profiles: params
            .selected_profiles
            .into_iter()
            .map(|profile| ProfileDto {
                name: profile.name,
                directory: profile.directory,
                path: profile.path,
            })
            .collect(),
        use_default_if_no_profile: params.use_default_if_no_profile,
        mobile_enabled: params.mobile_enabled,
    }
}

/// Turns engine results into messages on the console's event channel.
struct MsgSink {
    events: mpsc::Sender<ConsoleEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        if let Some(msg) = event_to_msg(event) {
            if self.events.send(ConsoleEvent::Dispatch(msg)).is_err() {
                pilot_debug!("Console is gone; engine result dropped");
            }
        }
    }
}

fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::QueriesLoaded(Ok(queries)) => Msg::QueriesLoaded(queries),
        EngineEvent::QueriesLoaded(Err(err)) => Msg::QueriesLoadFailed(describe(&err)),
        EngineEvent::QueriesSaved(Ok(message)) => Msg::QueriesSaved { message },
        EngineEvent::QueriesSaved(Err(err)) => Msg::QueriesSaveFailed(describe(&err)),
        EngineEvent::QueriesGenerated(Ok(response)) => Msg::QueriesGenerated {
            queries: response.fruits,
            provider: response.provider,
        },
        EngineEvent::QueriesGenerated(Err(err)) => Msg::GenerateFailed(describe(&err)),
        EngineEvent::CatalogFetched {
            browser,
            request,
            result,
        } => {
            let browser = match browser.parse::<Browser>() {
                Ok(browser) => browser,
                Err(err) => {
                    pilot_warn!("Catalog for unexpected browser dropped: {}", err);
                    return None;
                }
            };
            match result {
                Ok(catalog) => Msg::CatalogFetched {
                    browser,
                    request,
                    profiles: catalog.profiles.into_iter().map(profile_from_dto).collect(),
                    levels: levels_from_wire(catalog.levels),
                },
                Err(err) => Msg::CatalogFetchFailed {
                    browser,
                    request,
                    message: describe(&err),
                },
            }
        }
        EngineEvent::LevelSet {
            profile,
            level,
            seq,
            result,
        } => match (result, Level::from_number(level)) {
            (Ok(()), Some(level)) => Msg::LevelSetConfirmed {
                profile,
                level,
                seq,
            },
            (Ok(()), None) => Msg::LevelSetFailed {
                profile,
                seq,
                message: format!("unsupported level {level}"),
            },
            (Err(err), _) => Msg::LevelSetFailed {
                profile,
                seq,
                message: describe(&err),
            },
        },
        EngineEvent::StartCompleted(Ok(message)) => Msg::StartAccepted { message },
        EngineEvent::StartCompleted(Err(err)) => {
            pilot_warn!("Start failed: {}", err);
            Msg::StartRejected {
                message: err.server_error,
            }
        }
        EngineEvent::CommandSent { command, result } => {
            match result {
                Ok(()) => pilot_debug!("{} command delivered", command),
                Err(err) => pilot_debug!("{} command not delivered: {}", command, err),
            }
            return None;
        }
        EngineEvent::StatusPolled { generation, status } => Msg::StatusPolled {
            generation,
            snapshot: snapshot_from_status(status),
        },
        EngineEvent::HealthChecked(Ok(health)) => Msg::HealthChecked {
            mobile_search_count: health.mobile_search_count,
        },
        EngineEvent::HealthChecked(Err(err)) => {
            pilot_warn!("Health check failed: {}", err);
            return None;
        }
    };
    Some(msg)
}

fn describe(err: &ApiError) -> String {
    err.server_error.clone().unwrap_or_else(|| err.to_string())
}

fn profile_from_dto(dto: ProfileDto) -> Profile {
    Profile {
        name: dto.name,
        directory: dto.directory,
        path: dto.path,
    }
}

fn levels_from_wire(levels: BTreeMap<String, u8>) -> BTreeMap<String, Level> {
    levels
        .into_iter()
        .filter_map(|(name, number)| match Level::from_number(number) {
            Some(level) => Some((name, level)),
            None => {
                pilot_warn!("Ignoring level {} for profile {}", number, name);
                None
            }
        })
        .collect()
}

fn snapshot_from_status(status: StatusDto) -> ProgressSnapshot {
    ProgressSnapshot {
        progress_percent: status.progress,
        is_running: status.is_running,
        status_message: status.status,
        current_search: status.current_search,
        current_profile: status.current_profile,
        completed: status.completed,
        total: status.total,
        is_paused: status.is_paused,
        desktop: progress_map(status.profile_progress),
        mobile: progress_map(status.mobile_progress),
    }
}

fn progress_map(entries: BTreeMap<String, ProgressDto>) -> BTreeMap<String, EntityProgress> {
    entries
        .into_iter()
        .map(|(name, progress)| {
            (
                name,
                EntityProgress {
                    done: progress.done,
                    total: progress.total,
                },
            )
        })
        .collect()
}
