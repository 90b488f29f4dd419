use pilot_logging::{pilot_debug, pilot_info};

use crate::queries::clamp_generate_count;
use crate::state::Notice;
use crate::{
    AppState, Effect, JobRunState, Level, Msg, START_ACCEPTED_FALLBACK, START_FAILED_FALLBACK,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Opened => {
            let mut effects = vec![Effect::CheckHealth, Effect::LoadQueries];
            // One attach poll tells us whether the server is already mid-run.
            if let Some(generation) = state.activate_poller() {
                effects.push(Effect::StartPolling { generation });
            }
            effects
        }
        Msg::RestorePreferences(prefs) => {
            state.switch_browser(prefs.browser);
            if is_valid_delay(prefs.delay_secs) {
                state.set_delay(prefs.delay_secs);
            }
            state.set_mobile_enabled(prefs.mobile_enabled);
            Vec::new()
        }

        Msg::QueriesEdited(raw) => {
            state.set_queries_from_text(&raw);
            Vec::new()
        }
        Msg::QueryAppended(raw) => {
            state.append_query(&raw);
            Vec::new()
        }
        Msg::LoadQueriesClicked => vec![Effect::LoadQueries],
        Msg::QueriesLoaded(queries) => {
            state.replace_queries(&queries);
            Vec::new()
        }
        Msg::QueriesLoadFailed(message) => {
            state.notify(Notice::error(format!("Failed to load queries: {message}")));
            Vec::new()
        }
        Msg::SaveQueriesClicked => vec![Effect::SaveQueries {
            queries: state.queries().to_vec(),
        }],
        Msg::QueriesSaved { message } => {
            state.notify(Notice::info(message));
            Vec::new()
        }
        Msg::QueriesSaveFailed(message) => {
            state.notify(Notice::error(format!("Failed to save queries: {message}")));
            Vec::new()
        }
        Msg::GenerateClicked {
            prompt,
            count,
            save,
        } => vec![Effect::GenerateQueries {
            prompt: prompt.trim().to_owned(),
            count: clamp_generate_count(count),
            save,
        }],
        Msg::QueriesGenerated { queries, provider } => {
            state.replace_queries(&queries);
            let count = state.queries().len();
            state.notify(Notice::info(format!(
                "Generated {count} queries via {provider}"
            )));
            Vec::new()
        }
        Msg::GenerateFailed(message) => {
            state.notify(Notice::error(format!("Query generation failed: {message}")));
            Vec::new()
        }

        Msg::BrowserSelected(browser) => {
            state.switch_browser(browser);
            vec![Effect::PersistPreferences(state.preferences())]
        }
        Msg::ProfilePickerOpened => {
            let request = state.begin_catalog_fetch();
            vec![Effect::FetchCatalog {
                browser: state.browser(),
                request,
            }]
        }
        Msg::CatalogFetched {
            browser,
            request,
            profiles,
            levels,
        } => {
            if state.catalog().is_current(browser, request) {
                state.commit_catalog(profiles, levels);
            } else {
                pilot_debug!(
                    "Discarding {} catalog from fetch #{}; current browser is {}",
                    browser,
                    request,
                    state.browser()
                );
            }
            Vec::new()
        }
        Msg::CatalogFetchFailed {
            browser,
            request,
            message,
        } => {
            if state.catalog().is_current(browser, request) {
                state.abort_catalog_fetch();
                state.notify(Notice::error(format!(
                    "Failed to load {browser} profiles: {message}"
                )));
            } else {
                pilot_debug!("Ignoring failure of stale {} catalog fetch #{}", browser, request);
            }
            Vec::new()
        }
        Msg::ProfileToggled(name) => {
            if state.toggle_profile(&name).is_none() {
                pilot_debug!("Ignoring toggle for unknown profile {:?}", name);
            }
            Vec::new()
        }
        Msg::SelectAllClicked => {
            state.select_all();
            Vec::new()
        }
        Msg::ClearAllClicked => {
            state.clear_selection();
            Vec::new()
        }
        Msg::SelectionApplied => {
            let count = state.apply_selection();
            let text = if count == 0 {
                "No profiles selected; the default profile will be used".to_string()
            } else {
                format!("Using {count} profile(s)")
            };
            state.notify(Notice::info(text));
            Vec::new()
        }
        Msg::LevelToggled(profile) => {
            let level = state.levels().level(&profile).toggled();
            request_level(&mut state, profile, level)
        }
        Msg::LevelSetRequested { profile, level } => request_level(&mut state, profile, level),
        Msg::LevelSetConfirmed {
            profile,
            level,
            seq,
        } => {
            if !state.confirm_level(&profile, level, seq) {
                pilot_debug!(
                    "Stale level confirmation for {} (seq {}) ignored",
                    profile,
                    seq
                );
            }
            Vec::new()
        }
        Msg::LevelSetFailed {
            profile,
            seq,
            message,
        } => {
            state.reject_level(&profile, seq);
            state.notify(Notice::error(format!(
                "Failed to set level for {profile}: {message}"
            )));
            Vec::new()
        }

        Msg::DelayChanged(delay_secs) => {
            if is_valid_delay(delay_secs) {
                state.set_delay(delay_secs);
                vec![Effect::PersistPreferences(state.preferences())]
            } else {
                state.notify(Notice::error(
                    "Delay must be a non-negative number of seconds",
                ));
                Vec::new()
            }
        }
        Msg::MobileToggled(enabled) => {
            state.set_mobile_enabled(enabled);
            vec![Effect::PersistPreferences(state.preferences())]
        }

        Msg::StartClicked => {
            if state.job() != JobRunState::Idle {
                return (state, Vec::new());
            }
            if state.queries().is_empty() {
                state.notify(Notice::error("Add at least one query before starting"));
                return (state, Vec::new());
            }
            state.set_job(JobRunState::Starting);
            state.set_status_message("Starting automation...");
            vec![Effect::StartJob(state.start_params())]
        }
        Msg::StartAccepted { message } => {
            let message = if message.trim().is_empty() {
                START_ACCEPTED_FALLBACK.to_string()
            } else {
                message
            };
            pilot_info!("Start accepted: {}", message);
            state.set_status_message(message);
            if !matches!(state.job(), JobRunState::Idle | JobRunState::Starting) {
                return (state, Vec::new());
            }
            state.set_job(JobRunState::Running);
            // Polls issued before the run existed must not judge it.
            let mut effects = Vec::new();
            if let Some(generation) = state.deactivate_poller() {
                effects.push(Effect::StopPolling { generation });
            }
            if let Some(generation) = state.activate_poller() {
                effects.push(Effect::StartPolling { generation });
            }
            effects
        }
        Msg::StartRejected { message } => {
            let text = message
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| START_FAILED_FALLBACK.to_string());
            if state.job() == JobRunState::Starting {
                state.set_job(JobRunState::Idle);
                state.set_status_message(text.clone());
            }
            state.notify(Notice::error(text));
            Vec::new()
        }
        Msg::PauseClicked => command_if_active(&state, Effect::PauseJob),
        Msg::ResumeClicked => command_if_active(&state, Effect::ResumeJob),
        Msg::StopClicked => match state.job() {
            JobRunState::Idle => Vec::new(),
            // The server may not own the run yet; only its answers move the state.
            JobRunState::Starting => vec![Effect::StopJob],
            JobRunState::Running | JobRunState::Stopping => {
                state.set_job(JobRunState::Stopping);
                state.set_status_message("Stopping automation...");
                vec![Effect::StopJob]
            }
        },

        Msg::StatusPolled {
            generation,
            snapshot,
        } => {
            let poller = state.poller();
            if !poller.accepts(generation) {
                pilot_debug!(
                    "Discarding poll from generation {} (current {}, active {})",
                    generation,
                    poller.generation(),
                    poller.is_active()
                );
                return (state, Vec::new());
            }
            let running = snapshot.is_running;
            state.apply_snapshot(snapshot);
            if running {
                if matches!(state.job(), JobRunState::Idle | JobRunState::Starting) {
                    state.set_job(JobRunState::Running);
                }
                Vec::new()
            } else {
                state.set_job(JobRunState::Idle);
                state
                    .deactivate_poller()
                    .map(|generation| Effect::StopPolling { generation })
                    .into_iter()
                    .collect()
            }
        }
        Msg::HealthChecked {
            mobile_search_count,
        } => {
            state.set_mobile_search_count(mobile_search_count);
            Vec::new()
        }
    };

    (state, effects)
}

fn request_level(state: &mut AppState, profile: String, level: Level) -> Vec<Effect> {
    if profile.trim().is_empty() {
        return Vec::new();
    }
    let seq = state.request_level(&profile, level);
    vec![Effect::SetLevel {
        profile,
        level,
        seq,
    }]
}

fn command_if_active(state: &AppState, effect: Effect) -> Vec<Effect> {
    if state.job().is_active() {
        vec![effect]
    } else {
        Vec::new()
    }
}

fn is_valid_delay(delay_secs: f64) -> bool {
    delay_secs.is_finite() && delay_secs >= 0.0
}
