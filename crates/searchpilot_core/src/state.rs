use std::collections::BTreeMap;

use crate::profiles::{LevelCache, ProfileCatalog, Selection};
use crate::queries::normalize;
use crate::view_model::{AppViewModel, ProfileRowView};
use crate::{
    Browser, Controls, JobRunState, Level, PollerState, Preferences, Profile, ProgressBoard,
    ProgressSnapshot, StartParams, LOOKING_FOR_PROFILES,
};

/// Shown when a start is refused without a server-provided reason.
pub const START_FAILED_FALLBACK: &str = "Failed to start automation";
pub const START_ACCEPTED_FALLBACK: &str = "Automation started";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// One-shot message for the user (confirmation or recoverable error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    queries: Vec<String>,
    catalog: ProfileCatalog,
    levels: LevelCache,
    selection: Selection,
    applied_selection: Vec<Profile>,
    delay_secs: f64,
    mobile_enabled: bool,
    job: JobRunState,
    poller: PollerState,
    status_message: String,
    snapshot: Option<ProgressSnapshot>,
    board: ProgressBoard,
    mobile_search_count: Option<u32>,
    notice: Option<Notice>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            queries: Vec::new(),
            catalog: ProfileCatalog::default(),
            levels: LevelCache::default(),
            selection: Selection::default(),
            applied_selection: Vec::new(),
            delay_secs: crate::DEFAULT_DELAY_SECS,
            mobile_enabled: false,
            job: JobRunState::Idle,
            poller: PollerState::default(),
            status_message: "Ready".to_string(),
            snapshot: None,
            board: ProgressBoard::default(),
            mobile_search_count: None,
            notice: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job(&self) -> JobRunState {
        self.job
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn browser(&self) -> Browser {
        self.catalog.browser()
    }

    pub fn catalog(&self) -> &ProfileCatalog {
        &self.catalog
    }

    pub fn levels(&self) -> &LevelCache {
        &self.levels
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn applied_selection(&self) -> &[Profile] {
        &self.applied_selection
    }

    pub fn poller(&self) -> PollerState {
        self.poller
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            browser: self.browser(),
            delay_secs: self.delay_secs,
            mobile_enabled: self.mobile_enabled,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let profiles = self
            .catalog
            .profiles()
            .iter()
            .map(|profile| ProfileRowView {
                name: profile.name.clone(),
                level: self.levels.level(&profile.name),
                pending_level: self.levels.pending(&profile.name),
                selected: self.selection.contains(&profile.name),
            })
            .collect();
        let snapshot = self.snapshot.as_ref();

        AppViewModel {
            job: self.job,
            controls: Controls::for_state(self.job),
            status_message: self.status_message.clone(),
            current_search: snapshot
                .map(|s| s.current_search.clone())
                .unwrap_or_default(),
            current_profile: snapshot.and_then(|s| s.current_profile.clone()),
            progress_percent: snapshot.map_or(0.0, |s| s.progress_percent.clamp(0.0, 100.0)),
            completed: snapshot.and_then(|s| s.completed),
            total: snapshot.and_then(|s| s.total),
            is_paused: snapshot.is_some_and(|s| s.is_paused),
            queries: self.queries.clone(),
            browser: self.browser(),
            catalog_status: self.catalog.status(),
            catalog_text: self.catalog_text(),
            profiles,
            selected: names(self.selection.entries()),
            applied: names(&self.applied_selection),
            delay_secs: self.delay_secs,
            mobile_enabled: self.mobile_enabled,
            mobile_search_count: self.mobile_search_count,
            board: self.board.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Hands the pending notice to the caller; each notice is shown once.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    fn catalog_text(&self) -> String {
        use crate::CatalogStatus;
        match self.catalog.status() {
            CatalogStatus::Stale | CatalogStatus::Loading => LOOKING_FOR_PROFILES.to_string(),
            CatalogStatus::Ready if self.catalog.profiles().is_empty() => {
                format!("No {} profiles found", self.browser())
            }
            CatalogStatus::Ready => format!(
                "{} profile(s), {} selected",
                self.catalog.profiles().len(),
                self.selection.len()
            ),
        }
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.dirty = true;
    }

    // Queries

    pub(crate) fn replace_queries(&mut self, queries: &[String]) {
        self.queries = normalize(queries);
        self.dirty = true;
    }

    pub(crate) fn set_queries_from_text(&mut self, raw: &str) {
        self.queries = crate::parse_queries(raw);
        self.dirty = true;
    }

    pub(crate) fn append_query(&mut self, raw: &str) -> bool {
        let added = crate::parse_queries(raw);
        if added.is_empty() {
            return false;
        }
        self.queries.extend(added);
        self.dirty = true;
        true
    }

    // Catalog and selection

    pub(crate) fn switch_browser(&mut self, browser: Browser) {
        self.catalog.reset(browser);
        self.selection.clear();
        self.applied_selection.clear();
        self.dirty = true;
    }

    pub(crate) fn begin_catalog_fetch(&mut self) -> u64 {
        self.dirty = true;
        self.catalog.begin_loading()
    }

    pub(crate) fn commit_catalog(&mut self, profiles: Vec<Profile>, levels: BTreeMap<String, Level>) {
        self.catalog.commit(profiles);
        self.levels.replace_confirmed(levels);
        self.dirty = true;
    }

    pub(crate) fn abort_catalog_fetch(&mut self) {
        self.catalog.abort_loading();
        self.dirty = true;
    }

    pub(crate) fn toggle_profile(&mut self, name: &str) -> Option<bool> {
        let profile = self.catalog.find(name)?.clone();
        let selected = self.selection.toggle(&profile);
        self.dirty = true;
        Some(selected)
    }

    pub(crate) fn select_all(&mut self) {
        let profiles = self.catalog.profiles().to_vec();
        self.selection.replace_with(&profiles);
        self.dirty = true;
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selection.clear();
        self.dirty = true;
    }

    pub(crate) fn apply_selection(&mut self) -> usize {
        self.applied_selection = self.selection.entries().to_vec();
        self.dirty = true;
        self.applied_selection.len()
    }

    pub(crate) fn request_level(&mut self, name: &str, level: Level) -> u64 {
        self.dirty = true;
        self.levels.request(name, level)
    }

    pub(crate) fn confirm_level(&mut self, name: &str, level: Level, seq: u64) -> bool {
        self.dirty = true;
        self.levels.confirm(name, level, seq)
    }

    pub(crate) fn reject_level(&mut self, name: &str, seq: u64) {
        self.levels.reject(name, seq);
        self.dirty = true;
    }

    // Run settings

    pub(crate) fn set_delay(&mut self, delay_secs: f64) {
        self.delay_secs = delay_secs;
        self.dirty = true;
    }

    pub(crate) fn set_mobile_enabled(&mut self, enabled: bool) {
        self.mobile_enabled = enabled;
        self.dirty = true;
    }

    pub(crate) fn set_mobile_search_count(&mut self, count: Option<u32>) {
        self.mobile_search_count = count;
        self.dirty = true;
    }

    // Job control

    pub(crate) fn start_params(&self) -> StartParams {
        StartParams {
            queries: self.queries.clone(),
            delay_secs: self.delay_secs,
            browser: self.browser(),
            selected_profiles: self.applied_selection.clone(),
            use_default_if_no_profile: self.applied_selection.is_empty(),
            mobile_enabled: self.mobile_enabled,
        }
    }

    pub(crate) fn set_job(&mut self, job: JobRunState) {
        if self.job != job {
            self.job = job;
            self.dirty = true;
        }
    }

    pub(crate) fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.dirty = true;
    }

    pub(crate) fn activate_poller(&mut self) -> Option<u64> {
        self.poller.activate()
    }

    pub(crate) fn deactivate_poller(&mut self) -> Option<u64> {
        self.poller.deactivate()
    }

    /// Replaces the snapshot and rebuilds the board. Identical snapshots do not
    /// mark the state dirty.
    pub(crate) fn apply_snapshot(&mut self, snapshot: ProgressSnapshot) {
        if self.snapshot.as_ref() == Some(&snapshot) {
            return;
        }
        self.board = ProgressBoard::from_snapshot(&snapshot);
        if !snapshot.status_message.is_empty() {
            self.status_message = snapshot.status_message.clone();
        }
        self.snapshot = Some(snapshot);
        self.dirty = true;
    }
}

fn names(profiles: &[Profile]) -> Vec<String> {
    profiles.iter().map(|profile| profile.name.clone()).collect()
}
