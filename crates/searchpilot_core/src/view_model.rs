use crate::{Browser, CatalogStatus, Controls, JobRunState, Level, ProgressBoard};

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub job: JobRunState,
    pub controls: Controls,
    pub status_message: String,
    pub current_search: String,
    pub current_profile: Option<String>,
    pub progress_percent: f64,
    pub completed: Option<u64>,
    pub total: Option<u64>,
    pub is_paused: bool,
    pub queries: Vec<String>,
    pub browser: Browser,
    pub catalog_status: CatalogStatus,
    pub catalog_text: String,
    pub profiles: Vec<ProfileRowView>,
    /// Working selection, in pick order.
    pub selected: Vec<String>,
    /// Selection the next start will use.
    pub applied: Vec<String>,
    pub delay_secs: f64,
    pub mobile_enabled: bool,
    pub mobile_search_count: Option<u32>,
    pub board: ProgressBoard,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRowView {
    pub name: String,
    /// Last confirmed level; this is what the badge shows.
    pub level: Level,
    pub pending_level: Option<Level>,
    pub selected: bool,
}
