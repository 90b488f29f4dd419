use crate::{Browser, Level, Profile};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LoadQueries,
    SaveQueries { queries: Vec<String> },
    GenerateQueries { prompt: String, count: u32, save: bool },
    /// Profiles for `browser` and the global level map, fetched together.
    FetchCatalog { browser: Browser, request: u64 },
    SetLevel { profile: String, level: Level, seq: u64 },
    StartJob(StartParams),
    PauseJob,
    ResumeJob,
    StopJob,
    StartPolling { generation: u64 },
    StopPolling { generation: u64 },
    CheckHealth,
    PersistPreferences(Preferences),
}

/// Everything the executor needs to begin a run.
#[derive(Debug, Clone, PartialEq)]
pub struct StartParams {
    pub queries: Vec<String>,
    pub delay_secs: f64,
    pub browser: Browser,
    pub selected_profiles: Vec<Profile>,
    pub use_default_if_no_profile: bool,
    pub mobile_enabled: bool,
}

/// Console settings that survive restarts.
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub browser: Browser,
    pub delay_secs: f64,
    pub mobile_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            browser: Browser::default(),
            delay_secs: crate::DEFAULT_DELAY_SECS,
            mobile_enabled: false,
        }
    }
}
