use std::collections::BTreeMap;

use crate::{Browser, Level, Preferences, Profile, ProgressSnapshot};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Console attached to the executor: check health, load queries, poll once.
    Opened,
    /// Restore settings persisted by a previous session.
    RestorePreferences(Preferences),

    /// User replaced the query list with raw editor text.
    QueriesEdited(String),
    /// User appended a single query line.
    QueryAppended(String),
    LoadQueriesClicked,
    QueriesLoaded(Vec<String>),
    QueriesLoadFailed(String),
    SaveQueriesClicked,
    QueriesSaved { message: String },
    QueriesSaveFailed(String),
    GenerateClicked { prompt: String, count: u32, save: bool },
    QueriesGenerated { queries: Vec<String>, provider: String },
    GenerateFailed(String),

    BrowserSelected(Browser),
    /// Profile picker opened; triggers a catalog fetch.
    ProfilePickerOpened,
    CatalogFetched {
        browser: Browser,
        request: u64,
        profiles: Vec<Profile>,
        levels: BTreeMap<String, Level>,
    },
    CatalogFetchFailed {
        browser: Browser,
        request: u64,
        message: String,
    },
    ProfileToggled(String),
    SelectAllClicked,
    ClearAllClicked,
    /// User confirmed the working selection.
    SelectionApplied,
    LevelToggled(String),
    LevelSetRequested { profile: String, level: Level },
    LevelSetConfirmed { profile: String, level: Level, seq: u64 },
    LevelSetFailed { profile: String, seq: u64, message: String },

    DelayChanged(f64),
    MobileToggled(bool),

    StartClicked,
    StartAccepted { message: String },
    /// Start answered with anything but "accepted", or never reached the
    /// server. Carries the server's error text when there was one.
    StartRejected { message: Option<String> },
    PauseClicked,
    ResumeClicked,
    StopClicked,

    /// Poll tick result, tagged with the poller generation that issued it.
    StatusPolled { generation: u64, snapshot: ProgressSnapshot },
    HealthChecked { mobile_search_count: Option<u32> },
}
