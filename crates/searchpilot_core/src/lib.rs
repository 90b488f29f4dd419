//! SearchPilot core: pure job-control state machine and view-model helpers.
mod effect;
mod job;
mod msg;
mod profiles;
mod progress;
mod queries;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, Preferences, StartParams};
pub use job::{Controls, JobRunState, PollerState, DEFAULT_DELAY_SECS};
pub use msg::Msg;
pub use profiles::{
    Browser, CatalogStatus, LevelCache, Level, Profile, ProfileCatalog, Selection,
    LOOKING_FOR_PROFILES,
};
pub use progress::{
    bar_percent, BoardSection, Channel, EntityProgress, ProgressBoard, ProgressRow,
    ProgressSnapshot,
};
pub use queries::{parse_queries, render_queries, MAX_GENERATE_COUNT};
pub use state::{AppState, Notice, Severity, START_ACCEPTED_FALLBACK, START_FAILED_FALLBACK};
pub use update::update;
pub use view_model::{AppViewModel, ProfileRowView};
