//! SearchPilot engine: HTTP client for the job executor, status poller and
//! effect execution.
mod client;
mod engine;
mod poller;
mod sink;
mod types;
mod wire;

pub use client::{
    fetch_catalog, ClientSettings, ControlApi, ReqwestControlApi, DEFAULT_BASE_URL,
};
pub use engine::{ApiRequest, EngineCommand, EngineError, EngineHandle};
pub use poller::poll_status;
pub use sink::EventSink;
pub use types::{ApiError, EngineEvent, FailureKind, Generation, JobCommand};
pub use wire::{
    CatalogDto, GenerateRequest, GenerateResponse, HealthDto, ProfileDto, ProgressDto,
    QueryListBody, StartRequest, StatusDto,
};
