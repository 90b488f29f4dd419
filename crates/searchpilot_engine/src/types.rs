use std::fmt;

use thiserror::Error;

use crate::wire::{CatalogDto, GenerateResponse, HealthDto, StatusDto};

/// Poller activation id, assigned by the caller.
pub type Generation = u64;

/// Results delivered back to the caller. Poll misses are never reported.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    QueriesLoaded(Result<Vec<String>, ApiError>),
    QueriesSaved(Result<String, ApiError>),
    QueriesGenerated(Result<GenerateResponse, ApiError>),
    CatalogFetched {
        browser: String,
        request: u64,
        result: Result<CatalogDto, ApiError>,
    },
    LevelSet {
        profile: String,
        level: u8,
        seq: u64,
        result: Result<(), ApiError>,
    },
    StartCompleted(Result<String, ApiError>),
    CommandSent {
        command: JobCommand,
        result: Result<(), ApiError>,
    },
    StatusPolled {
        generation: Generation,
        status: StatusDto,
    },
    HealthChecked(Result<HealthDto, ApiError>),
}

/// Fire-and-forget run controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobCommand {
    Pause,
    Resume,
    Stop,
}

impl JobCommand {
    pub(crate) fn path(self) -> &'static str {
        match self {
            JobCommand::Pause => "api/pause",
            JobCommand::Resume => "api/resume",
            JobCommand::Stop => "api/stop",
        }
    }
}

impl fmt::Display for JobCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobCommand::Pause => write!(f, "pause"),
            JobCommand::Resume => write!(f, "resume"),
            JobCommand::Stop => write!(f, "stop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
    /// `error` field of a rejected response body, when the server sent one.
    pub server_error: Option<String>,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            server_error: None,
        }
    }

    pub(crate) fn rejected(status: u16, message: impl Into<String>, server_error: Option<String>) -> Self {
        Self {
            kind: FailureKind::HttpStatus(status),
            message: message.into(),
            server_error,
        }
    }

    /// True for failures that never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        !matches!(self.kind, FailureKind::HttpStatus(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Network,
    Timeout,
    /// Response body was not the expected JSON.
    Decode,
    HttpStatus(u16),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
        }
    }
}
