//! JSON bodies exchanged with the job executor.
//!
//! Field names follow the executor's API (`fruits` is its name for the query
//! list). Response fields default when missing so a partial body still
//! decodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QueryListBody {
    #[serde(default)]
    pub fruits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub(crate) struct MessageBody {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDto {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub(crate) struct ProfilesBody {
    #[serde(default)]
    pub profiles: Vec<ProfileDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub(crate) struct LevelsBody {
    #[serde(default)]
    pub levels: BTreeMap<String, u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct SetLevelBody<'a> {
    pub profile: &'a str,
    pub level: u8,
}

/// Profile list and level map, fetched together and committed together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogDto {
    pub profiles: Vec<ProfileDto>,
    pub levels: BTreeMap<String, u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub count: u32,
    pub save: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct GenerateResponse {
    #[serde(default)]
    pub fruits: Vec<String>,
    #[serde(default)]
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub fruits: Vec<String>,
    #[serde(serialize_with = "serialize_seconds")]
    pub delay: f64,
    pub browser: String,
    pub selected_profiles: Vec<ProfileDto>,
    pub use_default_if_no_profile: bool,
    pub mobile_enabled: bool,
}

/// Whole seconds go out as JSON integers (`3`, not `3.0`).
fn serialize_seconds<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProgressDto {
    #[serde(default)]
    pub done: u32,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct StatusDto {
    pub progress: f64,
    pub is_running: bool,
    pub status: String,
    pub current_search: String,
    pub current_profile: Option<String>,
    pub completed: Option<u64>,
    pub total: Option<u64>,
    pub is_paused: bool,
    pub profile_progress: BTreeMap<String, ProgressDto>,
    pub mobile_progress: BTreeMap<String, ProgressDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct HealthDto {
    #[serde(default)]
    pub mobile_search_count: Option<u32>,
}
