use std::collections::BTreeMap;
use std::time::Duration;

use pilot_logging::{pilot_debug, pilot_trace};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::wire::{
    CatalogDto, ErrorBody, GenerateRequest, GenerateResponse, HealthDto, LevelsBody, MessageBody,
    ProfileDto, ProfilesBody, QueryListBody, SetLevelBody, StartRequest, StatusDto,
};
use crate::{ApiError, FailureKind, JobCommand};

/// Address of the job executor used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// HTTP surface of the job executor and its persistence layer.
#[async_trait::async_trait]
pub trait ControlApi: Send + Sync {
    async fn load_queries(&self) -> Result<Vec<String>, ApiError>;
    /// Returns the server's confirmation text.
    async fn save_queries(&self, queries: &[String]) -> Result<String, ApiError>;
    async fn generate_queries(&self, request: &GenerateRequest)
        -> Result<GenerateResponse, ApiError>;
    async fn profiles(&self, browser: &str) -> Result<Vec<ProfileDto>, ApiError>;
    async fn levels(&self) -> Result<BTreeMap<String, u8>, ApiError>;
    async fn set_level(&self, profile: &str, level: u8) -> Result<(), ApiError>;
    /// Succeeds only on `202 Accepted`; returns the server's message.
    async fn start(&self, request: &StartRequest) -> Result<String, ApiError>;
    async fn send_command(&self, command: JobCommand) -> Result<(), ApiError>;
    async fn status(&self) -> Result<StatusDto, ApiError>;
    async fn health(&self) -> Result<HealthDto, ApiError>;
}

/// Reads the profile list and the level map concurrently. Either both land or
/// the first error is returned.
pub async fn fetch_catalog(api: &dyn ControlApi, browser: &str) -> Result<CatalogDto, ApiError> {
    let (profiles, levels) =
        futures_util::future::try_join(api.profiles(browser), api.levels()).await?;
    Ok(CatalogDto { profiles, levels })
}

#[derive(Debug, Clone)]
pub struct ReqwestControlApi {
    client: reqwest::Client,
    base: Url,
}

impl ReqwestControlApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        // Joining relative paths only appends when the base ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn get(&self, path: &str) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let url = self.endpoint(path)?;
        pilot_trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_body(response).await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let url = self.endpoint(path)?;
        let payload = serde_json::to_vec(body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        pilot_trace!("POST {} ({} bytes)", url, payload.len());
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        read_body(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (status, body) = self.get(path).await?;
        expect_success(status, &body)?;
        decode(&body)
    }
}

#[async_trait::async_trait]
impl ControlApi for ReqwestControlApi {
    async fn load_queries(&self) -> Result<Vec<String>, ApiError> {
        let body: QueryListBody = self.get_json("api/load").await?;
        Ok(body.fruits)
    }

    async fn save_queries(&self, queries: &[String]) -> Result<String, ApiError> {
        let request = QueryListBody {
            fruits: queries.to_vec(),
        };
        let (status, body) = self.post("api/save", &request).await?;
        expect_success(status, &body)?;
        let body: MessageBody = decode(&body)?;
        Ok(body.message)
    }

    async fn generate_queries(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, ApiError> {
        let (status, body) = self.post("api/ai-generate", request).await?;
        expect_success(status, &body)?;
        decode(&body)
    }

    async fn profiles(&self, browser: &str) -> Result<Vec<ProfileDto>, ApiError> {
        // Browser ids are fixed lowercase words; anything else gets no profiles.
        if browser.is_empty() || !browser.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Ok(Vec::new());
        }
        let body: ProfilesBody = self.get_json(&format!("api/profiles/{browser}")).await?;
        Ok(body.profiles)
    }

    async fn levels(&self) -> Result<BTreeMap<String, u8>, ApiError> {
        let body: LevelsBody = self.get_json("api/levels").await?;
        Ok(body.levels)
    }

    async fn set_level(&self, profile: &str, level: u8) -> Result<(), ApiError> {
        let (status, body) = self
            .post("api/levels", &SetLevelBody { profile, level })
            .await?;
        expect_success(status, &body)
    }

    async fn start(&self, request: &StartRequest) -> Result<String, ApiError> {
        let (status, body) = self.post("api/start", request).await?;
        if status != StatusCode::ACCEPTED {
            return Err(rejection(status, &body));
        }
        // The run exists once the server said 202, even if the body is odd.
        let message = decode::<MessageBody>(&body)
            .map(|body| body.message)
            .unwrap_or_default();
        Ok(message)
    }

    async fn send_command(&self, command: JobCommand) -> Result<(), ApiError> {
        let (status, body) = self.post(command.path(), &serde_json::json!({})).await?;
        expect_success(status, &body)
    }

    async fn status(&self) -> Result<StatusDto, ApiError> {
        self.get_json("api/status").await
    }

    async fn health(&self) -> Result<HealthDto, ApiError> {
        self.get_json("api/health").await
    }
}

async fn read_body(response: reqwest::Response) -> Result<(StatusCode, Vec<u8>), ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    pilot_debug!("response {} ({} bytes)", status, body.len());
    Ok((status, body.to_vec()))
}

fn expect_success(status: StatusCode, body: &[u8]) -> Result<(), ApiError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(rejection(status, body))
    }
}

fn rejection(status: StatusCode, body: &[u8]) -> ApiError {
    let server_error = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error)
        .filter(|error| !error.trim().is_empty());
    ApiError::rejected(status.as_u16(), status.to_string(), server_error)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
