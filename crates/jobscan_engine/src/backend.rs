use std::time::Duration;

use jobscan_core::{JobRequest, JobStatus, StartReply};
use jobscan_logging::{jobscan_debug, jobscan_trace};
use url::Url;

use crate::decode::{decode_start_reply, decode_status};
use crate::{BackendError, FailureKind};

const HEALTH_PATH: &str = "nice-health";
const START_PATH: &str = "emails/latest";
const STATUS_PATH: &str = "emails/status";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl BackendSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP contract of the job backend.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// `Ok` when the backend answered the health check with a 2xx status.
    async fn probe_health(&self) -> Result<(), BackendError>;

    async fn start_job(&self, request: &JobRequest) -> Result<StartReply, BackendError>;

    async fn job_status(&self, user_email: &str) -> Result<JobStatus, BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: &BackendSettings) -> Result<Self, BackendError> {
        let mut base_url = Url::parse(&settings.base_url)
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        // Keep any path prefix when joining endpoint paths.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, BackendError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|err| BackendError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// GET `url` and return the body of a 2xx response.
    async fn get_body(&self, url: Url) -> Result<Vec<u8>, BackendError> {
        jobscan_trace!("GET {}", url.path());
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        jobscan_trace!("Received {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn probe_health(&self) -> Result<(), BackendError> {
        let url = self.endpoint(HEALTH_PATH, &[])?;
        self.get_body(url).await.map(|_| ())
    }

    async fn start_job(&self, request: &JobRequest) -> Result<StartReply, BackendError> {
        let limit = request.limit().to_string();
        let url = self.endpoint(
            START_PATH,
            &[("user_email", request.user_email()), ("limit", &limit)],
        )?;
        let body = self.get_body(url).await?;
        let reply = decode_start_reply(&body)?;
        jobscan_debug!("Start reply decoded as {:?}", reply_kind(&reply));
        Ok(reply)
    }

    async fn job_status(&self, user_email: &str) -> Result<JobStatus, BackendError> {
        let url = self.endpoint(STATUS_PATH, &[("user_email", user_email)])?;
        let body = self.get_body(url).await?;
        decode_status(&body)
    }
}

fn reply_kind(reply: &StartReply) -> &'static str {
    match reply {
        StartReply::AuthRequired(_) => "auth_required",
        StartReply::Status(JobStatus::Started) => "started",
        StartReply::Status(JobStatus::Processing) => "processing",
        StartReply::Status(JobStatus::Done(_)) => "done",
        StartReply::Status(JobStatus::Error) => "error",
    }
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
