use super::types::*;
use crate::{Error, Result, config::ServiceConfig};
use async_trait::async_trait;
use tracing::debug;

/// One method per remote operation of the KlingAI private API. Components
/// take this trait rather than a concrete HTTP client so tests can script
/// the remote side.
#[async_trait]
pub trait KlingApi: Send + Sync {
    /// `GET /api/upload/issue/token?filename=<f>`
    async fn issue_upload_token(&self, filename: &str) -> Result<TokenResponse>;

    /// `GET <upload-host>/api/upload/resume?upload_token=<t>`. Best-effort;
    /// the caller logs a failure and carries on.
    async fn resume_upload(&self, upload_token: &str) -> Result<()>;

    /// OPTIONS preflight against the fragment endpoint. Best-effort; the
    /// caller logs a failure and carries on.
    async fn probe_fragment(&self, upload_token: &str) -> Result<()>;

    /// `POST <upload-host>/api/upload/fragment?upload_token=<t>&fragment_id=<n>`
    /// with the raw bytes as the body.
    async fn send_fragment(&self, upload_token: &str, fragment_id: u32, bytes: &[u8])
    -> Result<()>;

    /// `POST <upload-host>/api/upload/complete?fragment_count=<n>&upload_token=<t>`
    async fn complete_upload(&self, upload_token: &str, fragment_count: u32) -> Result<()>;

    /// `GET /api/upload/verify/token?token=<t>`
    async fn verify_upload(&self, upload_token: &str) -> Result<VerifyResponse>;

    /// `POST /api/task/submit`
    async fn submit_task(&self, body: &SubmitTaskBody) -> Result<SubmitResponse>;

    /// `GET /api/task/status?taskId=<id>`. A non-success HTTP status is an
    /// authentication failure, not a transport error.
    async fn task_status(&self, task_id: &str) -> Result<StatusResponse>;
}

pub struct HttpKlingApi {
    client: reqwest::Client,
    base_url: String,
    upload_base_url: String,
    cookie: String,
}

impl HttpKlingApi {
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_urls(
            config.deployment.base_url(),
            config.deployment.upload_base_url(),
            &config.cookie,
        )
    }

    /// Explicit URLs, used by tests pointing at a local mock server.
    pub fn with_urls(base_url: &str, upload_base_url: &str, cookie: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            upload_base_url: upload_base_url.trim_end_matches('/').to_string(),
            cookie: cookie.to_string(),
        }
    }
}

#[async_trait]
impl KlingApi for HttpKlingApi {
    async fn issue_upload_token(&self, filename: &str) -> Result<TokenResponse> {
        let url = format!("{}/api/upload/issue/token", self.base_url);
        debug!("Issuing upload token for filename: {}", filename);

        let response = self
            .client
            .get(url)
            .query(&[("filename", filename)])
            .header("cookie", &self.cookie)
            .send()
            .await?;

        Ok(response.json().await?)
    }

    async fn resume_upload(&self, upload_token: &str) -> Result<()> {
        let url = format!("{}/api/upload/resume", self.upload_base_url);

        self.client
            .get(url)
            .query(&[("upload_token", upload_token)])
            .send()
            .await?;

        Ok(())
    }

    async fn probe_fragment(&self, upload_token: &str) -> Result<()> {
        let url = format!("{}/api/upload/fragment", self.upload_base_url);

        self.client
            .request(reqwest::Method::OPTIONS, url)
            .query(&[("upload_token", upload_token), ("fragment_id", "0")])
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-range,content-type")
            .send()
            .await?;

        Ok(())
    }

    async fn send_fragment(
        &self,
        upload_token: &str,
        fragment_id: u32,
        bytes: &[u8],
    ) -> Result<()> {
        let url = format!("{}/api/upload/fragment", self.upload_base_url);
        debug!(
            "Uploading fragment {} ({} bytes)",
            fragment_id,
            bytes.len()
        );

        let fragment_id = fragment_id.to_string();
        let response = self
            .client
            .post(url)
            .query(&[
                ("upload_token", upload_token),
                ("fragment_id", fragment_id.as_str()),
            ])
            .header("content-type", "application/octet-stream")
            .body(bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::upload(format!(
                "fragment endpoint returned HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn complete_upload(&self, upload_token: &str, fragment_count: u32) -> Result<()> {
        let url = format!("{}/api/upload/complete", self.upload_base_url);

        let fragment_count = fragment_count.to_string();
        let response = self
            .client
            .post(url)
            .query(&[
                ("fragment_count", fragment_count.as_str()),
                ("upload_token", upload_token),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::upload(format!(
                "complete endpoint returned HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn verify_upload(&self, upload_token: &str) -> Result<VerifyResponse> {
        let url = format!("{}/api/upload/verify/token", self.base_url);

        let response = self
            .client
            .get(url)
            .query(&[("token", upload_token)])
            .header("cookie", &self.cookie)
            .send()
            .await?;

        Ok(response.json().await?)
    }

    async fn submit_task(&self, body: &SubmitTaskBody) -> Result<SubmitResponse> {
        let url = format!("{}/api/task/submit", self.base_url);
        debug!("Submitting task of type: {}", body.task_type);

        let response = self
            .client
            .post(url)
            .header("content-type", "application/json;charset=UTF-8")
            .header("cookie", &self.cookie)
            .json(body)
            .send()
            .await?;

        Ok(response.json().await?)
    }

    async fn task_status(&self, task_id: &str) -> Result<StatusResponse> {
        let url = format!("{}/api/task/status", self.base_url);

        let response = self
            .client
            .get(url)
            .query(&[("taskId", task_id)])
            .header("cookie", &self.cookie)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::auth(format!(
                "status fetch returned HTTP {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}
