use async_trait::async_trait;
use kling_draw::{
    Error, Result,
    api::{
        KlingApi, StatusResponse, SubmitData, SubmitResponse, SubmitTaskBody, TaskRef,
        TaskStatusData, TokenData, TokenResponse, VerifyData, VerifyResponse, Work, WorkResource,
    },
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One scripted answer to a status fetch.
#[derive(Debug, Clone)]
pub enum ScriptedStatus {
    Response(i64, Option<i64>, Option<String>),
    TaskFailure(String),
    AuthError(String),
    TransportError(String),
}

/// Mock remote service for testing. Responses are scripted up front and
/// every call is recorded so tests can assert on what went over the wire.
pub struct MockKlingApi {
    pub token: Mutex<Option<String>>,
    pub token_error: Option<String>,
    pub probe_error: Option<String>,
    pub fragment_error: Option<String>,
    pub complete_error: Option<String>,
    pub verify_url: Mutex<Option<String>>,
    pub verify_error: Option<String>,
    pub submit_status: i64,
    pub submit_task_id: Option<String>,
    pub submit_message: Option<String>,
    pub submit_error: Option<String>,
    pub resume_error: Option<String>,
    pub statuses: Mutex<VecDeque<ScriptedStatus>>,

    pub issued_filenames: Arc<Mutex<Vec<String>>>,
    pub resume_calls: Arc<Mutex<Vec<String>>>,
    pub probe_calls: Arc<Mutex<Vec<String>>>,
    pub fragment_calls: Arc<Mutex<Vec<(String, u32, usize)>>>,
    pub complete_calls: Arc<Mutex<Vec<(String, u32)>>>,
    pub submit_bodies: Arc<Mutex<Vec<SubmitTaskBody>>>,
    pub verify_calls: Arc<Mutex<Vec<String>>>,
    pub status_calls: Arc<Mutex<Vec<String>>>,
}

impl MockKlingApi {
    pub fn new() -> Self {
        Self {
            token: Mutex::new(Some("upload-token".to_string())),
            token_error: None,
            probe_error: None,
            fragment_error: None,
            complete_error: None,
            verify_url: Mutex::new(Some("https://cdn.example/hosted.png".to_string())),
            verify_error: None,
            submit_status: 200,
            submit_task_id: Some("task-1".to_string()),
            submit_message: None,
            submit_error: None,
            resume_error: None,
            statuses: Mutex::new(VecDeque::new()),
            issued_filenames: Arc::new(Mutex::new(Vec::new())),
            resume_calls: Arc::new(Mutex::new(Vec::new())),
            probe_calls: Arc::new(Mutex::new(Vec::new())),
            fragment_calls: Arc::new(Mutex::new(Vec::new())),
            complete_calls: Arc::new(Mutex::new(Vec::new())),
            submit_bodies: Arc::new(Mutex::new(Vec::new())),
            verify_calls: Arc::new(Mutex::new(Vec::new())),
            status_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_missing_token(self) -> Self {
        *self.token.lock().unwrap() = None;
        self
    }

    pub fn with_token_error(mut self, error: impl Into<String>) -> Self {
        self.token_error = Some(error.into());
        self
    }

    pub fn with_probe_error(mut self, error: impl Into<String>) -> Self {
        self.probe_error = Some(error.into());
        self
    }

    pub fn with_fragment_error(mut self, error: impl Into<String>) -> Self {
        self.fragment_error = Some(error.into());
        self
    }

    pub fn with_complete_error(mut self, error: impl Into<String>) -> Self {
        self.complete_error = Some(error.into());
        self
    }

    pub fn with_missing_verify_url(self) -> Self {
        *self.verify_url.lock().unwrap() = None;
        self
    }

    pub fn with_submit_status(mut self, status: i64) -> Self {
        self.submit_status = status;
        self
    }

    pub fn with_submit_message(mut self, message: impl Into<String>) -> Self {
        self.submit_message = Some(message.into());
        self
    }

    pub fn with_resume_error(mut self, error: impl Into<String>) -> Self {
        self.resume_error = Some(error.into());
        self
    }

    pub fn with_missing_task_id(mut self) -> Self {
        self.submit_task_id = None;
        self
    }

    pub fn with_statuses(self, statuses: Vec<ScriptedStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn status_call_count(&self) -> usize {
        self.status_calls.lock().unwrap().len()
    }
}

impl Default for MockKlingApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KlingApi for MockKlingApi {
    async fn issue_upload_token(&self, filename: &str) -> Result<TokenResponse> {
        self.issued_filenames
            .lock()
            .unwrap()
            .push(filename.to_string());

        if let Some(ref error) = self.token_error {
            return Err(Error::internal(error.clone()));
        }

        Ok(TokenResponse {
            data: self
                .token
                .lock()
                .unwrap()
                .clone()
                .map(|token| TokenData { token }),
        })
    }

    async fn resume_upload(&self, upload_token: &str) -> Result<()> {
        self.resume_calls.lock().unwrap().push(upload_token.to_string());

        match self.resume_error {
            Some(ref error) => Err(Error::internal(error.clone())),
            None => Ok(()),
        }
    }

    async fn probe_fragment(&self, upload_token: &str) -> Result<()> {
        self.probe_calls.lock().unwrap().push(upload_token.to_string());

        match self.probe_error {
            Some(ref error) => Err(Error::internal(error.clone())),
            None => Ok(()),
        }
    }

    async fn send_fragment(
        &self,
        upload_token: &str,
        fragment_id: u32,
        bytes: &[u8],
    ) -> Result<()> {
        self.fragment_calls.lock().unwrap().push((
            upload_token.to_string(),
            fragment_id,
            bytes.len(),
        ));

        match self.fragment_error {
            Some(ref error) => Err(Error::upload(error.clone())),
            None => Ok(()),
        }
    }

    async fn complete_upload(&self, upload_token: &str, fragment_count: u32) -> Result<()> {
        self.complete_calls
            .lock()
            .unwrap()
            .push((upload_token.to_string(), fragment_count));

        match self.complete_error {
            Some(ref error) => Err(Error::upload(error.clone())),
            None => Ok(()),
        }
    }

    async fn verify_upload(&self, upload_token: &str) -> Result<VerifyResponse> {
        self.verify_calls.lock().unwrap().push(upload_token.to_string());

        if let Some(ref error) = self.verify_error {
            return Err(Error::internal(error.clone()));
        }

        Ok(VerifyResponse {
            data: Some(VerifyData {
                url: self.verify_url.lock().unwrap().clone(),
            }),
        })
    }

    async fn submit_task(&self, body: &SubmitTaskBody) -> Result<SubmitResponse> {
        self.submit_bodies.lock().unwrap().push(body.clone());

        if let Some(ref error) = self.submit_error {
            return Err(Error::internal(error.clone()));
        }

        Ok(SubmitResponse {
            status: self.submit_status,
            data: Some(SubmitData {
                task: self.submit_task_id.clone().map(|id| TaskRef { id }),
            }),
            message: self.submit_message.clone(),
        })
    }

    async fn task_status(&self, task_id: &str) -> Result<StatusResponse> {
        self.status_calls.lock().unwrap().push(task_id.to_string());

        let scripted = self.statuses.lock().unwrap().pop_front();
        let scripted = match scripted {
            Some(scripted) => scripted,
            // Script exhausted: keep reporting an opaque in-progress code.
            None => ScriptedStatus::Response(200, Some(5), None),
        };

        match scripted {
            ScriptedStatus::AuthError(reason) => Err(Error::auth(reason)),
            ScriptedStatus::TransportError(reason) => Err(Error::internal(reason)),
            ScriptedStatus::TaskFailure(reason) => Ok(StatusResponse {
                status: 200,
                data: Some(TaskStatusData {
                    status: 50,
                    works: Vec::new(),
                }),
                message: Some(reason),
            }),
            ScriptedStatus::Response(envelope, task_status, url) => Ok(StatusResponse {
                status: envelope,
                data: task_status.map(|status| TaskStatusData {
                    status,
                    works: url
                        .map(|u| {
                            vec![Work {
                                resource: Some(WorkResource { resource: u }),
                            }]
                        })
                        .unwrap_or_default(),
                }),
                message: None,
            }),
        }
    }
}
