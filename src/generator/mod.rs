mod request;

pub use request::*;

use crate::{
    Error, Result,
    api::KlingApi,
    config::Config,
    task::{PollFailure, PollOutcome, TaskPoller, TaskSubmitter},
    upload::Uploader,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Terminal success of one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResult {
    pub task_id: String,
    pub image_url: String,
}

/// Drives one generation end to end: validate, upload the reference image
/// if present, submit, poll, classify. Strictly sequential; each stage's
/// failure short-circuits the rest, and nothing is retried.
pub struct Generator {
    config: Config,
    uploader: Uploader,
    submitter: TaskSubmitter,
    poller: TaskPoller,
}

impl Generator {
    pub fn new(api: Arc<dyn KlingApi>, config: Config) -> Self {
        let poller = TaskPoller::new(api.clone(), config.generation.print_progress);
        Self {
            uploader: Uploader::new(api.clone()),
            submitter: TaskSubmitter::new(api),
            poller,
            config,
        }
    }

    /// Shorter poll interval for tests.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poller = self.poller.with_interval(interval);
        self
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<ImageResult> {
        request.validate(self.config.service.deployment)?;

        let uploaded_url = match request.reference_image() {
            Some(image) => Some(self.uploader.upload(image).await?),
            None => None,
        };

        let task_id = self
            .submitter
            .submit(request, uploaded_url.as_deref())
            .await?;

        if self.config.generation.print_progress {
            info!("Task ID: {} | Prompt: {}", task_id, request.prompt());
        }

        let timeout_minutes = self.config.generation.timeout_minutes;
        let timeout = Duration::from_secs(timeout_minutes * 60);
        let outcome = self.poller.poll(&task_id, timeout).await?;

        match outcome {
            PollOutcome::Success(image_url) => Ok(ImageResult { task_id, image_url }),
            PollOutcome::Failure(PollFailure::Auth) => {
                Err(Error::auth("status fetch rejected by the service"))
            }
            PollOutcome::Failure(PollFailure::Task(reason)) => Err(Error::task_failed(
                reason.unwrap_or_else(|| "the service reported the task as failed".to_string()),
            )),
            PollOutcome::Failure(PollFailure::Transport(reason)) => Err(Error::task_failed(
                format!("status fetch failed: {}", reason),
            )),
            PollOutcome::Timeout => Err(Error::Timeout {
                minutes: timeout_minutes,
            }),
        }
    }
}
