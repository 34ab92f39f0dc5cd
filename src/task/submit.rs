use crate::{
    Error, Result,
    api::{API_STATUS_OK, KlingApi, SubmitTaskBody, TaskArgument, TaskInput},
    generator::GenerationRequest,
};
use std::sync::Arc;
use tracing::debug;

/// Request type tags selected by presence of a reference image.
const TYPE_TEXT_TO_IMAGE: &str = "mmu_txt2img_aiweb";
const TYPE_IMAGE_TO_IMAGE: &str = "mmu_img2img_aiweb";

/// Fixed argument values the service expects on every submission.
const STYLE_DEFAULT: &str = "默认";
const BIZ_TAG: &str = "klingai";
const IMAGE_COUNT: &str = "1";

/// Builds and posts the submit body, returning the task id the service
/// assigned. A non-success envelope or a missing id means the job was
/// rejected before entering the job system (typically policy filtering),
/// not a transient fault.
pub struct TaskSubmitter {
    api: Arc<dyn KlingApi>,
}

impl TaskSubmitter {
    pub fn new(api: Arc<dyn KlingApi>) -> Self {
        Self { api }
    }

    pub async fn submit(
        &self,
        request: &GenerationRequest,
        uploaded_url: Option<&str>,
    ) -> Result<String> {
        let body = build_submit_body(request, uploaded_url);
        debug!("Submitting {} task", body.task_type);

        // Transport failures propagate as-is; only a well-formed refusal
        // counts as a rejection.
        let response = self.api.submit_task(&body).await?;

        if response.status != API_STATUS_OK {
            return Err(Error::submission(match response.message {
                Some(reason) => format!("service returned status {}: {}", response.status, reason),
                None => format!("service returned status {}", response.status),
            }));
        }

        response
            .data
            .and_then(|d| d.task)
            .map(|t| t.id)
            .ok_or_else(|| Error::submission("response carried no task id"))
    }
}

pub fn build_submit_body(
    request: &GenerationRequest,
    uploaded_url: Option<&str>,
) -> SubmitTaskBody {
    let mut arguments = vec![
        TaskArgument::new("prompt", request.prompt()),
        TaskArgument::new("style", STYLE_DEFAULT),
        TaskArgument::new("aspect_ratio", request.aspect_ratio().to_string()),
        TaskArgument::new("imageCount", IMAGE_COUNT),
        TaskArgument::new("biz", BIZ_TAG),
    ];
    let mut inputs = Vec::new();

    let task_type = if let Some(url) = uploaded_url {
        // Invariant: fidelity is always present when a reference image is.
        let fidelity = request.fidelity().unwrap_or_default();
        arguments.push(TaskArgument::new("fidelity", fidelity.to_string()));
        inputs.push(TaskInput {
            input_type: "URL".to_string(),
            url: url.to_string(),
            name: "input".to_string(),
        });
        TYPE_IMAGE_TO_IMAGE
    } else {
        TYPE_TEXT_TO_IMAGE
    };

    SubmitTaskBody {
        arguments,
        task_type: task_type.to_string(),
        inputs,
    }
}
