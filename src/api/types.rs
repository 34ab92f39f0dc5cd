use serde::{Deserialize, Serialize};

/// Envelope for `GET /api/upload/issue/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub data: Option<TokenData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenData {
    pub token: String,
}

/// Envelope for `GET /api/upload/verify/token`. The hosted URL is only
/// present when the service accepted the upload.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub data: Option<VerifyData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyData {
    #[serde(default)]
    pub url: Option<String>,
}

/// Body for `POST /api/task/submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTaskBody {
    pub arguments: Vec<TaskArgument>,
    #[serde(rename = "type")]
    pub task_type: String,
    pub inputs: Vec<TaskInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskArgument {
    pub name: String,
    pub value: String,
}

impl TaskArgument {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskInput {
    #[serde(rename = "inputType")]
    pub input_type: String,
    pub url: String,
    pub name: String,
}

/// Envelope for `POST /api/task/submit`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub status: i64,
    #[serde(default)]
    pub data: Option<SubmitData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitData {
    #[serde(default)]
    pub task: Option<TaskRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskRef {
    pub id: String,
}

/// Envelope for `GET /api/task/status`. This is the canonical wrapped shape
/// (`data.status`); the transport never exposes the unwrapped variant.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: i64,
    #[serde(default)]
    pub data: Option<TaskStatusData>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatusData {
    pub status: i64,
    #[serde(default)]
    pub works: Vec<Work>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Work {
    #[serde(default)]
    pub resource: Option<WorkResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkResource {
    pub resource: String,
}

/// Remote task status codes. Anything else is an in-progress code whose
/// exact vocabulary is remote-defined and opaque to this client.
pub const TASK_STATUS_FAILED: i64 = 50;
pub const TASK_STATUS_COMPLETE: i64 = 99;

/// Top-level envelope status denoting a well-formed response.
pub const API_STATUS_OK: i64 = 200;
