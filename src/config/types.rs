use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub deployment: Deployment,
    /// Session cookie copied from an authenticated browser session.
    pub cookie: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u64,
    #[serde(default = "default_aspect_ratio")]
    pub default_aspect_ratio: String,
    #[serde(default = "default_image_weight")]
    pub default_image_weight: f64,
    #[serde(default = "default_print_progress")]
    pub print_progress: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// The two fixed KlingAI deployments. Base URL, upload host and prompt
/// length limit all vary by deployment, so everything per-deployment is
/// resolved through this enum rather than branched inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deployment {
    /// klingai.com (international)
    Global,
    /// klingai.kuaishou.com (domestic)
    Cn,
}

impl Deployment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Global => "https://klingai.com",
            Self::Cn => "https://klingai.kuaishou.com",
        }
    }

    /// Fragment uploads go to a separate CDN host, not the API origin.
    pub fn upload_base_url(&self) -> &'static str {
        match self {
            Self::Global => "https://upload.uvfuns.com",
            Self::Cn => "https://upload.kuaishouzt.com",
        }
    }

    /// Maximum prompt length accepted by the deployment, in characters.
    pub fn prompt_limit(&self) -> usize {
        match self {
            Self::Global => 2500,
            Self::Cn => 500,
        }
    }
}

impl Default for Deployment {
    fn default() -> Self {
        Self::Cn
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_minutes: default_timeout_minutes(),
            default_aspect_ratio: default_aspect_ratio(),
            default_image_weight: default_image_weight(),
            print_progress: default_print_progress(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_timeout_minutes() -> u64 {
    10
}

fn default_aspect_ratio() -> String {
    "1:1".to_string()
}

fn default_image_weight() -> f64 {
    0.5
}

fn default_print_progress() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
