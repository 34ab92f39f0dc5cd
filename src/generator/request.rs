use crate::{Error, Result, config::Deployment};
use std::fmt;
use std::str::FromStr;

/// The seven aspect ratios the service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Square,
    Wide16x9,
    Landscape4x3,
    Landscape3x2,
    Portrait2x3,
    Portrait3x4,
    Tall9x16,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 7] = [
        Self::Square,
        Self::Wide16x9,
        Self::Landscape4x3,
        Self::Landscape3x2,
        Self::Portrait2x3,
        Self::Portrait3x4,
        Self::Tall9x16,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Wide16x9 => "16:9",
            Self::Landscape4x3 => "4:3",
            Self::Landscape3x2 => "3:2",
            Self::Portrait2x3 => "2:3",
            Self::Portrait3x4 => "3:4",
            Self::Tall9x16 => "9:16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s)
            .ok_or_else(|| {
                Error::validation(format!(
                    "invalid aspect ratio '{}', valid ratios: 1:1, 16:9, 4:3, 3:2, 2:3, 3:4, 9:16",
                    s
                ))
            })
    }
}

/// One image-generation request. Immutable once built; the fidelity weight
/// can only be set together with a reference image, so the
/// "weight present iff image present" invariant holds by construction.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    prompt: String,
    aspect_ratio: AspectRatio,
    fidelity: Option<f64>,
    reference_image: Option<Vec<u8>>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, aspect_ratio: AspectRatio) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio,
            fidelity: None,
            reference_image: None,
        }
    }

    pub fn with_reference_image(mut self, image: Vec<u8>, fidelity: f64) -> Self {
        self.reference_image = Some(image);
        self.fidelity = Some(fidelity);
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn fidelity(&self) -> Option<f64> {
        self.fidelity
    }

    pub fn reference_image(&self) -> Option<&[u8]> {
        self.reference_image.as_deref()
    }

    /// Pre-flight checks; runs before any network call. Prompt length is
    /// deployment-dependent.
    pub fn validate(&self, deployment: Deployment) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(Error::validation("prompt must not be empty"));
        }

        let length = self.prompt.chars().count();
        let limit = deployment.prompt_limit();
        if length > limit {
            return Err(Error::validation(format!(
                "prompt too long: {} characters, limit is {}",
                length, limit
            )));
        }

        if let Some(fidelity) = self.fidelity {
            if !(0.0..=1.0).contains(&fidelity) {
                return Err(Error::validation(format!(
                    "fidelity out of range: {} (must be between 0 and 1)",
                    fidelity
                )));
            }
        }

        Ok(())
    }
}

/// Inline options extracted from prompt text of the form
/// `some prompt --ar 16:9 --iw 0.7`.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptOptions {
    pub prompt: String,
    pub aspect_ratio: Option<String>,
    pub image_weight: Option<String>,
}

pub fn parse_prompt_options(input: &str) -> PromptOptions {
    let mut parts = input.split("--");
    let prompt = parts.next().unwrap_or_default().trim().to_string();

    let mut aspect_ratio = None;
    let mut image_weight = None;
    for part in parts {
        let mut words = part.trim().splitn(2, ' ');
        let key = words.next().unwrap_or_default();
        let value = words.next().map(|v| v.trim().to_string());
        match key {
            "ar" => aspect_ratio = value,
            "iw" => image_weight = value,
            _ => {}
        }
    }

    PromptOptions {
        prompt,
        aspect_ratio,
        image_weight,
    }
}

/// Builds a request from raw prompt text, applying inline `--ar`/`--iw`
/// flags and falling back to configured defaults.
pub fn request_from_prompt(
    input: &str,
    defaults: &crate::config::GenerationConfig,
    reference_image: Option<Vec<u8>>,
) -> Result<GenerationRequest> {
    let options = parse_prompt_options(input);
    if options.prompt.is_empty() {
        return Err(Error::validation("prompt must not be empty"));
    }

    let ratio_text = options
        .aspect_ratio
        .unwrap_or_else(|| defaults.default_aspect_ratio.clone());
    let aspect_ratio = ratio_text.parse::<AspectRatio>()?;

    let weight = match options.image_weight {
        Some(text) => text
            .parse::<f64>()
            .map_err(|_| Error::validation(format!("invalid image weight '{}'", text)))?,
        None => defaults.default_image_weight,
    };

    let request = GenerationRequest::new(options.prompt, aspect_ratio);
    Ok(match reference_image {
        Some(image) => request.with_reference_image(image, weight),
        None => request,
    })
}
