use crate::{
    Error, Result,
    api::KlingApi,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Fragment id used for the whole image. Source images are small, so the
/// resumable-upload protocol is always driven with a single fragment.
const SINGLE_FRAGMENT_ID: u32 = 0;
const SINGLE_FRAGMENT_COUNT: u32 = 1;

/// Turns raw image bytes into a service-hosted URL via the chunked-upload
/// handshake: issue token, resume check, preflight probe, send fragment 0,
/// complete, verify. A failed required step aborts the rest; the session is
/// never reused.
pub struct Uploader {
    api: Arc<dyn KlingApi>,
}

impl Uploader {
    pub fn new(api: Arc<dyn KlingApi>) -> Self {
        Self { api }
    }

    pub async fn upload(&self, image: &[u8]) -> Result<String> {
        let filename = random_filename();
        debug!("Starting image upload as: {}", filename);

        let token_response = self
            .api
            .issue_upload_token(&filename)
            .await
            .map_err(|e| Error::upload(format!("token issue failed: {}", e)))?;

        let token = token_response
            .data
            .map(|d| d.token)
            .ok_or_else(|| Error::upload("token issue response missing token"))?;

        // Resume check and capability preflight. Both informational only:
        // the upload always starts from fragment 0.
        if let Err(e) = self.api.resume_upload(&token).await {
            warn!("Resume check failed, continuing: {}", e);
        }
        if let Err(e) = self.api.probe_fragment(&token).await {
            warn!("Fragment preflight failed, continuing: {}", e);
        }

        self.api
            .send_fragment(&token, SINGLE_FRAGMENT_ID, image)
            .await
            .map_err(|e| Error::upload(format!("fragment upload failed: {}", e)))?;

        self.api
            .complete_upload(&token, SINGLE_FRAGMENT_COUNT)
            .await
            .map_err(|e| Error::upload(format!("upload completion failed: {}", e)))?;

        let verify_response = self
            .api
            .verify_upload(&token)
            .await
            .map_err(|e| Error::upload(format!("upload verification failed: {}", e)))?;

        verify_response
            .data
            .and_then(|d| d.url)
            .ok_or_else(|| Error::upload("verify response missing hosted URL"))
    }
}

fn random_filename() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}.png", &id[..8])
}
