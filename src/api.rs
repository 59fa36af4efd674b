// API client module: a small blocking HTTP client that talks to the
// receipt analysis service. One request per call, no retries; the caller
// decides what the user sees when it fails.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client};

use crate::error::AnalysisError;
use crate::image::ImagePayload;
use crate::model::{AnalysisResult, AnalyzeResponse};

/// Environment variable overriding the service location.
pub const API_URL_ENV: &str = "CARBONLENS_API_URL";
/// Where the analysis service runs during development.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Anything that can turn a receipt photo into an analysis result. The
/// session talks to this trait so tests can stand in for the network.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, AnalysisError>;
}

/// Holds a reqwest blocking client and the base URL of the analysis
/// service.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        // No request timeout: a slow analysis is abandoned by the user,
        // never by the client.
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .context("Failed to build HTTP client")?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(ApiClient { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload the receipt photo as multipart/form-data (`image` part) to
    /// `/analyze` and parse the `data` envelope of the reply.
    pub fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        let url = format!("{}/analyze", &self.base_url);

        let part = multipart::Part::bytes(image.bytes.to_vec())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)?;
        let form = multipart::Form::new().part("image", part);

        log::info!(
            "uploading {} ({} bytes) to {}",
            image.file_name,
            image.bytes.len(),
            url
        );
        let res = self.client.post(&url).multipart(form).send()?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_else(|_| "".into());
            return Err(AnalysisError::Status { status, body });
        }

        let body = res.text()?;
        let envelope: AnalyzeResponse = serde_json::from_str(&body)?;
        envelope.data.validate()?;
        log::info!(
            "analysis finished: {} kg CO2e over {} items",
            envelope.data.total_co2_kg,
            envelope.data.items.len()
        );
        Ok(envelope.data)
    }
}

impl Analyzer for ApiClient {
    fn analyze(&self, image: &ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        ApiClient::analyze(self, image)
    }
}
