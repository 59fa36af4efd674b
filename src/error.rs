// Error types. Library code returns these; the binary wraps them in
// `anyhow` and the user only ever sees `ANALYSIS_FAILED_MESSAGE`.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// The only message the user ever sees for a failed analysis, whatever
/// went wrong underneath.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Gagal terhubung ke server. Coba lagi!";

/// Every way a call to the analysis service can fail.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("could not reach analysis service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("analysis service responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed analysis response: {0}")]
    Malformed(String),
    #[error("analysis worker stopped before responding")]
    WorkerStopped,
}

impl AnalysisError {
    /// Localized text shown in place of the diagnostic detail.
    pub fn user_message(&self) -> &'static str {
        ANALYSIS_FAILED_MESSAGE
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Malformed(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not an image file")]
    NotAnImage(PathBuf),
    #[error("{0} is empty")]
    Empty(PathBuf),
}
