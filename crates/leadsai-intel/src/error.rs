use leadsai_core::CoreError;
use leadsai_db::DbError;
use thiserror::Error;

/// Why a classification attempt produced no usable analysis.
///
/// Never reaches a surface: [`crate::analyze_message`] turns every variant
/// into the sentinel analysis.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response carried no candidate text.
    #[error("empty response from classifier")]
    EmptyResponse,

    /// The body or candidate text did not match the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The analysis parsed but breaks a value constraint.
    #[error("analysis violates schema: {0}")]
    Schema(#[from] CoreError),

    #[error("invalid classifier base URL '{0}'")]
    InvalidBaseUrl(String),

    /// No API key is configured.
    #[error("classifier not configured")]
    NotConfigured,
}

/// Failures of the capture and note workflows that a surface must report.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The input was blank; no classifier or store call was made.
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl CaptureError {
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
