//! Message classification and the lead capture workflow.
//!
//! A [`MessageClassifier`] turns raw text into an [`AnalysisResult`]. Callers
//! go through [`analyze_message`], which never fails: any classifier error is
//! logged and replaced by [`AnalysisResult::sentinel`].

pub mod capture;
pub mod error;
pub mod gemini;

use std::sync::Arc;

use async_trait::async_trait;
use leadsai_core::{AnalysisResult, AppConfig, MessageSource};

pub use capture::{capture_lead, record_note};
pub use error::{CaptureError, ClassifyError};
pub use gemini::GeminiClient;

/// Anything that can judge a message's buying intent.
#[async_trait]
pub trait MessageClassifier: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Classify `text` captured on `platform`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClassifyError`] describing why no analysis was produced.
    async fn classify(
        &self,
        text: &str,
        platform: MessageSource,
    ) -> Result<AnalysisResult, ClassifyError>;
}

/// Stand-in used when no API key is configured. Every call fails with
/// [`ClassifyError::NotConfigured`], so every lead gets the sentinel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentinelClassifier;

#[async_trait]
impl MessageClassifier for SentinelClassifier {
    fn name(&self) -> &'static str {
        "sentinel"
    }

    async fn classify(
        &self,
        _text: &str,
        _platform: MessageSource,
    ) -> Result<AnalysisResult, ClassifyError> {
        Err(ClassifyError::NotConfigured)
    }
}

/// Classify a message, substituting the sentinel analysis on any failure.
pub async fn analyze_message(
    classifier: &dyn MessageClassifier,
    text: &str,
    platform: MessageSource,
) -> AnalysisResult {
    match classifier.classify(text, platform).await {
        Ok(analysis) => {
            tracing::debug!(
                classifier = classifier.name(),
                platform = %platform,
                category = %analysis.category,
                score = analysis.score,
                "message classified"
            );
            analysis
        }
        Err(e) => {
            tracing::warn!(
                classifier = classifier.name(),
                platform = %platform,
                error = %e,
                "classification failed; using sentinel analysis"
            );
            AnalysisResult::sentinel()
        }
    }
}

/// Build the classifier for this process: Gemini when `GEMINI_API_KEY` is
/// set, the sentinel otherwise.
///
/// # Errors
///
/// Returns [`ClassifyError`] if the Gemini client cannot be constructed.
pub fn classifier_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn MessageClassifier>, ClassifyError> {
    match config.gemini_api_key.as_deref() {
        Some(key) => {
            let client = GeminiClient::with_base_url(
                key,
                &config.gemini_model,
                config.classifier_timeout_secs,
                &config.gemini_base_url,
            )?;
            tracing::info!(model = %config.gemini_model, "gemini classifier enabled");
            Ok(Arc::new(client))
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set; every lead will receive the sentinel analysis");
            Ok(Arc::new(SentinelClassifier))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sentinel_classifier_always_yields_sentinel() {
        let analysis =
            analyze_message(&SentinelClassifier, "I want to buy", MessageSource::InstagramDm).await;
        assert!(analysis.is_sentinel());
    }

    #[tokio::test]
    async fn sentinel_classifier_reports_not_configured() {
        let result = SentinelClassifier
            .classify("hello", MessageSource::FacebookMessenger)
            .await;
        assert!(matches!(result, Err(ClassifyError::NotConfigured)));
    }

    #[test]
    fn classifier_from_config_picks_by_key_presence() {
        let without_key = leadsai_core::build_app_config(|_| Err(std::env::VarError::NotPresent))
            .unwrap();
        assert_eq!(classifier_from_config(&without_key).unwrap().name(), "sentinel");

        let with_key = leadsai_core::build_app_config(|key| {
            if key == "GEMINI_API_KEY" {
                Ok("test-key".to_string())
            } else {
                Err(std::env::VarError::NotPresent)
            }
        })
        .unwrap();
        assert_eq!(classifier_from_config(&with_key).unwrap().name(), "gemini");
    }
}
