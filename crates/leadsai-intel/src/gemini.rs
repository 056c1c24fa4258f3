//! REST client for the Gemini `generateContent` endpoint.
//!
//! Sends the message with a closed response schema so the model answers with
//! a single JSON object matching [`AnalysisResult`]. Anything else is an error.

use std::time::Duration;

use async_trait::async_trait;
use leadsai_core::config::DEFAULT_GEMINI_BASE_URL;
use leadsai_core::{
    AnalysisResult, BuyingIntent, BuyingStage, LeadCategory, MessageSource, RecommendedAction,
    Urgency,
};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ClassifyError;
use crate::MessageClassifier;


const API_KEY_HEADER: &str = "x-goog-api-key";
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"[redacted]")
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Client pointed at the public Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, ClassifyError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_GEMINI_BASE_URL)
    }

    /// Client with a custom base URL (for testing with wiremock).
    /// `timeout_secs == 0` leaves requests without a deadline.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ClassifyError::InvalidBaseUrl`] if `base_url` does not
    /// form a valid endpoint.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ClassifyError> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("leadsai/", env!("CARGO_PKG_VERSION")));
        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        let client = builder.build()?;

        let raw = format!(
            "{}/v1beta/models/{model}:generateContent",
            base_url.trim_end_matches('/')
        );
        let endpoint = Url::parse(&raw).map_err(|_| ClassifyError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            endpoint,
        })
    }
}

#[async_trait]
impl MessageClassifier for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn classify(
        &self,
        text: &str,
        platform: MessageSource,
    ) -> Result<AnalysisResult, ClassifyError> {
        let body = request_body(text, platform);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect(),
            });
        }

        let raw = response.text().await?;
        let envelope: GenerateContentResponse =
            serde_json::from_str(&raw).map_err(|source| ClassifyError::Deserialize {
                context: "generateContent response",
                source,
            })?;

        let candidate_text = envelope.first_text().ok_or(ClassifyError::EmptyResponse)?;
        parse_analysis(candidate_text)
    }
}

/// Parse the candidate text into a validated analysis.
///
/// # Errors
///
/// Returns [`ClassifyError::EmptyResponse`] for blank text,
/// [`ClassifyError::Deserialize`] when the JSON does not match the closed
/// schema, or [`ClassifyError::Schema`] when the score is out of range.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, ClassifyError> {
    if text.trim().is_empty() {
        return Err(ClassifyError::EmptyResponse);
    }
    let analysis: AnalysisResult =
        serde_json::from_str(text).map_err(|source| ClassifyError::Deserialize {
            context: "analysis payload",
            source,
        })?;
    analysis.validate()?;
    Ok(analysis)
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

fn prompt(text: &str, platform: MessageSource) -> String {
    format!(
        "You are an expert Lead Intelligence Agent. Analyze the following social media \
         message from a potential customer.\n\n\
         Platform & Source: {platform}\n\
         Message Text: \"{text}\"\n\n\
         Context:\n\
         - LinkedIn messages tend to be B2B and professional.\n\
         - Instagram/Facebook are often B2C but can be B2B.\n\
         - YouTube comments may be technical queries or general praise.\n\n\
         Determine the lead category, intent, urgency, and extract relevant details.\n\
         Be strict. \"Hot Leads\" must show clear buying intent. \"No Lead\" includes \
         simple greetings (\"Hi\", \"Nice post\") or spam."
    )
}

fn labels<T: Copy>(all: &[T], label: fn(T) -> &'static str) -> Vec<&'static str> {
    all.iter().map(|v| label(*v)).collect()
}

/// The closed response schema: every field required, enums restricted to
/// their label sets.
#[must_use]
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "category": {
                "type": "STRING",
                "enum": labels(&LeadCategory::ALL, LeadCategory::label),
                "description": "Classify based on buying intent."
            },
            "intent": {
                "type": "STRING",
                "enum": labels(&BuyingIntent::ALL, BuyingIntent::label),
                "description": "The type of buying intent detected."
            },
            "urgency": {
                "type": "STRING",
                "enum": labels(&Urgency::ALL, Urgency::label),
                "description": "The urgency level of the request."
            },
            "stage": {
                "type": "STRING",
                "enum": labels(&BuyingStage::ALL, BuyingStage::label),
                "description": "Estimated buying stage."
            },
            "product_detected": {
                "type": "STRING",
                "description": "The specific product or service mentioned, or 'Unknown'."
            },
            "recommended_action": {
                "type": "STRING",
                "enum": labels(&RecommendedAction::ALL, RecommendedAction::label),
                "description": "Best next step for the CRM agent specific to the platform."
            },
            "score": {
                "type": "INTEGER",
                "description": "Lead score from 0 to 100."
            },
            "summary_notes": {
                "type": "STRING",
                "description": "A short summary of the analysis for the CRM notes."
            }
        },
        "required": [
            "category", "intent", "urgency", "stage",
            "product_detected", "recommended_action", "score", "summary_notes"
        ]
    })
}

fn request_body(text: &str, platform: MessageSource) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": prompt(text, platform) }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
            "thinkingConfig": { "thinkingBudget": 0 }
        }
    })
}

#[cfg(test)]
mod tests {
    use leadsai_core::config::DEFAULT_GEMINI_MODEL;

    use super::*;

    #[test]
    fn endpoint_joins_base_and_model() {
        let client = GeminiClient::with_base_url("k", "gemini-test", 0, "http://localhost:9999/")
            .expect("client construction should not fail");
        assert_eq!(
            client.endpoint.as_str(),
            "http://localhost:9999/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = GeminiClient::with_base_url("k", "m", 0, "not a url");
        assert!(matches!(result, Err(ClassifyError::InvalidBaseUrl(_))));
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = GeminiClient::new("super-secret", DEFAULT_GEMINI_MODEL, 5).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains(DEFAULT_GEMINI_MODEL));
    }

    #[test]
    fn default_client_matches_config_defaults() {
        let config = leadsai_core::build_app_config(|_| Err(std::env::VarError::NotPresent))
            .expect("defaults should build");
        let from_config =
            GeminiClient::with_base_url("k", &config.gemini_model, 0, &config.gemini_base_url)
                .unwrap();
        let default = GeminiClient::new("k", DEFAULT_GEMINI_MODEL, 0).unwrap();
        assert_eq!(from_config.endpoint, default.endpoint);
    }

    #[test]
    fn schema_enums_use_wire_labels() {
        let schema = response_schema();
        let categories = schema["properties"]["category"]["enum"].as_array().unwrap();
        assert_eq!(categories.len(), 3);
        assert_eq!(categories[2], "No Lead / Noise");
        let actions = schema["properties"]["recommended_action"]["enum"]
            .as_array()
            .unwrap();
        assert!(actions.iter().any(|a| a == "Connect on LinkedIn"));
        assert_eq!(schema["required"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn request_body_disables_thinking_and_names_platform() {
        let body = request_body("Need a quote", MessageSource::YouTubeComment);
        assert_eq!(
            body["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            0
        );
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.contains("Platform & Source: YouTube Comment"));
        assert!(text.contains("Message Text: \"Need a quote\""));
    }

    #[test]
    fn parse_analysis_rejects_out_of_range_score() {
        let payload = json!({
            "category": "Warm Lead",
            "intent": "Implicit",
            "urgency": "Medium",
            "stage": "Consideration",
            "product_detected": "Unknown",
            "recommended_action": "Nurture",
            "score": 140,
            "summary_notes": "Curious."
        });
        let result = parse_analysis(&payload.to_string());
        assert!(matches!(result, Err(ClassifyError::Schema(_))), "{result:?}");
    }

    #[test]
    fn parse_analysis_rejects_unknown_enum_label() {
        let payload = json!({
            "category": "Lukewarm",
            "intent": "Implicit",
            "urgency": "Medium",
            "stage": "Consideration",
            "product_detected": "Unknown",
            "recommended_action": "Nurture",
            "score": 40,
            "summary_notes": "Curious."
        });
        let result = parse_analysis(&payload.to_string());
        assert!(matches!(result, Err(ClassifyError::Deserialize { .. })), "{result:?}");
    }

    #[test]
    fn parse_analysis_rejects_blank_text() {
        assert!(matches!(parse_analysis("  "), Err(ClassifyError::EmptyResponse)));
    }
}
