//! Classification output attached to every lead.
//!
//! The serialized labels are the exact strings the classifier is asked to
//! produce, so the same types are used for the wire contract, the `analysis`
//! JSONB column, and the local store files.

use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadCategory {
    #[serde(rename = "Hot Lead", alias = "Hot")]
    Hot,
    #[serde(rename = "Warm Lead", alias = "Warm")]
    Warm,
    #[serde(rename = "No Lead / Noise", alias = "No-Lead")]
    NoLead,
}

impl LeadCategory {
    pub const ALL: [LeadCategory; 3] = [LeadCategory::Hot, LeadCategory::Warm, LeadCategory::NoLead];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LeadCategory::Hot => "Hot Lead",
            LeadCategory::Warm => "Warm Lead",
            LeadCategory::NoLead => "No Lead / Noise",
        }
    }
}

impl std::fmt::Display for LeadCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuyingIntent {
    Explicit,
    Implicit,
    Future,
    None,
}

impl BuyingIntent {
    pub const ALL: [BuyingIntent; 4] = [
        BuyingIntent::Explicit,
        BuyingIntent::Implicit,
        BuyingIntent::Future,
        BuyingIntent::None,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            BuyingIntent::Explicit => "Explicit",
            BuyingIntent::Implicit => "Implicit",
            BuyingIntent::Future => "Future",
            BuyingIntent::None => "None",
        }
    }
}

impl std::fmt::Display for BuyingIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::High, Urgency::Medium, Urgency::Low];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Urgency::High => "High",
            Urgency::Medium => "Medium",
            Urgency::Low => "Low",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuyingStage {
    Awareness,
    Consideration,
    Decision,
    Unknown,
}

impl BuyingStage {
    pub const ALL: [BuyingStage; 4] = [
        BuyingStage::Awareness,
        BuyingStage::Consideration,
        BuyingStage::Decision,
        BuyingStage::Unknown,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            BuyingStage::Awareness => "Awareness",
            BuyingStage::Consideration => "Consideration",
            BuyingStage::Decision => "Decision",
            BuyingStage::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for BuyingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Next step suggested to the CRM agent. Closed set; anything else from the
/// classifier is a schema violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendedAction {
    #[serde(rename = "Follow Up Immediately")]
    FollowUpImmediately,
    Nurture,
    Ignore,
    #[serde(rename = "Send Pricing")]
    SendPricing,
    #[serde(rename = "Schedule Demo")]
    ScheduleDemo,
    #[serde(rename = "Connect on LinkedIn")]
    ConnectOnLinkedIn,
    #[serde(rename = "Reply to Comment")]
    ReplyToComment,
}

impl RecommendedAction {
    pub const ALL: [RecommendedAction; 7] = [
        RecommendedAction::FollowUpImmediately,
        RecommendedAction::Nurture,
        RecommendedAction::Ignore,
        RecommendedAction::SendPricing,
        RecommendedAction::ScheduleDemo,
        RecommendedAction::ConnectOnLinkedIn,
        RecommendedAction::ReplyToComment,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RecommendedAction::FollowUpImmediately => "Follow Up Immediately",
            RecommendedAction::Nurture => "Nurture",
            RecommendedAction::Ignore => "Ignore",
            RecommendedAction::SendPricing => "Send Pricing",
            RecommendedAction::ScheduleDemo => "Schedule Demo",
            RecommendedAction::ConnectOnLinkedIn => "Connect on LinkedIn",
            RecommendedAction::ReplyToComment => "Reply to Comment",
        }
    }
}

impl std::fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub const SENTINEL_PRODUCT: &str = "Error analyzing";
pub const SENTINEL_SUMMARY: &str = "AI Analysis failed. Please review manually.";
pub const MAX_SCORE: u8 = 100;

/// Structured judgment for one message. Every field is always populated;
/// a failed classification is represented by [`AnalysisResult::sentinel`],
/// never by a partial value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub category: LeadCategory,
    pub intent: BuyingIntent,
    pub urgency: Urgency,
    pub stage: BuyingStage,
    /// Product or service mentioned in the message, or `"Unknown"`.
    pub product_detected: String,
    pub recommended_action: RecommendedAction,
    /// Lead score in `0..=100`.
    pub score: u8,
    pub summary_notes: String,
}

impl AnalysisResult {
    /// The fixed "no lead detected" analysis substituted when classification fails.
    #[must_use]
    pub fn sentinel() -> Self {
        Self {
            category: LeadCategory::NoLead,
            intent: BuyingIntent::None,
            urgency: Urgency::Low,
            stage: BuyingStage::Unknown,
            product_detected: SENTINEL_PRODUCT.to_string(),
            recommended_action: RecommendedAction::Ignore,
            score: 0,
            summary_notes: SENTINEL_SUMMARY.to_string(),
        }
    }

    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        *self == Self::sentinel()
    }

    /// Check the constraints serde cannot express on its own.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ScoreOutOfRange`] when `score > 100`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.score > MAX_SCORE {
            return Err(CoreError::ScoreOutOfRange(i64::from(self.score)));
        }
        Ok(())
    }
}
