//! Domain model for LeadsAI: leads, their classification, the activity trail,
//! and the read-only projections the dashboards render.

pub mod analysis;
pub mod app_config;
pub mod builder;
pub mod config;
pub mod export;
pub mod leads;
pub mod platforms;
pub mod stats;

pub use analysis::{
    AnalysisResult, BuyingIntent, BuyingStage, LeadCategory, RecommendedAction, Urgency,
};
pub use app_config::{AppConfig, BackendDebugInfo, Environment};
pub use builder::{build_lead, build_lead_at, synthesize_username};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use export::{export_csv, EXPORT_HEADERS};
pub use leads::{
    sort_leads_newest_first, validate_message, validate_note, CrmStatus, HistoryItem,
    HistoryType, Lead, MessageSource,
};
pub use platforms::{IntegrationSettings, PlatformSettings};
pub use stats::{pipeline_board, BoardColumn, IntentBreakdown, LeadStats};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{field} must not be empty")]
    EmptyText { field: &'static str },

    #[error("unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("score {0} is outside 0..=100")]
    ScoreOutOfRange(i64),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv export produced invalid utf-8")]
    CsvEncoding,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
