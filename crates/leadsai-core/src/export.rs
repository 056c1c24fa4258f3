//! Tabular CSV projection of leads, one row per lead. Produced on demand,
//! never persisted.

use crate::{CoreError, Lead};

pub const EXPORT_HEADERS: [&str; 10] = [
    "ID", "Platform", "Username", "Category", "Intent", "Product", "Urgency", "Score", "Status",
    "Date",
];

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render `leads` as CSV in the given order. Fields containing commas,
/// quotes, or newlines are quoted.
///
/// # Errors
///
/// Returns [`CoreError::Csv`] if a record cannot be written.
pub fn export_csv(leads: &[Lead]) -> Result<String, CoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADERS)?;

    for lead in leads {
        let score = lead.analysis.score.to_string();
        let date = lead.timestamp.format(DATE_FORMAT).to_string();
        writer.write_record([
            lead.id.as_str(),
            lead.platform.label(),
            lead.username.as_str(),
            lead.analysis.category.label(),
            lead.analysis.intent.label(),
            lead.analysis.product_detected.as_str(),
            lead.analysis.urgency.label(),
            score.as_str(),
            lead.crm_status.label(),
            date.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Csv(e.into_error().into()))?;
    String::from_utf8(bytes).map_err(|_| CoreError::CsvEncoding)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{AnalysisResult, CrmStatus, MessageSource};

    fn lead(id: &str, product: &str) -> Lead {
        let mut analysis = AnalysisResult::sentinel();
        analysis.product_detected = product.to_string();
        analysis.score = 55;
        Lead {
            id: id.to_string(),
            username: "user_12".to_string(),
            platform: MessageSource::InstagramComment,
            message_text: "ignored by export".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 7, 4, 9, 30, 0).unwrap(),
            analysis,
            crm_status: CrmStatus::Qualified,
            tags: vec![],
            history: vec![],
        }
    }

    #[test]
    fn empty_export_has_header_only() {
        let csv = export_csv(&[]).unwrap();
        assert_eq!(
            csv,
            "ID,Platform,Username,Category,Intent,Product,Urgency,Score,Status,Date\n"
        );
    }

    #[test]
    fn rows_follow_input_order_and_columns() {
        let csv = export_csv(&[lead("a", "Starter"), lead("b", "Pro")]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "a,Instagram Comment,user_12,No Lead / Noise,None,Starter,Low,55,Qualified,2025-07-04 09:30:00"
        );
        assert!(lines[2].starts_with("b,"));
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let csv = export_csv(&[lead("a", "Boots, size 9")]).unwrap();
        assert!(csv.contains("\"Boots, size 9\""), "got: {csv}");
    }
}
