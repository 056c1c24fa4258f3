//! Dashboard aggregates computed from a fetched lead list.

use serde::Serialize;

use crate::{BuyingIntent, CrmStatus, Lead, LeadCategory};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntentBreakdown {
    pub explicit: usize,
    pub implicit: usize,
    pub future: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadStats {
    pub total: usize,
    pub hot: usize,
    pub warm: usize,
    /// Everything that is neither hot nor warm.
    pub noise: usize,
    /// Share of hot leads in percent, rounded to one decimal. `0.0` when empty.
    pub hot_rate_percent: f64,
    pub intents: IntentBreakdown,
}

impl LeadStats {
    #[must_use]
    pub fn from_leads(leads: &[Lead]) -> Self {
        let total = leads.len();
        let count_category = |category: LeadCategory| {
            leads
                .iter()
                .filter(|l| l.analysis.category == category)
                .count()
        };
        let count_intent =
            |intent: BuyingIntent| leads.iter().filter(|l| l.analysis.intent == intent).count();

        let hot = count_category(LeadCategory::Hot);
        let warm = count_category(LeadCategory::Warm);

        #[allow(clippy::cast_precision_loss)]
        let hot_rate_percent = if total == 0 {
            0.0
        } else {
            (hot as f64 / total as f64 * 1000.0).round() / 10.0
        };

        Self {
            total,
            hot,
            warm,
            noise: total - hot - warm,
            hot_rate_percent,
            intents: IntentBreakdown {
                explicit: count_intent(BuyingIntent::Explicit),
                implicit: count_intent(BuyingIntent::Implicit),
                future: count_intent(BuyingIntent::Future),
            },
        }
    }
}

/// One column of the pipeline board.
#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn<'a> {
    pub status: CrmStatus,
    pub title: &'static str,
    pub leads: Vec<&'a Lead>,
}

/// Statuses shown on the board, in column order. Follow-Up and Lost leads
/// stay in the list view only.
pub const BOARD_COLUMNS: [(CrmStatus, &str); 4] = [
    (CrmStatus::New, "New Leads"),
    (CrmStatus::Contacted, "Contacted"),
    (CrmStatus::Qualified, "Qualified"),
    (CrmStatus::Converted, "Converted"),
];

/// Group leads into board columns, keeping the input order inside each column.
#[must_use]
pub fn pipeline_board(leads: &[Lead]) -> Vec<BoardColumn<'_>> {
    BOARD_COLUMNS
        .iter()
        .map(|&(status, title)| BoardColumn {
            status,
            title,
            leads: leads.iter().filter(|l| l.crm_status == status).collect(),
        })
        .collect()
}
