//! Plain-text views of leads for the terminal.

use std::fmt::Write as _;

use leadsai_core::{BoardColumn, Lead, LeadStats};

const MESSAGE_PREVIEW_CHARS: usize = 48;

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub(crate) fn lead_table(leads: &[Lead]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}{:<18}{:<20}{:<17}{:<7}{:<11}MESSAGE",
        "ID", "CAPTURED", "PLATFORM", "CATEGORY", "SCORE", "STATUS"
    );
    for lead in leads {
        let _ = writeln!(
            out,
            "{:<10}{:<18}{:<20}{:<17}{:<7}{:<11}{}",
            short_id(&lead.id),
            lead.timestamp.format("%Y-%m-%d %H:%M"),
            lead.platform.label(),
            lead.analysis.category.label(),
            lead.analysis.score,
            lead.crm_status.label(),
            truncate(&lead.message_text, MESSAGE_PREVIEW_CHARS)
        );
    }
    out
}

pub(crate) fn lead_detail(lead: &Lead) -> String {
    let a = &lead.analysis;
    let mut out = String::new();
    let _ = writeln!(out, "Lead {}", lead.id);
    let _ = writeln!(out, "From:      {} via {}", lead.username, lead.platform);
    let _ = writeln!(
        out,
        "Captured:  {}",
        lead.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "Status:    {}", lead.crm_status);
    let _ = writeln!(out, "Message:   {}", lead.message_text);
    if !lead.tags.is_empty() {
        let _ = writeln!(out, "Tags:      {}", lead.tags.join(", "));
    }
    out.push('\n');
    let _ = writeln!(out, "Analysis");
    let _ = writeln!(out, "  Category:  {} (score {})", a.category, a.score);
    let _ = writeln!(out, "  Intent:    {}", a.intent);
    let _ = writeln!(out, "  Urgency:   {}", a.urgency);
    let _ = writeln!(out, "  Stage:     {}", a.stage);
    let _ = writeln!(out, "  Product:   {}", a.product_detected);
    let _ = writeln!(out, "  Next step: {}", a.recommended_action);
    let _ = writeln!(out, "  Notes:     {}", a.summary_notes);
    out.push('\n');
    let _ = writeln!(out, "History");
    for item in &lead.history {
        let author = item
            .author
            .as_deref()
            .map(|a| format!(" ({a})"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {}  {:<14}{}{}",
            item.date.format("%Y-%m-%d %H:%M:%S"),
            item.kind.as_str(),
            item.content,
            author
        );
    }
    out
}

pub(crate) fn stats(stats: &LeadStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total leads:    {}", stats.total);
    let _ = writeln!(out, "Hot leads:      {}", stats.hot);
    let _ = writeln!(out, "Warm leads:     {}", stats.warm);
    let _ = writeln!(out, "Noise:          {}", stats.noise);
    let _ = writeln!(out, "Hot lead rate:  {:.1}%", stats.hot_rate_percent);
    let _ = writeln!(
        out,
        "Intent:         explicit {} / implicit {} / future {}",
        stats.intents.explicit, stats.intents.implicit, stats.intents.future
    );
    out
}

pub(crate) fn board(columns: &[BoardColumn<'_>]) -> String {
    let mut out = String::new();
    for column in columns {
        let _ = writeln!(out, "== {} ({}) ==", column.title, column.leads.len());
        for lead in &column.leads {
            let _ = writeln!(
                out,
                "  {}  {:<12}{:>3}  {}",
                short_id(&lead.id),
                lead.username,
                lead.analysis.score,
                truncate(&lead.message_text, MESSAGE_PREVIEW_CHARS)
            );
        }
    }
    out
}
