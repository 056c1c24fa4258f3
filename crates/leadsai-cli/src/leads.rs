//! Lead command handlers. Each returns the text to print; mutations re-fetch
//! from the store before rendering.

use std::path::Path;

use anyhow::Context;
use leadsai_core::{export_csv, pipeline_board, CrmStatus, LeadStats, MessageSource};
use leadsai_db::LeadStore;
use leadsai_intel::{capture_lead, record_note, CaptureError, MessageClassifier};

use crate::render;

/// Capture a simulated message.
///
/// # Errors
///
/// Returns an error if the store write or the re-fetch fails.
pub(crate) async fn run_simulate(
    store: &dyn LeadStore,
    classifier: &dyn MessageClassifier,
    message: &str,
    platform: MessageSource,
) -> anyhow::Result<String> {
    let lead = match capture_lead(store, classifier, message, platform).await {
        Ok(lead) => lead,
        Err(CaptureError::Validation(_)) => {
            return Ok("message is empty; nothing captured\n".to_string());
        }
        Err(e) => return Err(e.into()),
    };

    let stored = store.fetch_one(&lead.id).await?;
    let mut out = String::from("captured lead\n\n");
    out.push_str(&render::lead_detail(&stored));
    if stored.analysis.is_sentinel() {
        out.push_str("\nwarning: classification failed; review this lead manually\n");
    }
    Ok(out)
}

/// # Errors
///
/// Returns an error if the store cannot be loaded.
pub(crate) async fn run_list(
    store: &dyn LeadStore,
    status: Option<CrmStatus>,
    limit: Option<usize>,
) -> anyhow::Result<String> {
    let leads: Vec<_> = store
        .fetch_all()
        .await?
        .into_iter()
        .filter(|l| status.is_none_or(|s| l.crm_status == s))
        .take(limit.unwrap_or(usize::MAX))
        .collect();

    if leads.is_empty() {
        return Ok("no leads found; run `leadsai simulate` to capture one\n".to_string());
    }
    Ok(render::lead_table(&leads))
}

/// # Errors
///
/// Returns an error if the lead does not exist or the store cannot be loaded.
pub(crate) async fn run_show(store: &dyn LeadStore, id: &str) -> anyhow::Result<String> {
    let lead = store
        .fetch_one(id)
        .await
        .with_context(|| format!("could not load lead '{id}'"))?;
    Ok(render::lead_detail(&lead))
}

/// # Errors
///
/// Returns an error if the lead does not exist or the store write fails.
pub(crate) async fn run_status(
    store: &dyn LeadStore,
    id: &str,
    status: CrmStatus,
) -> anyhow::Result<String> {
    store
        .update_status(id, status)
        .await
        .with_context(|| format!("could not update status of lead '{id}'"))?;
    let lead = store.fetch_one(id).await?;
    Ok(render::lead_detail(&lead))
}

/// # Errors
///
/// Returns an error if the lead does not exist or the store write fails.
pub(crate) async fn run_note(
    store: &dyn LeadStore,
    id: &str,
    content: &str,
    author: Option<&str>,
) -> anyhow::Result<String> {
    match record_note(store, id, content, author).await {
        Ok(_) => {}
        Err(CaptureError::Validation(_)) => {
            return Ok("note is empty; nothing recorded\n".to_string());
        }
        Err(e) => {
            return Err(anyhow::Error::new(e).context(format!("could not add note to lead '{id}'")));
        }
    }
    let lead = store.fetch_one(id).await?;
    Ok(render::lead_detail(&lead))
}

/// Write the CSV to `output`, or return it for stdout when no path is given.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or the file cannot be written.
pub(crate) async fn run_export(
    store: &dyn LeadStore,
    output: Option<&Path>,
) -> anyhow::Result<String> {
    let leads = store.fetch_all().await?;
    let csv = export_csv(&leads)?;

    match output {
        Some(path) => {
            tokio::fs::write(path, csv)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            Ok(format!("exported {} leads to {}\n", leads.len(), path.display()))
        }
        None => Ok(csv),
    }
}

/// # Errors
///
/// Returns an error if the store cannot be loaded.
pub(crate) async fn run_stats(store: &dyn LeadStore) -> anyhow::Result<String> {
    let leads = store.fetch_all().await?;
    Ok(render::stats(&LeadStats::from_leads(&leads)))
}

/// # Errors
///
/// Returns an error if the store cannot be loaded.
pub(crate) async fn run_board(store: &dyn LeadStore) -> anyhow::Result<String> {
    let leads = store.fetch_all().await?;
    Ok(render::board(&pipeline_board(&leads)))
}

/// # Errors
///
/// Returns an error if the store cannot be cleared.
pub(crate) async fn run_clear(store: &dyn LeadStore, confirmed: bool) -> anyhow::Result<String> {
    if !confirmed {
        return Ok(
            "refusing to delete all leads and history without --yes; this cannot be undone\n"
                .to_string(),
        );
    }
    store.clear_all().await?;
    let remaining = store.fetch_all().await?.len();
    Ok(format!(
        "cleared all leads from the {} store ({remaining} remaining)\n",
        store.mode()
    ))
}
