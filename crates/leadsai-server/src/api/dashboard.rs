use axum::{extract::State, Extension, Json};
use leadsai_core::{pipeline_board, CrmStatus, Lead, LeadStats};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct BoardColumnItem {
    status: CrmStatus,
    title: &'static str,
    count: usize,
    leads: Vec<Lead>,
}

pub(super) async fn stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<LeadStats>>, ApiError> {
    let leads = state
        .store
        .fetch_all()
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(LeadStats::from_leads(&leads), req_id.0)))
}

pub(super) async fn board(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<BoardColumnItem>>>, ApiError> {
    let leads = state
        .store
        .fetch_all()
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = pipeline_board(&leads)
        .into_iter()
        .map(|column| BoardColumnItem {
            status: column.status,
            title: column.title,
            count: column.leads.len(),
            leads: column.leads.into_iter().cloned().collect(),
        })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
