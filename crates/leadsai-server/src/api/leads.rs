use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use leadsai_core::{CrmStatus, HistoryItem, Lead, MessageSource};
use leadsai_intel::{capture_lead, record_note, CaptureError};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

const EXPORT_FILENAME: &str = "leads_export.csv";

#[derive(Debug, Deserialize)]
pub(super) struct CreateLeadRequest {
    pub message_text: String,
    pub platform: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddNoteRequest {
    pub content: String,
    pub author: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub(super) struct NoteAdded {
    note: HistoryItem,
    lead: Lead,
}

fn map_capture_error(request_id: String, error: &CaptureError) -> ApiError {
    match error {
        CaptureError::Validation(e) => ApiError::new(request_id, "validation_error", e.to_string()),
        CaptureError::Store(e) => map_db_error(request_id, e),
    }
}

pub(super) async fn list_leads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Lead>>>, ApiError> {
    let leads = state
        .store
        .fetch_all()
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(leads, req_id.0)))
}

pub(super) async fn get_lead(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Lead>>, ApiError> {
    let lead = state
        .store
        .fetch_one(&id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(lead, req_id.0)))
}

/// Simulate an inbound message: classify, build, and persist a lead.
pub(super) async fn create_lead(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Lead>>), ApiError> {
    let platform: MessageSource = body
        .platform
        .parse()
        .map_err(|e: leadsai_core::CoreError| {
            ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
        })?;

    let captured = capture_lead(
        state.store.as_ref(),
        state.classifier.as_ref(),
        &body.message_text,
        platform,
    )
    .await
    .map_err(|e| map_capture_error(req_id.0.clone(), &e))?;

    let lead = state
        .store
        .fetch_one(&captured.id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(lead, req_id.0))))
}

pub(super) async fn update_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Lead>>, ApiError> {
    let status: CrmStatus = body.status.parse().map_err(|e: leadsai_core::CoreError| {
        ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
    })?;

    state
        .store
        .update_status(&id, status)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let lead = state
        .store
        .fetch_one(&id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(lead, req_id.0)))
}

pub(super) async fn add_note(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<AddNoteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<NoteAdded>>), ApiError> {
    let note = record_note(
        state.store.as_ref(),
        &id,
        &body.content,
        body.author.as_deref(),
    )
    .await
    .map_err(|e| map_capture_error(req_id.0.clone(), &e))?;

    let lead = state
        .store
        .fetch_one(&id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(NoteAdded { note, lead }, req_id.0)),
    ))
}

pub(super) async fn clear_leads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .clear_all()
        .await
        .map_err(|e| map_db_error(req_id.0, &e))?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn export_leads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    let leads = state
        .store
        .fetch_all()
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let csv = leadsai_core::export_csv(&leads).map_err(|e| {
        tracing::error!(error = %e, "csv export failed");
        ApiError::new(req_id.0.clone(), "internal_error", "csv export failed")
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        csv,
    ))
}
