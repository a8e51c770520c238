//! Axum route handlers for the Planner API.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::planner::export::{export_plan, ExportFormat};
use crate::planner::session::PlanRecord;
use crate::planner::skills::RequestKey;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Raw form inputs. `skills` is the comma-separated string as typed.
#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub target_role: String,
    pub skills: String,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    #[serde(flatten)]
    pub record: PlanRecord,
    /// `true` when the inputs matched the previous request and no model call was made.
    pub cached: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// `txt` (default) or `md`.
    pub format: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), AppError> {
    let session = state.sessions.create().await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionCreatedResponse {
            session_id: session.id(),
            created_at: session.created_at(),
        }),
    ))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(session_id))
    }
}

/// POST /api/v1/sessions/:id/plan
///
/// Validates the inputs, then returns the session's cached plan when the inputs are
/// unchanged or runs the two-stage chain otherwise. Validation failures never touch
/// the session.
pub async fn handle_generate_plan(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, AppError> {
    let key = RequestKey::from_inputs(&request.target_role, &request.skills)?;

    let session = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| session_not_found(session_id))?;

    // Serialized per session: one in-flight generation at a time.
    let outcome = session
        .plan_for(&state.chain, state.llm.as_ref(), key)
        .await
        .map_err(|e| {
            warn!("Session {session_id}: plan generation failed: {e}");
            AppError::from(e)
        })?;

    if !outcome.cached {
        info!("Session {session_id}: new learning plan generated");
    }

    Ok(Json(PlanResponse {
        record: outcome.value,
        cached: outcome.cached,
    }))
}

/// GET /api/v1/sessions/:id/plan
pub async fn handle_get_plan(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<PlanRecord>, AppError> {
    let record = current_record(&state, session_id).await?;
    Ok(Json(record))
}

/// GET /api/v1/sessions/:id/plan/export?format=txt|md
///
/// Serves the current plan as a file attachment. The body is the plan text unchanged.
pub async fn handle_export_plan(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let format = query
        .format
        .as_deref()
        .map(str::parse::<ExportFormat>)
        .transpose()?
        .unwrap_or_default();
    let record = current_record(&state, session_id).await?;
    let file = export_plan(&record.plan, format);

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, file.content_disposition()),
        ],
        file.body,
    )
        .into_response())
}

async fn current_record(state: &AppState, session_id: Uuid) -> Result<PlanRecord, AppError> {
    let session = state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| session_not_found(session_id))?;
    session.current_plan().await.ok_or_else(|| {
        AppError::NotFound(format!("Session {session_id} has no learning plan yet"))
    })
}

fn session_not_found(session_id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {session_id} not found"))
}
