//! API route definitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::state::AppState;
use crate::quality::{selector, NetworkQualitySample};
use crate::storage;
use crate::timetable::conflict::{self, ConflictKind};
use crate::timetable::import::plan_import;
use crate::timetable::{EntryDraft, ValidationError};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/timetable/entries", get(list_entries).post(create_entry))
        .route("/timetable/entries/{id}", delete(remove_entry))
        .route("/timetable/check", post(check_entry))
        .route("/timetable/import", post(import_entries))
        .route("/quality/recommend", post(recommend))
        .route("/quality/samples/latest", get(latest_sample))
}

/// Handler error type. Validation problems surface as 422 with the
/// field-level message; everything else is a logged 500.
enum ApiError {
    Invalid(ValidationError),
    Internal(anyhow::Error),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Invalid(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Invalid(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
            ApiError::Internal(e) => {
                tracing::error!("API error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal error" })),
                )
                    .into_response()
            }
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        },
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

async fn list_entries(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let entries = storage::list_entries(&state.pool)?;
    let total = entries.len();
    Ok(Json(json!({ "data": entries, "meta": { "total": total } })))
}

async fn create_entry(
    State(state): State<AppState>,
    Json(draft): Json<EntryDraft>,
) -> Result<Response, ApiError> {
    let entry = draft.into_entry()?;

    let existing = storage::entries_for_instructor(&state.pool, &entry.instructor_id)?;
    let conflicts = conflict::detect_conflicts(&entry, &existing, None, &state.config.conflict);

    storage::insert_entry(&state.pool, &entry)?;
    storage::log_conflicts(&state.pool, "create", conflicts.iter())?;

    let hard = conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::Hard)
        .count();
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "data": entry,
            "meta": { "conflicts": conflicts, "hard": hard }
        })),
    )
        .into_response())
}

async fn remove_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    if storage::remove_entry(&state.pool, &id)? {
        Ok(Json(json!({ "data": { "removed": id } })).into_response())
    } else {
        Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("entry '{}' not found", id) })),
        )
            .into_response())
    }
}

#[derive(Deserialize)]
struct CheckRequest {
    #[serde(flatten)]
    draft: EntryDraft,
    /// Entry id to ignore, for the edit flow.
    #[serde(default)]
    exclude_id: Option<String>,
}

async fn check_entry(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<Value>, ApiError> {
    let proposed = req.draft.into_entry()?;

    let existing = storage::entries_for_instructor(&state.pool, &proposed.instructor_id)?;
    let conflicts = conflict::detect_conflicts(
        &proposed,
        &existing,
        req.exclude_id.as_deref(),
        &state.config.conflict,
    );
    storage::log_conflicts(&state.pool, "check", conflicts.iter())?;

    let hard = conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::Hard)
        .count();
    let total = conflicts.len();
    Ok(Json(json!({
        "data": conflicts,
        "meta": { "total": total, "hard": hard }
    })))
}

async fn import_entries(
    State(state): State<AppState>,
    Json(rows): Json<Vec<EntryDraft>>,
) -> Result<Json<Value>, ApiError> {
    let existing = storage::schedules_for_instructors(
        &state.pool,
        rows.iter().map(|r| r.instructor_id.as_str()),
    )?;

    let plan = plan_import(rows, &existing, &state.config.conflict);

    let mut imported = Vec::new();
    for entry in &plan.accepted {
        storage::insert_entry(&state.pool, entry)?;
        imported.push(entry.id.clone());
    }
    storage::log_conflicts(&state.pool, "import", plan.conflicts.values().flatten())?;

    let imported_count = imported.len();
    let skipped_count = plan.skipped.len();
    Ok(Json(json!({
        "data": {
            "imported": imported,
            "skipped": plan.skipped,
            "conflicts": plan.conflicts
        },
        "meta": {
            "imported": imported_count,
            "skipped": skipped_count
        }
    })))
}

async fn recommend(
    State(state): State<AppState>,
    Json(sample): Json<NetworkQualitySample>,
) -> Result<Json<Value>, ApiError> {
    let tier = selector::recommend_quality(
        sample.effective_bandwidth_mbps,
        sample.save_data_enabled,
        &state.config.quality.ladder,
    );
    // The client submitted the raw signal itself; absence means the
    // signal was absent, not that the client lacks the API.
    let category = selector::classify_connection_type(sample.connection_type_raw.as_deref());

    storage::save_sample(&state.pool, &sample, category, tier, "api")?;

    Ok(Json(json!({
        "data": { "tier": tier, "category": category },
        "meta": {
            "bandwidth_mbps": sample.effective_bandwidth_mbps,
            "save_data": sample.save_data_enabled
        }
    })))
}

async fn latest_sample(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match storage::latest_sample(&state.pool)? {
        Some(sample) => Ok(Json(json!({ "data": sample }))),
        None => Ok(Json(
            json!({ "data": null, "meta": { "message": "no samples recorded yet" } }),
        )),
    }
}
