//! API routes for tashd

use crate::server::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tash_common::checklist;
use tash_common::error::TashError;
use tash_common::matcher::{hydrate_candidates, match_narrative, MatchOutcome};
use tash_common::materializer::materialize;
use tash_common::schema::{
    ChecklistMutation, ConsultRequest, ConsultResponse, ConsultationCase, CreateCaseRequest,
    HealthResponse, NextSteps, ProgressResponse, RequestTemplate, Soldier, StatusChange, Track,
};
use tracing::{info, warn};

type AppStateArc = Arc<AppState>;

/// Map a store/core error onto an HTTP response.
fn error_response(e: TashError) -> (StatusCode, String) {
    let status = match &e {
        TashError::NotFound(_) => StatusCode::NOT_FOUND,
        TashError::Conflict { .. } => StatusCode::CONFLICT,
        TashError::Invalid(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    let templates_available = state.store.list_templates().map(|t| t.len()).unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        templates_available,
        provider_configured: state.provider.is_some(),
    })
}

// ============================================================================
// Consult Routes
// ============================================================================

pub fn consult_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/consult", post(consult))
}

/// Match a narrative against the template catalog. Degrades to an empty
/// suggestion list on any provider or parse failure; the caller falls back to
/// manual selection.
async fn consult(
    State(state): State<AppStateArc>,
    Json(req): Json<ConsultRequest>,
) -> Result<Json<ConsultResponse>, (StatusCode, String)> {
    if req.text.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No text provided".to_string()));
    }

    info!("[Q]  Consult: {}", req.text);
    let corpus = state.store.list_templates().map_err(error_response)?;

    let outcome = match &state.provider {
        Some(provider) => {
            match_narrative(
                provider.as_ref(),
                &state.rules,
                &req.text,
                req.soldier_profile.as_ref(),
                &corpus,
            )
            .await
        }
        None => {
            warn!("Consult requested but no provider is configured");
            MatchOutcome {
                raw_output: "provider not configured".to_string(),
                ..Default::default()
            }
        }
    };

    let suggestions = hydrate_candidates(&outcome.candidate_ids, &corpus);
    info!("[A]  {} suggestion(s)", suggestions.len());

    let next_steps = (!outcome.soldier_needs.is_empty() || !outcome.mashak_needs.is_empty())
        .then(|| NextSteps {
            soldier_needs: outcome.soldier_needs,
            mashak_needs: outcome.mashak_needs,
        });

    Ok(Json(ConsultResponse {
        suggestions,
        explanation: (!outcome.rationale.is_empty()).then_some(outcome.rationale),
        next_steps,
        raw_response: (!outcome.raw_output.is_empty()).then_some(outcome.raw_output),
    }))
}

// ============================================================================
// Template Routes
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

pub fn template_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/templates", get(list_templates))
        .route("/v1/templates/search", get(search_templates))
        .route("/v1/templates/:id", get(get_template))
        .route("/v1/templates/:id", put(upsert_template))
        .route("/v1/templates/:id", delete(delete_template))
}

async fn list_templates(
    State(state): State<AppStateArc>,
) -> Result<Json<Vec<RequestTemplate>>, (StatusCode, String)> {
    state
        .store
        .list_templates()
        .map(Json)
        .map_err(error_response)
}

async fn search_templates(
    State(state): State<AppStateArc>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<RequestTemplate>>, (StatusCode, String)> {
    state
        .store
        .search_templates(&params.q)
        .map(Json)
        .map_err(error_response)
}

async fn get_template(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> Result<Json<RequestTemplate>, (StatusCode, String)> {
    match state.store.get_template(&id).map_err(error_response)? {
        Some(template) => Ok(Json(template)),
        None => Err((StatusCode::NOT_FOUND, format!("Template '{}' not found", id))),
    }
}

async fn upsert_template(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    Json(template): Json<RequestTemplate>,
) -> Result<Json<RequestTemplate>, (StatusCode, String)> {
    if template.id != id {
        return Err((
            StatusCode::BAD_REQUEST,
            "Template id in body does not match path".to_string(),
        ));
    }
    state
        .store
        .upsert_template(&template)
        .map_err(error_response)?;
    // Return the stored version so the caller sees the stamped timestamp.
    match state.store.get_template(&id).map_err(error_response)? {
        Some(stored) => Ok(Json(stored)),
        None => Err((StatusCode::INTERNAL_SERVER_ERROR, "write lost".to_string())),
    }
}

async fn delete_template(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    if state.store.delete_template(&id).map_err(error_response)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, format!("Template '{}' not found", id)))
    }
}

// ============================================================================
// Case Routes
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseListParams {
    #[serde(default)]
    pub soldier_id: Option<String>,
    #[serde(default)]
    pub active_only: bool,
    #[serde(default = "default_case_limit")]
    pub limit: usize,
}

fn default_case_limit() -> usize {
    50
}

pub fn case_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/cases", post(create_case))
        .route("/v1/cases", get(list_cases))
        .route("/v1/cases/:id", get(get_case))
        .route("/v1/cases/:id/status", post(set_case_status))
        .route("/v1/cases/:id/checklist/toggle", post(toggle_item))
        .route("/v1/cases/:id/checklist/add", post(add_item))
        .route("/v1/cases/:id/checklist/delete", post(delete_item))
        .route("/v1/cases/:id/progress", get(case_progress))
}

async fn create_case(
    State(state): State<AppStateArc>,
    Json(req): Json<CreateCaseRequest>,
) -> Result<(StatusCode, Json<ConsultationCase>), (StatusCode, String)> {
    let template = state
        .store
        .get_template(&req.template_id)
        .map_err(error_response)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("Template '{}' not found", req.template_id),
            )
        })?;

    // Resolve the display name: explicit override, then the registry, then
    // the bare id.
    let soldier_name = match req.soldier_name {
        Some(name) => name,
        None => state
            .store
            .get_soldier(&req.soldier_id)
            .map_err(error_response)?
            .map(|s| s.full_name)
            .unwrap_or_else(|| req.soldier_id.clone()),
    };

    let narrative = req
        .narrative
        .unwrap_or_else(|| "Opened manually (no consult)".to_string());

    let mut case = materialize(
        &template,
        &req.soldier_id,
        &soldier_name,
        &narrative,
        state.routing_policy,
    );
    case.ai_recommendation = req.explanation;

    // One atomic write; on failure no case handle is returned.
    state.store.create_case(&case).map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(case)))
}

async fn list_cases(
    State(state): State<AppStateArc>,
    Query(params): Query<CaseListParams>,
) -> Result<Json<Vec<ConsultationCase>>, (StatusCode, String)> {
    state
        .store
        .list_cases(params.soldier_id.as_deref(), params.active_only, params.limit)
        .map(Json)
        .map_err(error_response)
}

async fn get_case(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> Result<Json<ConsultationCase>, (StatusCode, String)> {
    fetch_case(&state, &id).map(Json)
}

fn fetch_case(state: &AppState, id: &str) -> Result<ConsultationCase, (StatusCode, String)> {
    match state.store.get_case(id).map_err(error_response)? {
        Some(case) => Ok(case),
        None => Err((StatusCode::NOT_FOUND, format!("Case '{}' not found", id))),
    }
}

/// Reject a mutation whose revision is already stale.
fn check_rev(case: &ConsultationCase, rev: u64) -> Result<(), (StatusCode, String)> {
    if case.rev != rev {
        return Err(error_response(TashError::Conflict {
            id: case.id.clone(),
            expected: rev,
            actual: case.rev,
        }));
    }
    Ok(())
}

async fn set_case_status(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    Json(req): Json<StatusChange>,
) -> Result<Json<ConsultationCase>, (StatusCode, String)> {
    let mut case = fetch_case(&state, &id)?;
    check_rev(&case, req.rev)?;
    case.status = req.status;
    state.store.save_case(&mut case).map_err(error_response)?;
    Ok(Json(case))
}

async fn toggle_item(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    Json(req): Json<ChecklistMutation>,
) -> Result<Json<ConsultationCase>, (StatusCode, String)> {
    let item_id = req
        .item_id
        .ok_or((StatusCode::BAD_REQUEST, "itemId is required".to_string()))?;

    let mut case = fetch_case(&state, &id)?;
    check_rev(&case, req.rev)?;

    // Unknown item: no-op per the checklist contract, nothing to persist.
    if checklist::toggle(&mut case, req.track, &item_id) {
        state.store.save_case(&mut case).map_err(error_response)?;
    }
    Ok(Json(case))
}

async fn add_item(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    Json(req): Json<ChecklistMutation>,
) -> Result<Json<ConsultationCase>, (StatusCode, String)> {
    let text = req
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or((StatusCode::BAD_REQUEST, "text is required".to_string()))?;

    let mut case = fetch_case(&state, &id)?;
    check_rev(&case, req.rev)?;

    checklist::add(&mut case, req.track, text.trim());
    state.store.save_case(&mut case).map_err(error_response)?;
    Ok(Json(case))
}

async fn delete_item(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    Json(req): Json<ChecklistMutation>,
) -> Result<Json<ConsultationCase>, (StatusCode, String)> {
    let item_id = req
        .item_id
        .ok_or((StatusCode::BAD_REQUEST, "itemId is required".to_string()))?;

    let mut case = fetch_case(&state, &id)?;
    check_rev(&case, req.rev)?;

    if checklist::delete(&mut case, req.track, &item_id) {
        state.store.save_case(&mut case).map_err(error_response)?;
    }
    Ok(Json(case))
}

async fn case_progress(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> Result<Json<ProgressResponse>, (StatusCode, String)> {
    let case = fetch_case(&state, &id)?;
    Ok(Json(ProgressResponse {
        soldier: checklist::progress(&case, Track::Soldier),
        mashak: checklist::progress(&case, Track::Mashak),
    }))
}

// ============================================================================
// Soldier Routes
// ============================================================================

pub fn soldier_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/soldiers", get(list_soldiers))
        .route("/v1/soldiers/:id", get(get_soldier))
        .route("/v1/soldiers/:id", put(upsert_soldier))
}

async fn list_soldiers(
    State(state): State<AppStateArc>,
) -> Result<Json<Vec<Soldier>>, (StatusCode, String)> {
    state.store.list_soldiers().map(Json).map_err(error_response)
}

async fn get_soldier(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> Result<Json<Soldier>, (StatusCode, String)> {
    match state.store.get_soldier(&id).map_err(error_response)? {
        Some(soldier) => Ok(Json(soldier)),
        None => Err((StatusCode::NOT_FOUND, format!("Soldier '{}' not found", id))),
    }
}

async fn upsert_soldier(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
    Json(soldier): Json<Soldier>,
) -> Result<Json<Soldier>, (StatusCode, String)> {
    if soldier.id != id {
        return Err((
            StatusCode::BAD_REQUEST,
            "Soldier id in body does not match path".to_string(),
        ));
    }
    state
        .store
        .upsert_soldier(&soldier)
        .map_err(error_response)?;
    match state.store.get_soldier(&id).map_err(error_response)? {
        Some(stored) => Ok(Json(stored)),
        None => Err((StatusCode::INTERNAL_SERVER_ERROR, "write lost".to_string())),
    }
}
