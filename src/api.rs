use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{Html as HtmlResponse, IntoResponse},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::{
    app_state::AppState,
    controller::lock_session,
    demo::DemoReport,
    errors::{ClientError, ExportError, SubmitError},
    evidence::EvidenceFilter,
    render::{company_cards::CompanySort, page::render_dashboard_page, taxonomy::MindmapView},
    request::ScreenerForm,
    tabs::Tab,
    validators::{render_date_range_error, validate_date_range},
};

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({"error": message.into()})))
}

// --- Parámetros de consulta ---

#[derive(Deserialize, Default)]
pub struct TokenQuery {
    token: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct DateRangeQuery {
    start_date: Option<String>,
    end_date: Option<String>,
    frequency: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct CompaniesQuery {
    sort: Option<String>,
    search: Option<String>,
}

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/watchlists", get(watchlists_handler))
        .route("/api/validate-dates", get(validate_dates_handler))
        .route("/api/form-schema", get(form_schema_handler))
        .route("/api/screener", post(submit_handler))
        .route("/api/state", get(state_handler))
        .route("/api/cancel", post(cancel_handler))
        .route("/api/requests/:request_id/load", post(load_request_handler))
        .route("/api/demo/:name", post(demo_handler))
        .route("/api/tabs/:tab", get(tab_panel_handler))
        .route("/api/tabs/:tab/activate", post(activate_tab_handler))
        .route("/api/companies", get(companies_handler))
        .route("/api/companies/:company/focus", post(company_focus_handler))
        .route("/api/mindmap/:view", post(mindmap_handler))
        .route("/api/evidence", get(evidence_handler))
        .route("/api/evidence/page/:delta", post(evidence_page_handler))
        .route("/api/evidence/clear", post(evidence_clear_handler))
        .route("/api/evidence/export/:format", get(evidence_export_handler))
        .route("/api/documents/:document_id", get(document_handler))
        .route("/api/themes/:theme/focus", post(theme_focus_handler))
        .route("/api/report", get(report_handler))
        .route("/api/shutdown", post(shutdown_handler))
        .with_state(app_state)
}

fn panel(state: &AppState, tab: Tab) -> HtmlResponse<String> {
    let session = lock_session(&state.session);
    HtmlResponse(session.tabs().render_panel(tab).into_string())
}

// --- Handlers ---

#[axum::debug_handler]
async fn index_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> HtmlResponse<String> {
    let session = lock_session(&state.session);
    HtmlResponse(render_dashboard_page(&session, query.token.as_deref()).into_string())
}

#[axum::debug_handler]
async fn watchlists_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = lock_session(&state.session);
    Json(json!(session.watchlists()))
}

#[axum::debug_handler]
async fn validate_dates_handler(Query(query): Query<DateRangeQuery>) -> Json<Value> {
    let validation = validate_date_range(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        query.frequency.as_deref(),
    );
    let html = render_date_range_error(&validation).into_string();
    Json(json!({
        "is_valid": validation.is_valid,
        "message": validation.message,
        "html": html,
    }))
}

/// Esquema JSON del cuerpo de `POST /api/screener`.
#[axum::debug_handler]
async fn form_schema_handler() -> Json<Value> {
    Json(json!(schemars::schema_for!(ScreenerForm)))
}

#[axum::debug_handler]
async fn submit_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    Json(form): Json<ScreenerForm>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.token(query.token);
    match state.controller.submit(form, token).await {
        Ok(request_id) => Ok((StatusCode::ACCEPTED, Json(json!({ "request_id": request_id })))),
        Err(err) => {
            let status = match &err {
                SubmitError::Backend(ClientError::Validation(_)) => StatusCode::BAD_REQUEST,
                SubmitError::Backend(_) => StatusCode::BAD_GATEWAY,
                SubmitError::Superseded => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            };
            Err(api_error(status, err.to_string()))
        }
    }
}

#[axum::debug_handler]
async fn state_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = lock_session(&state.session).snapshot();
    Json(snapshot)
}

#[axum::debug_handler]
async fn cancel_handler(State(state): State<AppState>) -> impl IntoResponse {
    let cancelled = state.controller.cancel();
    Json(json!({ "cancelled": cancelled }))
}

#[axum::debug_handler]
async fn load_request_handler(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.token(query.token);
    let status = state
        .controller
        .load_request(&request_id, token.as_deref())
        .await
        .map_err(|e| api_error(StatusCode::BAD_GATEWAY, e.to_string()))?;
    Ok(Json(json!({ "request_id": request_id, "status": status.status })))
}

#[axum::debug_handler]
async fn demo_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let demo: DemoReport = name
        .parse()
        .map_err(|e: String| api_error(StatusCode::NOT_FOUND, e))?;
    state
        .controller
        .load_demo(demo)
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;
    Ok(Json(json!({ "demo": demo.slug() })))
}

fn parse_tab(tab: &str) -> Result<Tab, ApiError> {
    tab.parse().map_err(|e: String| api_error(StatusCode::NOT_FOUND, e))
}

#[axum::debug_handler]
async fn tab_panel_handler(
    State(state): State<AppState>,
    Path(tab): Path<String>,
) -> Result<HtmlResponse<String>, ApiError> {
    let tab = parse_tab(&tab)?;
    Ok(panel(&state, tab))
}

#[axum::debug_handler]
async fn activate_tab_handler(
    State(state): State<AppState>,
    Path(tab): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tab = parse_tab(&tab)?;
    lock_session(&state.session).switch_tab(tab);
    Ok(Json(json!({ "active_tab": tab })))
}

#[axum::debug_handler]
async fn companies_handler(
    State(state): State<AppState>,
    Query(query): Query<CompaniesQuery>,
) -> Result<HtmlResponse<String>, ApiError> {
    let sort = match query.sort.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<CompanySort>()
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?,
        None => CompanySort::default(),
    };
    {
        let mut session = lock_session(&state.session);
        session.sort_companies(sort);
        session.search_companies(query.search.as_deref().unwrap_or(""));
    }
    Ok(panel(&state, Tab::Companies))
}

#[axum::debug_handler]
async fn company_focus_handler(
    State(state): State<AppState>,
    Path(company): Path<String>,
) -> impl IntoResponse {
    lock_session(&state.session).focus_company(&company);
    Json(json!({ "active_tab": Tab::Companies, "company": company }))
}

#[axum::debug_handler]
async fn mindmap_handler(
    State(state): State<AppState>,
    Path(view): Path<String>,
) -> Result<HtmlResponse<String>, ApiError> {
    let view: MindmapView = view
        .parse()
        .map_err(|e: String| api_error(StatusCode::NOT_FOUND, e))?;
    lock_session(&state.session).switch_mindmap_view(view);
    Ok(panel(&state, Tab::Mindmap))
}

#[axum::debug_handler]
async fn evidence_handler(
    State(state): State<AppState>,
    Query(filter): Query<EvidenceFilter>,
) -> HtmlResponse<String> {
    lock_session(&state.session).apply_evidence_filters(filter);
    panel(&state, Tab::Evidence)
}

#[axum::debug_handler]
async fn evidence_page_handler(
    State(state): State<AppState>,
    Path(delta): Path<i64>,
) -> HtmlResponse<String> {
    lock_session(&state.session).change_evidence_page(delta);
    panel(&state, Tab::Evidence)
}

#[axum::debug_handler]
async fn evidence_clear_handler(State(state): State<AppState>) -> HtmlResponse<String> {
    lock_session(&state.session).clear_evidence_filters();
    panel(&state, Tab::Evidence)
}

#[axum::debug_handler]
async fn evidence_export_handler(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = lock_session(&state.session);
    let (body, content_type, file_name) = match format.as_str() {
        "csv" => (session.evidence().export_csv(), "text/csv; charset=utf-8", "evidence_export.csv"),
        "json" => (session.evidence().export_json(), "application/json", "evidence_export.json"),
        other => {
            return Err(api_error(
                StatusCode::NOT_FOUND,
                format!("Formato de exportación desconocido: {other}"),
            ))
        }
    };
    let body = body.map_err(|e| match e {
        ExportError::Empty => api_error(StatusCode::NOT_FOUND, e.to_string()),
        ExportError::Encode(_) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    })?;
    info!(format = %format, bytes = body.len(), "evidence exported");
    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
        ],
        body,
    ))
}

#[axum::debug_handler]
async fn document_handler(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> HtmlResponse<String> {
    let session = lock_session(&state.session);
    HtmlResponse(session.document_details(&document_id).into_string())
}

#[axum::debug_handler]
async fn theme_focus_handler(
    State(state): State<AppState>,
    Path(theme): Path<String>,
) -> impl IntoResponse {
    lock_session(&state.session).filter_by_theme(&theme);
    Json(json!({ "active_tab": Tab::Evidence, "theme": theme }))
}

#[axum::debug_handler]
async fn report_handler(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let session = lock_session(&state.session);
    match session.last_report() {
        Some(report) => Ok(Json(json!(report.as_ref()))),
        None => Err(api_error(StatusCode::NOT_FOUND, "No report loaded")),
    }
}

#[axum::debug_handler]
async fn shutdown_handler(State(state): State<AppState>) -> impl IntoResponse {
    info!("Petición de apagado recibida.");
    let sender = state
        .shutdown_sender
        .lock()
        .unwrap_or_else(|p| p.into_inner())
        .take();
    match sender {
        Some(sender) => {
            let _ = sender.send(());
        }
        None => warn!("El apagado ya estaba en curso."),
    }
    StatusCode::OK
}
