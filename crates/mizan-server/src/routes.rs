use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use mizan_core::{
    risk::assess_risk,
    types::{CallerIdentity, CaseAssessmentInput},
    AssessError,
};
use mizan_legal::{advisor, drafting, resolve_language, search};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::AppState;

// ── Error helpers ─────────────────────────────────────────────────────────

pub(crate) fn internal(e: impl std::fmt::Display) -> StatusCode {
    tracing::error!("internal error: {e}");
    StatusCode::INTERNAL_SERVER_ERROR
}

/// REST status for a domain error.
pub(crate) fn status_for(e: AssessError) -> StatusCode {
    match e {
        AssessError::Authentication => StatusCode::UNAUTHORIZED,
        AssessError::Forbidden => StatusCode::FORBIDDEN,
        AssessError::NotFound => StatusCode::NOT_FOUND,
        AssessError::MalformedInput(_) => StatusCode::BAD_REQUEST,
        AssessError::Persistence(msg) => internal(msg),
    }
}

/// Error from a `/functions` endpoint: always HTTP 400 with `{ "error": msg }`.
#[derive(Debug)]
pub(crate) struct FunctionError(pub String);

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": self.0 }))).into_response()
    }
}

impl From<AssessError> for FunctionError {
    fn from(e: AssessError) -> Self {
        Self(e.to_string())
    }
}

impl From<anyhow::Error> for FunctionError {
    fn from(e: anyhow::Error) -> Self {
        Self(e.to_string())
    }
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, FunctionError> {
    serde_json::from_slice(body).map_err(|e| FunctionError(format!("Invalid request body: {e}")))
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<CallerIdentity, AssessError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    state.auth.authenticate(header).await
}

async fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<CallerIdentity, StatusCode> {
    let caller = authenticate(state, headers).await.map_err(status_for)?;
    if !caller.is_admin() {
        tracing::warn!(user = %caller.user_id, "non-admin denied");
        return Err(status_for(AssessError::Forbidden));
    }
    Ok(caller)
}

/// Audit writes never fail the request that triggered them.
fn audit(state: &AppState, actor: &str, action: &str, detail: &str) {
    if let Err(e) = state.db.log_event(actor, action, detail) {
        tracing::warn!("audit log write failed for {action}: {e}");
    }
}

// ── Request body types ────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RiskAssessmentBody {
    pub case_id: String,
    pub assessment_data: Value,
}

#[derive(Deserialize)]
pub(crate) struct DraftDocumentBody {
    pub template: String,
    pub language: Option<String>,
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

#[derive(Deserialize)]
pub(crate) struct AdvisorBody {
    pub message: String,
    pub language: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct AssessmentsQuery {
    pub case_id: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct LawSearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub(crate) struct LimitQuery {
    pub limit: Option<i64>,
}

// ── Settings constants ────────────────────────────────────────────────────

pub(crate) const SETTINGS_DEFAULTS: &[(&str, &str)] = &[
    ("session_timeout_mins", "60"),
    ("max_login_attempts", "5"),
    ("require_two_factor", "false"),
    ("audit_retention_days", "90"),
];

const BOOL_SETTINGS: &[&str] = &["require_two_factor"];

const LOG_KEEPALIVE: Duration = Duration::from_secs(15);

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "status": "ok", "uptime_s": state.start_time.elapsed().as_secs() }))
}

// Functions

pub(crate) async fn risk_assessment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, FunctionError> {
    let caller = authenticate(&state, &headers).await?;
    let body: RiskAssessmentBody = parse_body(&body)?;
    let case_id = body.case_id.trim();
    if case_id.is_empty() {
        return Err(AssessError::malformed("`caseId` is required").into());
    }

    let input = CaseAssessmentInput::from_json(body.assessment_data)?;
    let result = assess_risk(&input, &caller)?;
    let stored = state
        .db
        .insert_assessment(&caller.user_id, case_id, &input, &result)
        .map_err(AssessError::persistence)?;

    audit(
        &state,
        &caller.user_id,
        "risk_assessment.stored",
        &format!("case={case_id} id={} score={}", stored.id, stored.risk_score),
    );
    tracing::info!(
        user = %caller.user_id,
        case = case_id,
        id = stored.id,
        score = stored.risk_score,
        "risk assessment stored"
    );
    Ok(Json(json!({ "success": true, "assessment": stored })))
}

pub(crate) async fn draft_document(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, FunctionError> {
    let caller = authenticate(&state, &headers).await?;
    let body: DraftDocumentBody = parse_body(&body)?;
    let language = resolve_language(body.language.as_deref(), state.config.default_language);
    let document = drafting::draft_document(body.template.trim(), language, &body.fields)?;
    audit(
        &state,
        &caller.user_id,
        "document.drafted",
        &format!("template={} language={}", document.template, language.code()),
    );
    Ok(Json(json!({ "success": true, "document": document })))
}

pub(crate) async fn ocr(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, FunctionError> {
    let caller = authenticate(&state, &headers).await?;
    let output = state.ocr.extract_text(&body).await?;
    tracing::info!(user = %caller.user_id, bytes = body.len(), "document text extracted");
    Ok(Json(json!({
        "success": true,
        "text": output.text,
        "confidence": output.confidence,
    })))
}

pub(crate) async fn legal_advisor(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, FunctionError> {
    let body: AdvisorBody = parse_body(&body)?;
    let language = resolve_language(body.language.as_deref(), state.config.default_language);
    let reply = advisor::reply(&body.message, language)?;
    Ok(Json(json!({
        "success": true,
        "response": reply.response,
        "disclaimer": reply.disclaimer,
    })))
}

// Assessments

pub(crate) async fn list_assessments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<AssessmentsQuery>,
) -> Result<Json<Value>, StatusCode> {
    let caller = authenticate(&state, &headers).await.map_err(status_for)?;
    let assessments = state
        .db
        .list_assessments(&caller.user_id, q.case_id.as_deref())
        .map_err(internal)?;
    Ok(Json(json!({ "assessments": assessments })))
}

pub(crate) async fn get_assessment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, StatusCode> {
    let caller = authenticate(&state, &headers).await.map_err(status_for)?;
    match state.db.get_assessment(id).map_err(internal)? {
        Some(a) if a.user_id == caller.user_id => Ok(Json(json!(a))),
        _ => Err(status_for(AssessError::NotFound)),
    }
}

// Laws

pub(crate) async fn search_laws(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LawSearchQuery>,
) -> Result<Json<Value>, StatusCode> {
    let query = q.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let laws = search::search_laws(&state.db, &query, q.category.as_deref(), q.limit)
        .map_err(internal)?;
    Ok(Json(json!({ "count": laws.len(), "laws": laws })))
}

// Audit

pub(crate) async fn get_audit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<LimitQuery>,
) -> Result<Json<Value>, StatusCode> {
    require_admin(&state, &headers).await?;
    let events = state
        .db
        .recent_events(q.limit.unwrap_or(100))
        .map_err(internal)?;
    Ok(Json(json!({ "events": events })))
}

// Settings

pub(crate) async fn get_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    require_admin(&state, &headers).await?;
    let mut obj = serde_json::Map::new();
    for (key, default) in SETTINGS_DEFAULTS {
        let val = state.db.get_config(key).map_err(internal)?;
        let s = val.as_deref().unwrap_or(*default);
        let json_val = if BOOL_SETTINGS.contains(key) {
            json!(s == "true")
        } else {
            s.parse::<i64>().map(|n| json!(n)).unwrap_or(json!(s))
        };
        obj.insert(key.to_string(), json_val);
    }
    Ok(Json(Value::Object(obj)))
}

/// Normalise a settings value to its stored text form, or `None` if it
/// does not fit the key's type.
fn setting_value(key: &str, val: &Value) -> Option<String> {
    if BOOL_SETTINGS.contains(&key) {
        return match val {
            Value::Bool(b) => Some(b.to_string()),
            Value::String(s) => s.trim().parse::<bool>().ok().map(|b| b.to_string()),
            _ => None,
        };
    }
    match val {
        Value::Number(n) => n.as_i64().map(|n| n.to_string()),
        Value::String(s) => s.trim().parse::<i64>().ok().map(|n| n.to_string()),
        _ => None,
    }
}

pub(crate) async fn put_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, StatusCode> {
    let caller = require_admin(&state, &headers).await?;
    let body: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!("rejected settings body: {e}");
        StatusCode::BAD_REQUEST
    })?;
    let map = body.as_object().ok_or(StatusCode::BAD_REQUEST)?;

    // Validate everything before writing anything.
    let mut pending = Vec::new();
    for (key, val) in map {
        if !SETTINGS_DEFAULTS.iter().any(|(k, _)| k == key) {
            continue;
        }
        let Some(value) = setting_value(key, val) else {
            tracing::warn!("rejected value for setting {key}: {val}");
            return Err(StatusCode::BAD_REQUEST);
        };
        pending.push((key.as_str(), value));
    }

    for (key, value) in &pending {
        state.db.set_config(key, value).map_err(internal)?;
    }
    if !pending.is_empty() {
        let detail: Vec<String> = pending.iter().map(|(k, v)| format!("{k}={v}")).collect();
        audit(&state, &caller.user_id, "settings.updated", &detail.join(" "));
    }
    Ok(Json(json!({ "updated": pending.len() })))
}

// Log stream: ring buffer history first, then live lines. Lagged receivers
// skip what they missed.

pub(crate) async fn sse_logs(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    require_admin(&state, &headers).await?;
    let live = BroadcastStream::new(state.log_tx.subscribe()).filter_map(Result::ok);
    let history: Vec<String> = state
        .log_ring
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .cloned()
        .collect();
    tracing::debug!(replayed = history.len(), "log stream opened");

    let stream = tokio_stream::iter(history)
        .chain(live)
        .map(|line| Ok(Event::default().data(line)));
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(LOG_KEEPALIVE).text("ping")))
}
