use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use shuttle_axum::axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::ingest::normalize::normalize_batch_now;
use crate::ingest::types::{Article, RawArticle};
use crate::rank;
use crate::store::{SubjectStore, STORE_TTL};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubjectStore>,
    /// Bearer secret for the push API. `None` means pushes are rejected.
    pub push_token: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn SubjectStore>, push_token: Option<String>) -> Self {
        Self { store, push_token }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/news", get(read_subjects))
        .route("/news/{subject}", post(push_items))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(serde_json::json!({ "error": message })))
}

/// GET /news?subjects=a,b — each requested subject mapped to its ranked set
/// (empty array when nothing is stored).
async fn read_subjects(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<BTreeMap<String, Vec<Article>>>, ApiError> {
    let subjects: Vec<String> = q
        .get("subjects")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if subjects.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "missing 'subjects' query parameter",
        ));
    }

    let mut out = BTreeMap::new();
    for subject in subjects {
        let items = state
            .store
            .load(&subject)
            .await
            .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, "store read failed"))?;
        out.insert(subject, items);
    }
    Ok(Json(out))
}

#[derive(serde::Serialize)]
struct PushResp {
    subject: String,
    count: usize,
}

/// POST /news/{subject} — authenticated push of raw item bags; responds with
/// the size of the resulting ranked set.
async fn push_items(
    State(state): State<AppState>,
    Path(subject): Path<String>,
    headers: HeaderMap,
    Json(raw): Json<Vec<RawArticle>>,
) -> Result<Json<PushResp>, ApiError> {
    check_bearer(&headers, state.push_token.as_deref())?;

    let batch = normalize_batch_now(raw);
    let existing = state
        .store
        .load(&subject)
        .await
        .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, "store read failed"))?;
    let ranked = rank::merge(batch, existing);
    state
        .store
        .save(&subject, &ranked, STORE_TTL)
        .await
        .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, "store write failed"))?;

    Ok(Json(PushResp {
        count: ranked.len(),
        subject,
    }))
}

fn check_bearer(headers: &HeaderMap, expected: Option<&str>) -> Result<(), ApiError> {
    let Some(expected) = expected else {
        return Err(api_error(StatusCode::UNAUTHORIZED, "push disabled: no token configured"));
    };
    let supplied = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    if supplied != expected {
        return Err(api_error(StatusCode::UNAUTHORIZED, "invalid bearer token"));
    }
    Ok(())
}
