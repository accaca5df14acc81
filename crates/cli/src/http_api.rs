use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use docvec_service::{DocumentService, Payload, SearchOutcome, ServiceError, UploadedFile};
use docvec_vector_store::StoreStats;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Multipart field carrying uploaded documents
pub const UPLOAD_FIELD: &str = "files";
const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

#[derive(Clone)]
struct HttpState {
    service: DocumentService,
}

/// Error body in the `{"detail": ...}` shape clients already parse
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
}

pub fn build_router(service: DocumentService) -> Router {
    let state = Arc::new(HttpState { service });
    Router::new()
        .route("/", get(http_health))
        .route("/api/v1/upload", post(http_upload))
        .route("/api/v1/search", post(http_search))
        .route("/api/v1/stats", get(http_stats))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .with_state(state)
}

async fn http_health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

async fn http_upload(
    State(state): State<Arc<HttpState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(format!("Malformed upload: {err}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::bad_request(format!("Failed to read {name}: {err}")))?;
        let payload = Payload::from_upload(&name, content_type.as_deref(), bytes.to_vec());
        files.push(UploadedFile { name, payload });
    }

    match state.service.ingest_batch(files).await {
        Ok(report) => {
            log::info!("{}", report.message);
            Ok(Json(report).into_response())
        }
        Err(ServiceError::NoFiles) => Err(ApiError::bad_request(ServiceError::NoFiles.to_string())),
        Err(err) => {
            log::error!("Upload failed: {err}");
            Err(ApiError::internal(err.to_string()))
        }
    }
}

async fn http_search(
    State(state): State<Arc<HttpState>>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    match state.service.search(&params.query).await {
        Ok(SearchOutcome::NotReady) => Err(ApiError::bad_request(
            "Index not initialized. Upload some data first.",
        )),
        Ok(SearchOutcome::Hits(hits)) if hits.is_empty() => {
            Ok(Json(json!({ "message": "No matching records found" })).into_response())
        }
        Ok(SearchOutcome::Hits(hits)) => Ok(Json(json!({ "results": hits })).into_response()),
        Err(ServiceError::EmptyQuery) => {
            Err(ApiError::bad_request(ServiceError::EmptyQuery.to_string()))
        }
        Err(err) => {
            log::error!("Search failed: {err}");
            Err(ApiError::internal(format!("Search failed: {err}")))
        }
    }
}

async fn http_stats(State(state): State<Arc<HttpState>>) -> Json<StoreStats> {
    Json(state.service.stats().await)
}
