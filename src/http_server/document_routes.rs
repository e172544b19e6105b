//! Document HTTP Routes
//!
//! Create, read and update live documents. Updates go through the
//! versioning service, so every effective change lands in history.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::errors::{ApiError, ApiResult};
use crate::documents::Document;
use crate::versioning::{
    DocumentId, DocumentState, UpdateOutcome, UserId, Version, VersionResult, VersionService,
    Visibility,
};

/// Header naming the acting user
pub const USER_HEADER: &str = "x-user-id";

// ==================
// Request/Response Types
// ==================

/// Full tracked state of a document
#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub visibility: Visibility,
}

impl From<DocumentRequest> for DocumentState {
    fn from(request: DocumentRequest) -> Self {
        DocumentState::new(request.title, request.content, request.visibility)
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedDocumentResponse {
    pub document: Document,
    pub version: Version,
}

// ==================
// Document Routes
// ==================

pub fn document_routes(service: Arc<VersionService>) -> Router {
    Router::new()
        .route("/documents", post(create_document_handler))
        .route(
            "/documents/:id",
            get(get_document_handler).put(update_document_handler),
        )
        .with_state(service)
}

// ==================
// Helper Functions
// ==================

/// Reads the acting user from `X-User-Id`.
pub(crate) fn acting_user(headers: &HeaderMap) -> ApiResult<UserId> {
    let raw = headers
        .get(USER_HEADER)
        .ok_or(ApiError::MissingUser)?
        .to_str()
        .map_err(|_| ApiError::InvalidUser("not valid ASCII".to_string()))?;
    UserId::parse(raw.trim()).map_err(|e| ApiError::InvalidUser(e.to_string()))
}

pub(crate) fn parse_document_id(raw: &str) -> ApiResult<DocumentId> {
    DocumentId::parse(raw).map_err(|_| ApiError::invalid_param("id", raw))
}

/// Runs a service call on the blocking pool; writes hold a document lock
/// and fsync the log.
pub(crate) async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> VersionResult<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

// ==================
// Handlers
// ==================

async fn create_document_handler(
    State(service): State<Arc<VersionService>>,
    headers: HeaderMap,
    payload: Result<Json<DocumentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedDocumentResponse>)> {
    let user = acting_user(&headers)?;
    let Json(request) = payload?;
    let committed = run_blocking(move || service.create_document(request.into(), user)).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedDocumentResponse {
            document: committed.document,
            version: committed.version,
        }),
    ))
}

async fn get_document_handler(
    State(service): State<Arc<VersionService>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Document>> {
    let id = parse_document_id(&id)?;
    Ok(Json(run_blocking(move || service.get_document(id)).await?))
}

async fn update_document_handler(
    State(service): State<Arc<VersionService>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<DocumentRequest>, JsonRejection>,
) -> ApiResult<Json<UpdateOutcome>> {
    let user = acting_user(&headers)?;
    let id = parse_document_id(&id)?;
    let Json(request) = payload?;
    let outcome = run_blocking(move || service.update_document(id, request.into(), user)).await?;
    Ok(Json(outcome))
}
