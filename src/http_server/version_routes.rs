//! Version HTTP Routes
//!
//! History listing, single-version fetch, comparison and restore.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::document_routes::{acting_user, parse_document_id, run_blocking};
use super::errors::{ApiError, ApiResult};
use crate::versioning::{DocumentId, HistoryEntry, RestoreOutcome, VersionDiff, VersionService};

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Default, Deserialize)]
pub struct ListVersionsQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    /// Only versions numbered below this one
    #[serde(default)]
    pub before: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionListResponse {
    pub document_id: DocumentId,
    pub versions: Vec<HistoryEntry>,
    /// Cursor for the next page; absent once version 1 has been returned
    pub next_before: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub from: u64,
    pub to: u64,
}

// ==================
// Version Routes
// ==================

pub fn version_routes(service: Arc<VersionService>) -> Router {
    Router::new()
        .route("/documents/:id/versions", get(list_versions_handler))
        // static segment wins over `:n`
        .route("/documents/:id/versions/compare", get(compare_versions_handler))
        .route("/documents/:id/versions/:n", get(get_version_handler))
        .route("/documents/:id/versions/:n/restore", post(restore_version_handler))
        .with_state(service)
}

fn parse_version_number(raw: &str) -> ApiResult<u64> {
    raw.parse::<u64>()
        .map_err(|_| ApiError::invalid_param("version", raw))
}

// ==================
// Handlers
// ==================

async fn list_versions_handler(
    State(service): State<Arc<VersionService>>,
    Path(id): Path<String>,
    query: Result<Query<ListVersionsQuery>, QueryRejection>,
) -> ApiResult<Json<VersionListResponse>> {
    let document_id = parse_document_id(&id)?;
    let Query(query) = query?;
    let versions = run_blocking(move || {
        service.list_versions_before(document_id, query.before, query.limit)
    })
    .await?;

    // numbering is gap-free, so a page ends early only at version 1
    let next_before = versions
        .last()
        .map(|entry| entry.version.number())
        .filter(|&n| n > 1);

    Ok(Json(VersionListResponse {
        document_id,
        versions,
        next_before,
    }))
}

async fn get_version_handler(
    State(service): State<Arc<VersionService>>,
    Path((id, n)): Path<(String, String)>,
) -> ApiResult<Json<HistoryEntry>> {
    let document_id = parse_document_id(&id)?;
    let number = parse_version_number(&n)?;
    Ok(Json(run_blocking(move || service.get_version(document_id, number)).await?))
}

async fn compare_versions_handler(
    State(service): State<Arc<VersionService>>,
    Path(id): Path<String>,
    query: Result<Query<CompareQuery>, QueryRejection>,
) -> ApiResult<Json<VersionDiff>> {
    let document_id = parse_document_id(&id)?;
    let Query(query) = query?;
    let diff = run_blocking(move || service.compare_versions(document_id, query.from, query.to)).await?;
    Ok(Json(diff))
}

async fn restore_version_handler(
    State(service): State<Arc<VersionService>>,
    headers: HeaderMap,
    Path((id, n)): Path<(String, String)>,
) -> ApiResult<(StatusCode, Json<RestoreOutcome>)> {
    let user = acting_user(&headers)?;
    let document_id = parse_document_id(&id)?;
    let target = parse_version_number(&n)?;
    let outcome = run_blocking(move || service.restore_version(document_id, target, user)).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
