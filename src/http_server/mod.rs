//! # folio HTTP Server Module
//!
//! JSON API over the versioning service.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/documents` - Create documents
//! - `/api/documents/:id` - Read and update a live document
//! - `/api/documents/:id/versions/*` - History, compare, restore
//! - `/observability/metrics` - Counters
//!
//! Writes name the acting user in the `X-User-Id` header.

pub mod config;
pub mod document_routes;
pub mod errors;
pub mod observability_routes;
pub mod server;
pub mod version_routes;

pub use config::HttpServerConfig;
pub use document_routes::USER_HEADER;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
