//! folio - immutable version history for collaborative documents
//!
//! Every committed change to a document is captured as a numbered,
//! append-only snapshot. History can be listed, individual versions
//! fetched, two versions compared, and an earlier version restored by
//! appending it as a new one.

pub mod cli;
pub mod documents;
pub mod http_server;
pub mod observability;
pub mod storage;
pub mod versioning;
