//! Metrics registry
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Relaxed atomics; exact values are not needed across threads

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    documents_created: AtomicU64,
    versions_created: AtomicU64,
    noop_saves: AtomicU64,
    restores: AtomicU64,
    diffs_computed: AtomicU64,
    history_reads: AtomicU64,
    rejected_writes: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_documents_created(&self) {
        self.documents_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_versions_created(&self) {
        self.versions_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_noop_saves(&self) {
        self.noop_saves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_restores(&self) {
        self.restores.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_diffs(&self) {
        self.diffs_computed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_history_reads(&self) {
        self.history_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected_writes(&self) {
        self.rejected_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn versions_created(&self) -> u64 {
        self.versions_created.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_created: self.documents_created.load(Ordering::Relaxed),
            versions_created: self.versions_created.load(Ordering::Relaxed),
            noop_saves: self.noop_saves.load(Ordering::Relaxed),
            restores: self.restores.load(Ordering::Relaxed),
            diffs_computed: self.diffs_computed.load(Ordering::Relaxed),
            history_reads: self.history_reads.load(Ordering::Relaxed),
            rejected_writes: self.rejected_writes.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of every counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub documents_created: u64,
    pub versions_created: u64,
    pub noop_saves: u64,
    pub restores: u64,
    pub diffs_computed: u64,
    pub history_reads: u64,
    pub rejected_writes: u64,
}
