//! Per-document write serialization
//!
//! Each document gets its own mutex, created on first use and dropped from
//! the registry when its last holder leaves. The registry mutex is held only
//! while looking up or releasing that per-document mutex, so writers of
//! different documents never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::errors::{VersionError, VersionResult};
use super::types::DocumentId;

#[derive(Debug, Default)]
pub struct DocumentLocks {
    registry: Mutex<HashMap<DocumentId, Arc<Mutex<()>>>>,
}

impl DocumentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, document_id: DocumentId) -> VersionResult<Arc<Mutex<()>>> {
        let mut registry = self
            .registry
            .lock()
            .map_err(|_| VersionError::InvalidState("document lock registry poisoned".into()))?;
        Ok(Arc::clone(registry.entry(document_id).or_default()))
    }

    /// Drops the registry entry for `document_id` unless another caller
    /// still holds or waits on `slot`.
    fn release(&self, document_id: DocumentId, slot: Arc<Mutex<()>>) {
        let Ok(mut registry) = self.registry.lock() else {
            return;
        };
        let idle = registry
            .get(&document_id)
            .map(|entry| Arc::ptr_eq(entry, &slot) && Arc::strong_count(&slot) == 2)
            .unwrap_or(false);
        if idle {
            registry.remove(&document_id);
        }
    }

    /// Runs `f` as the only writer of `document_id`.
    ///
    /// The `DocumentGuard` handed to `f` cannot outlive the call.
    pub fn with_document<T>(
        &self,
        document_id: DocumentId,
        f: impl FnOnce(&DocumentGuard) -> VersionResult<T>,
    ) -> VersionResult<T> {
        let slot = self.slot(document_id)?;
        let result = match slot.lock() {
            Ok(_held) => f(&DocumentGuard { document_id }),
            Err(_) => Err(VersionError::InvalidState(format!(
                "lock for document {} poisoned",
                document_id
            ))),
        };
        self.release(document_id, slot);
        result
    }

    /// Number of documents with a writer inside or waiting.
    pub fn len(&self) -> usize {
        self.registry.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Proof that the holder is inside `DocumentLocks::with_document` for one
/// document. Only this module can construct it.
#[derive(Debug)]
pub struct DocumentGuard {
    document_id: DocumentId,
}

impl DocumentGuard {
    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    /// Errors unless this guard covers `document_id`.
    pub fn ensure_covers(&self, document_id: DocumentId) -> VersionResult<()> {
        if self.document_id == document_id {
            Ok(())
        } else {
            Err(VersionError::InvalidState(format!(
                "write to document {} attempted under lock for {}",
                document_id, self.document_id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_same_document_is_serialized() {
        let locks = Arc::new(DocumentLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let doc = DocumentId::new();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                thread::spawn(move || {
                    locks
                        .with_document(doc, |_| {
                            let now = inside.fetch_add(1, Ordering::SeqCst);
                            assert_eq!(now, 0, "two writers inside the same document");
                            thread::sleep(Duration::from_millis(2));
                            inside.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(locks.is_empty());
    }

    #[test]
    fn test_slot_released_after_error() {
        let locks = DocumentLocks::new();
        for _ in 0..100 {
            let result: VersionResult<()> = locks.with_document(DocumentId::new(), |_| {
                Err(VersionError::InvalidState("nope".into()))
            });
            assert!(result.is_err());
        }
        assert!(locks.is_empty());
    }

    #[test]
    fn test_slot_kept_while_held() {
        let locks = DocumentLocks::new();
        let doc = DocumentId::new();
        locks
            .with_document(doc, |_| {
                assert_eq!(locks.len(), 1);
                Ok(())
            })
            .unwrap();
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn test_guard_checks_document() {
        let locks = DocumentLocks::new();
        let a = DocumentId::new();
        let b = DocumentId::new();
        locks
            .with_document(a, |guard| {
                assert!(guard.ensure_covers(a).is_ok());
                assert!(guard.ensure_covers(b).is_err());
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_different_documents_do_not_block() {
        let locks = Arc::new(DocumentLocks::new());
        let a = DocumentId::new();
        let b = DocumentId::new();

        locks
            .with_document(a, |_| {
                let locks = Arc::clone(&locks);
                // Taking b's lock from another thread while a is held must not deadlock.
                let handle = thread::spawn(move || locks.with_document(b, |_| Ok(42)));
                assert_eq!(handle.join().unwrap().unwrap(), 42);
                Ok(())
            })
            .unwrap();
    }
}
