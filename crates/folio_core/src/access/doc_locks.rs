//! Keyed mutual exclusion for per-document writes.
//!
//! # Invariants
//! - At most one guard per document id exists at a time.
//! - Acquisition waits at most `wait`; then it fails with `LockError::TimedOut`.
//! - A slot is dropped from the registry once nobody holds or awaits it.

use crate::model::document::DocumentId;
use log::warn;
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

type Slot = Arc<Mutex<()>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    /// Another writer held the document for the whole wait budget.
    TimedOut {
        document_id: DocumentId,
        waited: Duration,
    },
}

impl Display for LockError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimedOut {
                document_id,
                waited,
            } => write!(
                f,
                "timed out after {}ms waiting for document {document_id}",
                waited.as_millis()
            ),
        }
    }
}

impl Error for LockError {}

/// Registry of per-document locks shared by every connection in a process.
#[derive(Debug)]
pub struct DocumentLocks {
    slots: Mutex<HashMap<DocumentId, Slot>>,
    wait: Duration,
}

impl DocumentLocks {
    pub fn new(wait: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            wait,
        }
    }

    /// Blocks until the document is free or the wait budget is spent.
    pub fn acquire(&self, document_id: DocumentId) -> Result<DocumentLockGuard<'_>, LockError> {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(document_id).or_default())
        };

        let started_at = Instant::now();
        let acquired = slot.try_lock_arc_for(self.wait);
        drop(slot);

        match acquired {
            Some(held) => Ok(DocumentLockGuard {
                registry: self,
                document_id,
                held: Some(held),
            }),
            None => {
                let waited = started_at.elapsed();
                warn!(
                    "event=doc_lock module=access status=error error_code=lock_timeout document_id={} waited_ms={}",
                    document_id,
                    waited.as_millis()
                );
                self.release_slot_if_idle(document_id);
                Err(LockError::TimedOut {
                    document_id,
                    waited,
                })
            }
        }
    }

    /// Number of documents currently tracked. Idle slots are not counted.
    pub fn active_slots(&self) -> usize {
        self.slots.lock().len()
    }

    fn release_slot_if_idle(&self, document_id: DocumentId) {
        let mut slots = self.slots.lock();
        // Only the registry's own Arc left means no holder and no waiter.
        if slots
            .get(&document_id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&document_id);
        }
    }
}

/// Exclusive hold on one document, released on drop.
pub struct DocumentLockGuard<'a> {
    registry: &'a DocumentLocks,
    document_id: DocumentId,
    held: Option<ArcMutexGuard<RawMutex, ()>>,
}

impl DocumentLockGuard<'_> {
    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }
}

impl Drop for DocumentLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.held.take());
        self.registry.release_slot_if_idle(self.document_id);
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentLocks, LockError};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;
    use uuid::Uuid;

    #[test]
    fn second_acquire_times_out_while_first_is_held() {
        let locks = Arc::new(DocumentLocks::new(Duration::from_millis(30)));
        let document_id = Uuid::new_v4();
        let held = locks.acquire(document_id).expect("first acquire");

        let contender = Arc::clone(&locks);
        let err = thread::spawn(move || contender.acquire(document_id).map(|_| ()))
            .join()
            .expect("thread join")
            .expect_err("must time out");
        assert!(matches!(err, LockError::TimedOut { .. }));

        drop(held);
        assert!(locks.acquire(document_id).is_ok());
    }

    #[test]
    fn distinct_documents_do_not_contend() {
        let locks = DocumentLocks::new(Duration::from_millis(10));
        let first = locks.acquire(Uuid::new_v4()).expect("first doc");
        let second = locks.acquire(Uuid::new_v4()).expect("second doc");
        assert_ne!(first.document_id(), second.document_id());
        assert_eq!(locks.active_slots(), 2);
    }

    #[test]
    fn idle_slots_are_removed() {
        let locks = DocumentLocks::new(Duration::from_millis(10));
        let document_id = Uuid::new_v4();
        {
            let _guard = locks.acquire(document_id).expect("acquire");
            assert_eq!(locks.active_slots(), 1);
        }
        assert_eq!(locks.active_slots(), 0);
    }
}
