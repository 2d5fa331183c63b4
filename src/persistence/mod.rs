//! Finished-session storage
//!
//! A persister receives each [`SessionSummary`] by value, exactly once per
//! session, after the session has already ended. It never sees live state, so
//! a slow write from an earlier session cannot clobber a later one.

pub mod record;

#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod rest;

pub use record::SessionRecord;

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonLinesPersister;
#[cfg(target_arch = "wasm32")]
pub use rest::RestPersister;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::PersistError;
use crate::sim::SessionSummary;

/// Destination for finished sessions
pub trait SessionPersister {
    fn persist(&mut self, summary: SessionSummary) -> Result<(), PersistError>;

    /// Failure reported after `persist` already returned, if any
    fn take_deferred_error(&mut self) -> Option<PersistError> {
        None
    }
}

impl<P: SessionPersister + ?Sized> SessionPersister for Box<P> {
    fn persist(&mut self, summary: SessionSummary) -> Result<(), PersistError> {
        (**self).persist(summary)
    }

    fn take_deferred_error(&mut self) -> Option<PersistError> {
        (**self).take_deferred_error()
    }
}

type FailureListener = Rc<dyn Fn(&PersistError)>;

#[derive(Default)]
struct SlotInner {
    error: Option<PersistError>,
    listener: Option<FailureListener>,
}

/// Shared cell for write failures that arrive after `persist` returned
///
/// Clones share the same cell. A background upload keeps one clone and the
/// persister hands the error to the session on the next check. Only the
/// latest failure is kept.
#[derive(Clone, Default)]
pub struct FailureSlot {
    inner: Rc<RefCell<SlotInner>>,
}

impl FailureSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called for every recorded failure, in addition to storing it
    pub fn set_listener(&self, listener: impl Fn(&PersistError) + 'static) {
        self.inner.borrow_mut().listener = Some(Rc::new(listener));
    }

    pub fn record(&self, err: PersistError) {
        log::warn!("Session write failed: {err}");
        let listener = self.inner.borrow().listener.clone();
        if let Some(listener) = listener {
            listener(&err);
        }
        self.inner.borrow_mut().error = Some(err);
    }

    pub fn take(&self) -> Option<PersistError> {
        self.inner.borrow_mut().error.take()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.borrow().error.is_some()
    }
}

impl fmt::Debug for FailureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FailureSlot")
            .field("error", &inner.error)
            .field("listener", &inner.listener.is_some())
            .finish()
    }
}

/// Keeps records in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryPersister {
    user_id: Option<String>,
    records: Vec<SessionRecord>,
    /// Fail every write (exercises the error path)
    pub fail_writes: bool,
}

impl MemoryPersister {
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            user_id,
            records: Vec::new(),
            fail_writes: false,
        }
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }
}

impl SessionPersister for MemoryPersister {
    fn persist(&mut self, summary: SessionSummary) -> Result<(), PersistError> {
        if self.fail_writes {
            return Err(PersistError::Storage("memory store is read-only".into()));
        }
        self.records.push(SessionRecord::new(self.user_id.clone(), &summary));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_slot_is_shared_between_clones() {
        let slot = FailureSlot::new();
        let background = slot.clone();
        assert!(slot.take().is_none());

        background.record(PersistError::Rejected { status: 503 });
        assert!(slot.is_pending());
        assert!(matches!(
            slot.take(),
            Some(PersistError::Rejected { status: 503 })
        ));
        // Reported once
        assert!(slot.take().is_none());
        assert!(!background.is_pending());
    }

    #[test]
    fn test_failure_slot_keeps_latest_and_notifies() {
        let slot = FailureSlot::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        slot.set_listener(move |e| sink.borrow_mut().push(e.to_string()));

        slot.record(PersistError::Storage("offline".into()));
        slot.clone().record(PersistError::Rejected { status: 500 });

        assert_eq!(seen.borrow().len(), 2);
        assert!(seen.borrow()[0].contains("offline"));
        assert!(matches!(
            slot.take(),
            Some(PersistError::Rejected { status: 500 })
        ));
    }

    #[test]
    fn test_memory_persister() {
        let mut persister = MemoryPersister::new(Some("u-1".into()));
        let summary = SessionSummary {
            score: 42,
            distance_traveled: 3.9,
            obstacles_avoided: 1,
            time_elapsed_seconds: 3,
        };
        persister.persist(summary).unwrap();
        assert_eq!(persister.records().len(), 1);
        assert_eq!(persister.records()[0].distance_traveled, 3);
        assert_eq!(persister.records()[0].user_id.as_deref(), Some("u-1"));

        persister.fail_writes = true;
        assert!(matches!(persister.persist(summary), Err(PersistError::Storage(_))));
        assert_eq!(persister.records().len(), 1);
    }
}
