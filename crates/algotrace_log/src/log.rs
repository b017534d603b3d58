//! The append-only state log for one algorithm run.
//!
//! A [`StateLog`] is a cheap handle: every container created during the
//! run holds a clone of it and appends through it, so nested containers
//! end up in one ordered trace. Recording is single-threaded.

use crate::record::RecordDraft;
use algotrace_core::{ContainerId, RunId, TraceError, TraceResult};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
struct LogInner {
    run_id: RunId,
    records: Vec<RecordDraft>,
    autoplay: Option<bool>,
    next_id: ContainerId,
    sealed: bool,
}

/// Shared handle to the records of one run
#[derive(Debug, Clone)]
pub struct StateLog {
    inner: Rc<RefCell<LogInner>>,
}

impl StateLog {
    /// Create a new, empty log for a fresh run
    #[must_use]
    pub fn new() -> Self {
        let run_id = RunId::new();
        tracing::debug!(run = %run_id, "state log created");
        Self {
            inner: Rc::new(RefCell::new(LogInner {
                run_id,
                records: Vec::new(),
                autoplay: None,
                next_id: ContainerId::from_raw(1),
                sealed: false,
            })),
        }
    }

    /// Run this log belongs to
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.inner.borrow().run_id
    }

    /// Append a record, returning its index.
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn append(&self, record: RecordDraft) -> TraceResult<usize> {
        let mut inner = self.inner.borrow_mut();
        if inner.sealed {
            return Err(TraceError::LogSealed {
                run: inner.run_id.to_string(),
            });
        }
        let index = inner.records.len();
        tracing::trace!(index, kind = record.kind(), "record appended");
        inner.records.push(record);
        Ok(index)
    }

    /// Append a narration record.
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn add_comment(&self, text: impl Into<String>) -> TraceResult<usize> {
        self.append(RecordDraft::comment(text))
    }

    /// Snapshot of the records appended so far
    #[must_use]
    pub fn records(&self) -> Records {
        Records {
            records: self.inner.borrow().records.clone(),
        }
    }

    /// Most recent record
    #[must_use]
    pub fn last(&self) -> Option<RecordDraft> {
        self.inner.borrow().records.last().cloned()
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().records.len()
    }

    /// Whether nothing was recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().records.is_empty()
    }

    /// Force every record's playback hint, or `None` to use the comment rule
    pub fn set_autoplay(&self, autoplay: Option<bool>) {
        self.inner.borrow_mut().autoplay = autoplay;
    }

    /// Playback override, if any
    #[must_use]
    pub fn autoplay(&self) -> Option<bool> {
        self.inner.borrow().autoplay
    }

    /// Issue a fresh container identity
    pub fn issue_id(&self) -> ContainerId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id = id.next();
        id
    }

    /// Whether two handles refer to the same log
    #[must_use]
    pub fn same_log(&self, other: &StateLog) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether recording has ended
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.inner.borrow().sealed
    }

    /// End recording and hand the records over for post-processing.
    ///
    /// Later appends fail; the log itself stays readable.
    pub fn seal(&self) -> SealedLog {
        let mut inner = self.inner.borrow_mut();
        inner.sealed = true;
        tracing::debug!(run = %inner.run_id, records = inner.records.len(), "state log sealed");
        SealedLog {
            run_id: inner.run_id,
            records: inner.records.clone(),
            autoplay: inner.autoplay,
        }
    }
}

impl Default for StateLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Records captured at the time `records()` was called.
///
/// Iterating does not consume it, so a snapshot can be replayed any
/// number of times.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Records {
    records: Vec<RecordDraft>,
}

impl Records {
    /// Iterate in chronological order
    pub fn iter(&self) -> std::slice::Iter<'_, RecordDraft> {
        self.records.iter()
    }

    /// Record at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RecordDraft> {
        self.records.get(index)
    }

    /// Most recent record
    #[must_use]
    pub fn last(&self) -> Option<&RecordDraft> {
        self.records.last()
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[RecordDraft] {
        &self.records
    }
}

impl<'a> IntoIterator for &'a Records {
    type Item = &'a RecordDraft;
    type IntoIter = std::slice::Iter<'a, RecordDraft>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for Records {
    type Item = RecordDraft;
    type IntoIter = std::vec::IntoIter<RecordDraft>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// A finished log: read-only input to the post-processor
#[derive(Debug, Clone, PartialEq)]
pub struct SealedLog {
    run_id: RunId,
    records: Vec<RecordDraft>,
    autoplay: Option<bool>,
}

impl SealedLog {
    /// Run the records came from
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Recorded drafts
    #[must_use]
    pub fn records(&self) -> &[RecordDraft] {
        &self.records
    }

    /// Playback override captured at sealing time
    #[must_use]
    pub fn autoplay(&self) -> Option<bool> {
        self.autoplay
    }

    /// Replace the override before post-processing
    #[must_use]
    pub fn with_autoplay(mut self, autoplay: Option<bool>) -> Self {
        self.autoplay = autoplay;
        self
    }

    /// Take the drafts
    #[must_use]
    pub fn into_records(self) -> Vec<RecordDraft> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Payload;
    use algotrace_core::Value;
    use proptest::prelude::*;

    fn draft(kind: &str) -> RecordDraft {
        let mut payload = Payload::new();
        payload.insert("body".to_string(), Value::from(vec![1]));
        RecordDraft::new(kind, Some(payload), "").unwrap()
    }

    #[test]
    fn test_append_in_order() {
        let log = StateLog::new();
        assert!(log.is_empty());
        assert_eq!(log.append(draft("a")).unwrap(), 0);
        assert_eq!(log.append(draft("b")).unwrap(), 1);
        let records = log.records();
        let kinds: Vec<&str> = records.iter().map(RecordDraft::kind).collect();
        assert_eq!(kinds, vec!["a", "b"]);
    }

    #[test]
    fn test_add_comment() {
        let log = StateLog::new();
        log.add_comment("Hello world").unwrap();
        let last = log.last().unwrap();
        assert!(last.is_comment());
        assert_eq!(last.annotation(), "Hello world");
        assert!(last.payload().is_none());
    }

    #[test]
    fn test_records_restartable() {
        let log = StateLog::new();
        log.append(draft("a")).unwrap();
        let records = log.records();
        assert_eq!(records.iter().count(), 1);
        assert_eq!(records.iter().count(), 1);
        log.append(draft("b")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(log.records().len(), 2);
    }

    #[test]
    fn test_shared_handle() {
        let log = StateLog::new();
        let other = log.clone();
        other.append(draft("a")).unwrap();
        assert_eq!(log.len(), 1);
        assert!(log.same_log(&other));
        assert!(!log.same_log(&StateLog::new()));
    }

    #[test]
    fn test_issue_id_monotonic() {
        let log = StateLog::new();
        let a = log.issue_id();
        let b = log.issue_id();
        assert!(a < b);
    }

    #[test]
    fn test_seal_blocks_append() {
        let log = StateLog::new();
        log.append(draft("a")).unwrap();
        log.set_autoplay(Some(true));
        let sealed = log.seal();
        assert_eq!(sealed.records().len(), 1);
        assert_eq!(sealed.autoplay(), Some(true));
        assert!(log.is_sealed());
        assert!(matches!(log.append(draft("b")), Err(TraceError::LogSealed { .. })));
        assert_eq!(log.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_append_order(kinds in proptest::collection::vec("[a-z]{1,8}", 0..40)) {
            let log = StateLog::new();
            for kind in &kinds {
                log.append(draft(kind)).unwrap();
            }
            let recorded: Vec<String> = log.records().iter().map(|r| r.kind().to_string()).collect();
            prop_assert_eq!(recorded, kinds);
        }
    }
}
