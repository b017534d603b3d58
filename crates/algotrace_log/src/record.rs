//! Records for the state log.
//!
//! Recording produces [`RecordDraft`]s. Once the run has ended and the
//! autoplay pass has decided playback hints, each draft is finalized into
//! a [`StateRecord`], which exposes no way to change it.

use algotrace_core::{TraceError, TraceResult, Value};
use indexmap::IndexMap;

/// Kind tag of narration records
pub const COMMENT_KIND: &str = "comment";

/// Record payload: field name to snapshot value, in insertion order
pub type Payload = IndexMap<String, Value>;

/// A record captured during recording
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    kind: String,
    payload: Option<Payload>,
    annotation: String,
}

impl RecordDraft {
    /// Create a new draft.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` if `kind` is empty, or if `payload` is
    /// absent on anything other than a comment
    pub fn new(
        kind: impl Into<String>,
        payload: Option<Payload>,
        annotation: impl Into<String>,
    ) -> TraceResult<Self> {
        let kind = kind.into();
        if kind.trim().is_empty() {
            return Err(TraceError::MalformedRecord {
                reason: "state_type should be present in record".to_string(),
            });
        }
        if payload.is_none() && kind != COMMENT_KIND {
            return Err(TraceError::MalformedRecord {
                reason: format!("state_def should be present in {} record", kind),
            });
        }
        Ok(Self {
            kind,
            payload,
            annotation: annotation.into(),
        })
    }

    /// Narration record with no payload
    #[must_use]
    pub fn comment(text: impl Into<String>) -> Self {
        Self {
            kind: COMMENT_KIND.to_string(),
            payload: None,
            annotation: text.into(),
        }
    }

    /// Start building a draft field by field
    #[must_use]
    pub fn builder() -> DraftBuilder {
        DraftBuilder::default()
    }

    /// Operation tag
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Snapshot payload, absent for comments
    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Human-readable annotation
    #[must_use]
    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Look up one payload field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.as_ref().and_then(|p| p.get(name))
    }

    /// Whether this is a narration record
    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.kind == COMMENT_KIND
    }

    /// Freeze the draft with its playback hint
    #[must_use]
    pub fn finalize(self, autoplay: bool) -> StateRecord {
        StateRecord {
            kind: self.kind,
            payload: self.payload,
            annotation: self.annotation,
            autoplay,
        }
    }
}

/// Builder that reports missing fields as malformed records
#[derive(Debug, Clone, Default)]
pub struct DraftBuilder {
    kind: Option<String>,
    payload: Option<Payload>,
    annotation: Option<String>,
}

impl DraftBuilder {
    /// Set the operation tag
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Replace the payload
    #[must_use]
    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Add one payload field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload
            .get_or_insert_with(Payload::new)
            .insert(name.into(), value.into());
        self
    }

    /// Set the annotation
    #[must_use]
    pub fn annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Build the draft.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` if kind or annotation was never set, or the
    /// draft itself is invalid
    pub fn build(self) -> TraceResult<RecordDraft> {
        let kind = self.kind.ok_or_else(|| TraceError::MalformedRecord {
            reason: "state_type should be present in record".to_string(),
        })?;
        let annotation = self.annotation.ok_or_else(|| TraceError::MalformedRecord {
            reason: "comments should be present in record".to_string(),
        })?;
        RecordDraft::new(kind, self.payload, annotation)
    }
}

/// A finalized record, ready for encoding
#[derive(Debug, Clone, PartialEq)]
pub struct StateRecord {
    kind: String,
    payload: Option<Payload>,
    annotation: String,
    autoplay: bool,
}

impl StateRecord {
    /// Operation tag
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Snapshot payload, absent for comments
    #[must_use]
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Human-readable annotation
    #[must_use]
    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Look up one payload field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.as_ref().and_then(|p| p.get(name))
    }

    /// Playback hint
    #[must_use]
    pub const fn autoplay(&self) -> bool {
        self.autoplay
    }

    /// Whether this is a narration record
    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.kind == COMMENT_KIND
    }
}
