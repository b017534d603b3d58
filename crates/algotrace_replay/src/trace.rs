//! Finished traces.

use algotrace_core::{RunId, TraceError, TraceResult};
use algotrace_log::{Encoder, StateRecord};
use serde_json::Value as JsonValue;

/// Finalized records of one run, ready for encoding
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    run_id: RunId,
    records: Vec<StateRecord>,
}

impl Trace {
    /// Create a trace from finalized records
    #[must_use]
    pub fn new(run_id: RunId, records: Vec<StateRecord>) -> Self {
        Self { run_id, records }
    }

    /// Run the records came from
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Records in chronological order
    #[must_use]
    pub fn records(&self) -> &[StateRecord] {
        &self.records
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the trace is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Encode as a document tree: an array of record objects
    ///
    /// # Errors
    ///
    /// Returns `UnencodableType` if a payload cannot be represented
    pub fn to_document(&self, encoder: &Encoder) -> TraceResult<JsonValue> {
        encoder.encode_records(&self.records)
    }

    /// Encode and render as JSON text
    ///
    /// # Errors
    ///
    /// Returns `UnencodableType` or `Encoding` on failure
    pub fn to_json(&self, encoder: &Encoder) -> TraceResult<String> {
        let rendered = encoder.to_string(&self.records).map_err(|e| match e {
            TraceError::Encoding { message } => TraceError::Encoding {
                message: format!("{}: {}", self.run_id, message),
            },
            other => other,
        })?;
        tracing::debug!(run = %self.run_id, bytes = rendered.len(), "trace rendered");
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algotrace_log::RecordDraft;
    use serde_json::json;

    #[test]
    fn test_document_shape() {
        let records = vec![RecordDraft::comment("hello").finalize(false)];
        let trace = Trace::new(RunId::new(), records);
        let document = trace.to_document(&Encoder::default()).unwrap();
        assert_eq!(
            document,
            json!([{"state_type": "comment", "state_def": null, "comments": "hello", "autoplay": false}])
        );
    }

    #[test]
    fn test_json_roundtrips_through_serde() {
        let records = vec![RecordDraft::comment("x").finalize(true)];
        let trace = Trace::new(RunId::new(), records);
        let text = trace.to_json(&Encoder::default()).unwrap();
        let parsed: JsonValue = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["autoplay"], json!(true));
    }
}
