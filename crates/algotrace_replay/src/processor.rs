//! The autoplay pass.
//!
//! With an override in place every record gets the same hint. Otherwise
//! a record immediately followed by a comment is marked for autoplay and
//! everything else is not. A comment at index 0 has no predecessor and
//! marks nothing.

use crate::trace::Trace;
use algotrace_log::{RecordDraft, SealedLog, StateRecord};
use serde::{Deserialize, Serialize};

/// Post-processor configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Override applied when the log itself carries none
    pub autoplay: Option<bool>,
}

/// Autoplay post-processor
#[derive(Debug, Clone, Default)]
pub struct Processor {
    config: ProcessorConfig,
}

impl Processor {
    /// Create a processor
    #[must_use]
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Finalize every record of a sealed log.
    ///
    /// The log's own override wins over the configured one.
    #[must_use]
    pub fn process(&self, log: SealedLog) -> Trace {
        let run_id = log.run_id();
        let autoplay = log.autoplay().or(self.config.autoplay);
        let records = finalize(log.into_records(), autoplay);
        tracing::debug!(
            run = %run_id,
            records = records.len(),
            autoplay = ?autoplay,
            "autoplay pass complete"
        );
        Trace::new(run_id, records)
    }
}

/// Finalize a sealed log with its own override, if any
#[must_use]
pub fn post_process(log: SealedLog) -> Trace {
    Processor::default().process(log)
}

fn finalize(drafts: Vec<RecordDraft>, autoplay: Option<bool>) -> Vec<StateRecord> {
    if let Some(flag) = autoplay {
        return drafts.into_iter().map(|d| d.finalize(flag)).collect();
    }
    let followed_by_comment: Vec<bool> = (0..drafts.len())
        .map(|i| drafts.get(i + 1).is_some_and(RecordDraft::is_comment))
        .collect();
    drafts
        .into_iter()
        .zip(followed_by_comment)
        .map(|(draft, flag)| draft.finalize(flag))
        .collect()
}
