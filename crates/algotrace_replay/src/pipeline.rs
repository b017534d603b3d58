//! One-call handoff from a live log to the encoded document.

use crate::processor::{Processor, ProcessorConfig};
use algotrace_core::TraceResult;
use algotrace_log::{Encoder, StateLog};

/// Seal `log`, run the autoplay pass, and render the document.
///
/// The log stops accepting records even if encoding fails.
///
/// # Errors
///
/// Returns `UnencodableType` or `Encoding` if the trace cannot be rendered
pub fn export(log: &StateLog, encoder: &Encoder, config: &ProcessorConfig) -> TraceResult<String> {
    let trace = Processor::new(*config).process(log.seal());
    tracing::info!(run = %trace.run_id(), records = trace.len(), "exporting trace");
    trace.to_json(encoder)
}
