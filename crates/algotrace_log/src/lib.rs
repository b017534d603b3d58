//! AlgoTrace State Log
//!
//! Immutable records, the append-only log shared by every container of a
//! run, and the encoder that turns finished records into a document.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encoding;
pub mod log;
pub mod record;

pub use encoding::{Encode, Encoder, EncoderConfig};
pub use log::{Records, SealedLog, StateLog};
pub use record::{DraftBuilder, Payload, RecordDraft, StateRecord, COMMENT_KIND};
