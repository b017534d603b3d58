//! AlgoTrace Replay
//!
//! Turns a sealed state log into a finished trace: the autoplay pass
//! decides each record's playback hint, and the result is encoded into
//! the document handed to a visualizer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod pipeline;
pub mod processor;
pub mod trace;

pub use pipeline::export;
pub use processor::{post_process, Processor, ProcessorConfig};
pub use trace::Trace;
