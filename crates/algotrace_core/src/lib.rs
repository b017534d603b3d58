//! AlgoTrace Core Types
//!
//! Pure types with no I/O: container identity, snapshot values, and the
//! error taxonomy shared by every recording crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod id;
pub mod value;

// Re-exports
pub use error::{TraceError, TraceResult};
pub use id::{ContainerId, ContainerKind, ContainerRef, RunId, DEFAULT_NAMESPACE};
pub use value::{Key, Value};
