//! Error taxonomy for recording, encoding, and container operations.
//!
//! Every error is local to one run and is raised before any record is
//! appended, so a failed operation never leaves a half-written trace.

/// Result type used across the workspace
pub type TraceResult<T> = Result<T, TraceError>;

/// Trace error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    /// A record was built without a required field
    #[error("Malformed record: {reason}")]
    MalformedRecord {
        /// What was wrong with the record
        reason: String,
    },

    /// A container could not be bound to its name or log
    #[error("Binding failed for {name:?}: {reason}")]
    Binding {
        /// Display name that was supplied
        name: String,
        /// Why the binding was refused
        reason: String,
    },

    /// The operation needs at least one element
    #[error("{container} is empty")]
    EmptyContainer {
        /// Display name of the container
        container: String,
    },

    /// Key is not a primitive or container reference
    #[error("Invalid key: {reason}")]
    InvalidKey {
        /// Why the key was rejected
        reason: String,
    },

    /// Value cannot be stored or operated on
    #[error("Invalid value: {reason}")]
    InvalidValue {
        /// Why the value was rejected
        reason: String,
    },

    /// The encoder met a value it cannot represent
    #[error("Unencodable value: {type_name}")]
    UnencodableType {
        /// Description of the offending value
        type_name: String,
    },

    /// Index outside the container bounds
    #[error("Index {index} out of range for {container} (len {len})")]
    IndexOutOfRange {
        /// Display name of the container
        container: String,
        /// Index that was requested
        index: String,
        /// Length of the indexed dimension
        len: usize,
    },

    /// Key absent from a map or set
    #[error("Key not found in {container}: {key}")]
    KeyNotFound {
        /// Display name of the container
        container: String,
        /// Rendered key
        key: String,
    },

    /// Node was released with `dispose`
    #[error("Node {id} has been disposed")]
    Disposed {
        /// Identity of the node
        id: String,
    },

    /// Recording already ended for this log
    #[error("State log {run} is sealed")]
    LogSealed {
        /// Run that owns the log
        run: String,
    },

    /// Serializer failure while rendering a document
    #[error("Encoding failed: {message}")]
    Encoding {
        /// Underlying serializer message
        message: String,
    },
}

impl TraceError {
    /// Shorthand for an empty-container error
    pub fn empty(container: impl Into<String>) -> Self {
        Self::EmptyContainer {
            container: container.into(),
        }
    }

    /// Shorthand for an out-of-range index error
    pub fn out_of_range(container: impl Into<String>, index: impl ToString, len: usize) -> Self {
        Self::IndexOutOfRange {
            container: container.into(),
            index: index.to_string(),
            len,
        }
    }

    /// Shorthand for an invalid-value error
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TraceError::empty("stack");
        assert_eq!(format!("{}", err), "stack is empty");

        let err = TraceError::KeyNotFound {
            container: "map".to_string(),
            key: "\"xyz\"".to_string(),
        };
        assert_eq!(format!("{}", err), "Key not found in map: \"xyz\"");
    }

    #[test]
    fn test_out_of_range_error() {
        let err = TraceError::out_of_range("arr", 7, 3);
        let s = format!("{}", err);
        assert!(s.contains("7"));
        assert!(s.contains("len 3"));
    }

    #[test]
    fn test_binding_error() {
        let err = TraceError::Binding {
            name: "".to_string(),
            reason: "name must not be empty".to_string(),
        };
        assert!(format!("{}", err).contains("name must not be empty"));
    }

    #[test]
    fn test_error_equality() {
        let err1 = TraceError::empty("q");
        let err2 = TraceError::empty("q");
        assert_eq!(err1, err2);

        let err3 = TraceError::invalid_value("q");
        assert_ne!(err1, err3);
    }
}
