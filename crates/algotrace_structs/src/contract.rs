//! The recording contract shared by every container.
//!
//! A container owns a [`Binding`]: its display name, the identity issued
//! by the log, and a handle to that log. The [`Instrumented`] trait builds
//! every record the same way: identity fields first, then the container's
//! own state snapshot, then operation-specific fields.

use algotrace_core::{ContainerId, ContainerKind, ContainerRef, TraceError, TraceResult, Value};
use algotrace_log::{Payload, RecordDraft, StateLog};

/// Marker written for absent pointers and values
pub const NONE: &str = "none";

/// Name, identity and log of one container
#[derive(Debug, Clone)]
pub struct Binding {
    name: String,
    id: ContainerId,
    kind: ContainerKind,
    log: StateLog,
}

impl Binding {
    /// Bind a new container to a log under a display name.
    ///
    /// # Errors
    ///
    /// Returns `Binding` if the name is blank or holds control characters,
    /// or if the log no longer accepts records
    pub fn new(name: impl Into<String>, kind: ContainerKind, log: &StateLog) -> TraceResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TraceError::Binding {
                name,
                reason: "name should be a non-empty label".to_string(),
            });
        }
        if name.chars().any(char::is_control) {
            return Err(TraceError::Binding {
                name,
                reason: "name should not contain control characters".to_string(),
            });
        }
        Self::open(name, kind, log)
    }

    /// Bind a node, which is named after its own identity
    ///
    /// # Errors
    ///
    /// Returns `Binding` if the log no longer accepts records
    pub fn anonymous(kind: ContainerKind, log: &StateLog) -> TraceResult<Self> {
        if log.is_sealed() {
            return Err(Self::sealed_error(kind.class_name().to_string()));
        }
        let id = log.issue_id();
        Ok(Self {
            name: id.to_string(),
            id,
            kind,
            log: log.clone(),
        })
    }

    fn open(name: String, kind: ContainerKind, log: &StateLog) -> TraceResult<Self> {
        if log.is_sealed() {
            return Err(Self::sealed_error(name));
        }
        let id = log.issue_id();
        tracing::trace!(%id, %kind, name = %name, "container bound");
        Ok(Self {
            name,
            id,
            kind,
            log: log.clone(),
        })
    }

    fn sealed_error(name: String) -> TraceError {
        TraceError::Binding {
            name,
            reason: "state log has been sealed".to_string(),
        }
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity issued by the log
    #[must_use]
    pub const fn id(&self) -> ContainerId {
        self.id
    }

    /// Container kind
    #[must_use]
    pub const fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Log the container records into
    #[must_use]
    pub fn log(&self) -> &StateLog {
        &self.log
    }

    /// Reference to the bound container
    #[must_use]
    pub const fn reference(&self) -> ContainerRef {
        ContainerRef::new(self.kind, self.id)
    }

    /// Name for a container derived from this one, e.g. `arr_sub`
    #[must_use]
    pub fn derived_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.name, suffix)
    }

    /// Fail early if the log stopped accepting records.
    ///
    /// Mutating operations call this before touching state, so a refused
    /// append never leaves the container ahead of its trace.
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn ensure_open(&self) -> TraceResult<()> {
        if self.log.is_sealed() {
            return Err(TraceError::LogSealed {
                run: self.log.run_id().to_string(),
            });
        }
        Ok(())
    }

    /// Ensure another container records into the same log
    ///
    /// # Errors
    ///
    /// Returns `Binding` if the logs differ
    pub fn ensure_same_log(&self, other: &Binding) -> TraceResult<()> {
        if self.log.same_log(&other.log) {
            Ok(())
        } else {
            Err(TraceError::Binding {
                name: other.name.clone(),
                reason: format!("{} records into a different state log", other.name),
            })
        }
    }

    /// Append a record: identity fields followed by `fields`.
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn record(&self, op: &str, fields: Payload, annotation: &str) -> TraceResult<()> {
        let mut payload = Payload::with_capacity(fields.len() + 2);
        payload.insert("id".to_string(), Value::Str(self.id.to_string()));
        payload.insert("variable_name".to_string(), Value::Str(self.name.clone()));
        payload.extend(fields);
        let draft = RecordDraft::new(self.kind.state_type(op), Some(payload), annotation)?;
        self.log.append(draft)?;
        Ok(())
    }
}

/// Behaviour shared by every instrumented container
pub trait Instrumented {
    /// Name, identity and log
    fn binding(&self) -> &Binding;

    /// Value copy of the container's current state, e.g. `body`
    fn state_fields(&self) -> Payload;

    /// Container kind
    fn kind(&self) -> ContainerKind {
        self.binding().kind()
    }

    /// Display name
    fn name(&self) -> &str {
        self.binding().name()
    }

    /// Identity issued by the log
    fn id(&self) -> ContainerId {
        self.binding().id()
    }

    /// Reference used wherever the container appears inside another
    fn reference(&self) -> ContainerRef {
        self.binding().reference()
    }

    /// Record an operation with the current state snapshot plus `extra`
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    fn emit(&self, op: &str, extra: Vec<(&str, Value)>, annotation: &str) -> TraceResult<()> {
        let mut fields = self.state_fields();
        for (field, value) in extra {
            fields.insert(field.to_string(), value);
        }
        self.binding().record(op, fields, annotation)
    }

    /// Record the declaration
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    fn declare(&self, annotation: &str) -> TraceResult<()> {
        self.emit("declare", Vec::new(), annotation)
    }
}

/// Payload with a single `body` field
pub(crate) fn body_fields(body: Value) -> Payload {
    let mut fields = Payload::with_capacity(1);
    fields.insert("body".to_string(), body);
    fields
}

/// Caller annotation, or `fallback` when none was given
pub(crate) fn or_default<'a>(comments: &'a str, fallback: &'a str) -> &'a str {
    if comments.is_empty() {
        fallback
    } else {
        comments
    }
}

/// Render an optional pointer the way node records carry it
pub(crate) fn pointer(id: Option<ContainerId>) -> Value {
    match id {
        Some(id) => Value::Str(id.to_string()),
        None => Value::from(NONE),
    }
}

/// Containers appear inside other containers as references
macro_rules! impl_reference_value {
    ($($ty:ty),* $(,)?) => {
        $(impl From<&$ty> for algotrace_core::Value {
            fn from(container: &$ty) -> Self {
                algotrace_core::Value::Ref($crate::contract::Instrumented::reference(container))
            }
        })*
    };
}

pub(crate) use impl_reference_value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_rejected() {
        let log = StateLog::new();
        let result = Binding::new("  ", ContainerKind::Array, &log);
        assert!(matches!(result, Err(TraceError::Binding { .. })));
        assert!(Binding::new("a\nb", ContainerKind::Array, &log).is_err());
    }

    #[test]
    fn test_sealed_log_rejected() {
        let log = StateLog::new();
        let _ = log.seal();
        let result = Binding::new("arr", ContainerKind::Array, &log);
        assert!(matches!(result, Err(TraceError::Binding { .. })));
        assert!(Binding::anonymous(ContainerKind::LinkedListNode, &log).is_err());
    }

    #[test]
    fn test_identity_fields_first() {
        let log = StateLog::new();
        let binding = Binding::new("arr", ContainerKind::Array, &log).unwrap();
        binding.record("declare", body_fields(Value::from(vec![1])), "").unwrap();
        let record = log.last().unwrap();
        assert_eq!(record.kind(), "array_declare");
        let keys: Vec<&str> = record.payload().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "variable_name", "body"]);
        assert_eq!(record.field("id"), Some(&Value::from(binding.id().to_string())));
    }

    #[test]
    fn test_distinct_identities() {
        let log = StateLog::new();
        let a = Binding::new("a", ContainerKind::Stack, &log).unwrap();
        let b = Binding::new("b", ContainerKind::Stack, &log).unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.reference(), b.reference());
    }

    #[test]
    fn test_node_named_after_id() {
        let log = StateLog::new();
        let node = Binding::anonymous(ContainerKind::LinkedListNode, &log).unwrap();
        assert_eq!(node.name(), node.id().to_string());
    }

    #[test]
    fn test_same_log() {
        let log = StateLog::new();
        let a = Binding::new("a", ContainerKind::Map, &log).unwrap();
        let b = Binding::new("b", ContainerKind::Map, &StateLog::new()).unwrap();
        assert!(a.ensure_same_log(&a.clone()).is_ok());
        assert!(matches!(a.ensure_same_log(&b), Err(TraceError::Binding { .. })));
    }

    #[test]
    fn test_ensure_open() {
        let log = StateLog::new();
        let a = Binding::new("a", ContainerKind::Map, &log).unwrap();
        assert!(a.ensure_open().is_ok());
        let _ = log.seal();
        assert!(matches!(a.ensure_open(), Err(TraceError::LogSealed { .. })));
    }
}
