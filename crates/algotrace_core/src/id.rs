//! Identity and naming for instrumented containers.
//!
//! Container identities are issued by the owning log from a monotonic
//! counter, so they are never reused within a run. A run itself is
//! identified by a random UUID.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace used in reference tokens unless configured otherwise
pub const DEFAULT_NAMESPACE: &str = "Toolkit";

/// Run identifier - identifies a single algorithm execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random RunId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from UUID bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Get as UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run_{}", self.0)
    }
}

/// Container identifier - unique within one log, stable for the container's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(u64);

impl ContainerId {
    /// Create from raw value
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Get raw value
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// The id that follows this one
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of instrumented container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContainerKind {
    /// N-dimensional fixed-shape array
    Array,
    /// Growable sequence
    Vector,
    /// LIFO stack
    Stack,
    /// FIFO queue
    Queue,
    /// Binary min-heap
    PriorityQueue,
    /// Insertion-ordered key/value map
    Map,
    /// Insertion-ordered set
    Set,
    /// Character string
    String,
    /// Scalar holder
    Variable,
    /// Singly linked node
    LinkedListNode,
    /// Singly linked head holder
    LinkedList,
    /// Complete singly linked list
    ForwardList,
    /// Doubly linked node
    DoublyLinkedListNode,
    /// Doubly linked head and tail holder
    DoublyLinkedList,
    /// Complete doubly linked list
    List,
}

impl ContainerKind {
    /// Class name used in reference tokens
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Array => "Array",
            Self::Vector => "Vector",
            Self::Stack => "Stack",
            Self::Queue => "Queue",
            Self::PriorityQueue => "PriorityQueue",
            Self::Map => "Map",
            Self::Set => "Set",
            Self::String => "String",
            Self::Variable => "Variable",
            Self::LinkedListNode => "LinkedListNode",
            Self::LinkedList => "LinkedList",
            Self::ForwardList => "ForwardList",
            Self::DoublyLinkedListNode => "DoublyLinkedListNode",
            Self::DoublyLinkedList => "DoublyLinkedList",
            Self::List => "List",
        }
    }

    /// Prefix of every record kind this container emits.
    ///
    /// Full lists record under the prefix of their head-holder type.
    #[must_use]
    pub const fn state_prefix(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Vector => "vector",
            Self::Stack => "stack",
            Self::Queue => "queue",
            Self::PriorityQueue => "priorityqueue",
            Self::Map => "map",
            Self::Set => "set",
            Self::String => "string",
            Self::Variable => "variable",
            Self::LinkedListNode => "llnode",
            Self::LinkedList | Self::ForwardList => "ll",
            Self::DoublyLinkedListNode => "dllnode",
            Self::DoublyLinkedList | Self::List => "dll",
        }
    }

    /// Record kind for an operation, e.g. `array_swap`
    #[must_use]
    pub fn state_type(self, op: &str) -> String {
        format!("{}_{}", self.state_prefix(), op)
    }

    /// Whether the container is a node in a linked structure
    #[must_use]
    pub const fn is_node(self) -> bool {
        matches!(self, Self::LinkedListNode | Self::DoublyLinkedListNode)
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Reference to a container, resolved by the consumer to one logical object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerRef {
    /// Container kind
    pub kind: ContainerKind,
    /// Container identity
    pub id: ContainerId,
}

impl ContainerRef {
    /// Create a new reference
    #[must_use]
    pub const fn new(kind: ContainerKind, id: ContainerId) -> Self {
        Self { kind, id }
    }

    /// Render the wire token `$<Namespace>.<Kind>:<id>`
    #[must_use]
    pub fn token(&self, namespace: &str) -> String {
        format!("${}.{}:{}", namespace, self.kind.class_name(), self.id)
    }
}

impl std::fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token(DEFAULT_NAMESPACE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_format() {
        let r = ContainerRef::new(ContainerKind::Array, ContainerId::from_raw(140312345));
        assert_eq!(r.token("Toolkit"), "$Toolkit.Array:140312345");
        assert_eq!(r.to_string(), "$Toolkit.Array:140312345");
    }

    #[test]
    fn test_token_deterministic() {
        let r = ContainerRef::new(ContainerKind::String, ContainerId::from_raw(3));
        assert_eq!(r.token("NS"), r.token("NS"));
    }

    #[test]
    fn test_state_type() {
        assert_eq!(ContainerKind::Array.state_type("swap"), "array_swap");
        assert_eq!(ContainerKind::ForwardList.state_type("head"), "ll_head");
        assert_eq!(ContainerKind::List.state_type("tail"), "dll_tail");
        assert_eq!(ContainerKind::PriorityQueue.state_type("offer"), "priorityqueue_offer");
    }

    #[test]
    fn test_container_id_next() {
        let id = ContainerId::from_raw(1);
        assert_eq!(id.next().as_u64(), 2);
        assert!(id < id.next());
    }

    #[test]
    fn test_run_id_unique() {
        assert_ne!(RunId::new(), RunId::new());
        assert!(RunId::new().to_string().starts_with("run_"));
    }

    #[test]
    fn test_is_node() {
        assert!(ContainerKind::LinkedListNode.is_node());
        assert!(!ContainerKind::List.is_node());
    }
}
