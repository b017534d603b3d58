//! Singly linked nodes, a head holder, and a ready-made forward list.
//!
//! Nodes are shared handles: cloning a [`LinkedListNode`] yields another
//! handle to the same node, and pointer changes are visible through every
//! handle. A node leaves the trace only through an explicit
//! [`LinkedListNode::dispose`].

use crate::contract::{impl_reference_value, or_default, pointer, Binding, Instrumented, NONE};
use algotrace_core::{ContainerId, ContainerKind, TraceError, TraceResult, Value};
use algotrace_log::{Payload, StateLog};
use std::cell::RefCell;
use std::rc::Rc;

struct NodeState {
    value: Value,
    next: Option<LinkedListNode>,
    disposed: bool,
}

struct NodeShared {
    binding: Binding,
    state: RefCell<NodeState>,
}

/// Shared handle to one singly linked node
#[derive(Clone)]
pub struct LinkedListNode(Rc<NodeShared>);

impl LinkedListNode {
    /// Declare a node holding `value`, with no successor
    ///
    /// # Errors
    ///
    /// Returns `Binding` if the log is sealed
    pub fn new(log: &StateLog, value: impl Into<Value>, comments: &str) -> TraceResult<Self> {
        let node = Self(Rc::new(NodeShared {
            binding: Binding::anonymous(ContainerKind::LinkedListNode, log)?,
            state: RefCell::new(NodeState {
                value: value.into(),
                next: None,
                disposed: false,
            }),
        }));
        node.declare(comments)?;
        Ok(node)
    }

    /// Current value, without recording
    #[must_use]
    pub fn value(&self) -> Value {
        self.0.state.borrow().value.clone()
    }

    /// Successor, if any
    #[must_use]
    pub fn next(&self) -> Option<LinkedListNode> {
        self.0.state.borrow().next.clone()
    }

    /// Whether `dispose` has been called
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.0.state.borrow().disposed
    }

    /// Whether both handles point at the same node
    #[must_use]
    pub fn ptr_eq(&self, other: &LinkedListNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn ensure_live(&self) -> TraceResult<()> {
        if self.is_disposed() {
            return Err(TraceError::Disposed {
                id: self.0.binding.id().to_string(),
            });
        }
        Ok(())
    }

    fn next_id(&self) -> Option<ContainerId> {
        self.0.state.borrow().next.as_ref().map(Instrumented::id)
    }

    /// Read the value, recording the access
    ///
    /// # Errors
    ///
    /// Returns `Disposed` after disposal
    pub fn read(&self, comments: &str) -> TraceResult<Value> {
        self.ensure_live()?;
        self.emit("iter", Vec::new(), comments)?;
        Ok(self.value())
    }

    /// Replace the value
    ///
    /// # Errors
    ///
    /// Returns `Disposed` after disposal
    pub fn set_value(&self, value: impl Into<Value>, comments: &str) -> TraceResult<()> {
        self.ensure_live()?;
        self.0.binding.ensure_open()?;
        let last_value = std::mem::replace(&mut self.0.state.borrow_mut().value, value.into());
        self.emit(
            "iter",
            vec![("last_value", last_value)],
            or_default(comments, "value updated"),
        )
    }

    /// Point at a new successor, or at none.
    ///
    /// Going from none to none records nothing.
    ///
    /// # Errors
    ///
    /// Returns `Disposed` if either node was disposed, `Binding` if the
    /// successor records into another log
    pub fn set_next(&self, next: Option<&LinkedListNode>, comments: &str) -> TraceResult<()> {
        self.ensure_live()?;
        if let Some(node) = next {
            node.ensure_live()?;
            self.0.binding.ensure_same_log(&node.0.binding)?;
        }
        self.0.binding.ensure_open()?;
        let last_next = self.next_id();
        self.0.state.borrow_mut().next = next.cloned();
        if last_next.is_none() && next.is_none() {
            return Ok(());
        }
        self.emit(
            "next",
            vec![("last_next", pointer(last_next))],
            or_default(comments, "next pointer updated"),
        )
    }

    /// Release the node. Every later mutation fails with `Disposed`.
    ///
    /// # Errors
    ///
    /// Returns `Disposed` if already disposed
    pub fn dispose(&self, comments: &str) -> TraceResult<()> {
        self.ensure_live()?;
        self.0.binding.ensure_open()?;
        self.0.state.borrow_mut().disposed = true;
        self.0
            .binding
            .record("delete", Payload::new(), or_default(comments, "Node was deleted"))
    }
}

impl Instrumented for LinkedListNode {
    fn binding(&self) -> &Binding {
        &self.0.binding
    }

    fn state_fields(&self) -> Payload {
        let mut fields = Payload::with_capacity(2);
        fields.insert("value".to_string(), self.value());
        fields.insert("next".to_string(), pointer(self.next_id()));
        fields
    }
}

impl std::fmt::Debug for LinkedListNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkedListNode")
            .field("id", &self.0.binding.id())
            .field("value", &self.value())
            .field("next", &self.next_id())
            .finish()
    }
}

fn head_fields(head: Option<&LinkedListNode>) -> Payload {
    let mut fields = Payload::with_capacity(1);
    fields.insert("head".to_string(), pointer(head.map(Instrumented::id)));
    fields
}

/// Holder of a head pointer, for hand-written singly linked lists
#[derive(Debug)]
pub struct LinkedList {
    binding: Binding,
    head: Option<LinkedListNode>,
}

impl LinkedList {
    /// Declare a list starting at `head`
    ///
    /// # Errors
    ///
    /// Returns `Binding` for a bad name, sealed log, or a head from another log
    pub fn new(
        name: impl Into<String>,
        log: &StateLog,
        head: Option<&LinkedListNode>,
        comments: &str,
    ) -> TraceResult<Self> {
        let binding = Binding::new(name, ContainerKind::LinkedList, log)?;
        if let Some(node) = head {
            binding.ensure_same_log(node.binding())?;
        }
        let list = Self {
            binding,
            head: head.cloned(),
        };
        list.declare(comments)?;
        Ok(list)
    }

    /// Current head
    #[must_use]
    pub fn head(&self) -> Option<LinkedListNode> {
        self.head.clone()
    }

    /// Move the head pointer
    ///
    /// # Errors
    ///
    /// Returns `Binding` if the node records into another log
    pub fn set_head(&mut self, head: Option<&LinkedListNode>, comments: &str) -> TraceResult<()> {
        if let Some(node) = head {
            self.binding.ensure_same_log(node.binding())?;
        }
        self.binding.ensure_open()?;
        let last = std::mem::replace(&mut self.head, head.cloned());
        self.emit(
            "head",
            vec![("last_head", pointer(last.as_ref().map(Instrumented::id)))],
            or_default(comments, "head pointer shifts"),
        )
    }
}

impl Instrumented for LinkedList {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn state_fields(&self) -> Payload {
        head_fields(self.head.as_ref())
    }
}

/// Complete singly linked list that manages its own nodes
#[derive(Debug)]
pub struct ForwardList {
    binding: Binding,
    head: Option<LinkedListNode>,
    size: usize,
}

impl ForwardList {
    /// Declare an empty list
    ///
    /// # Errors
    ///
    /// Returns `Binding` for a bad name or sealed log
    pub fn new(name: impl Into<String>, log: &StateLog, comments: &str) -> TraceResult<Self> {
        let list = Self {
            binding: Binding::new(name, ContainerKind::ForwardList, log)?,
            head: None,
            size: 0,
        };
        list.declare(comments)?;
        Ok(list)
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current head node
    #[must_use]
    pub fn head(&self) -> Option<LinkedListNode> {
        self.head.clone()
    }

    fn shift_head(&mut self, head: Option<LinkedListNode>) -> TraceResult<()> {
        let last = std::mem::replace(&mut self.head, head);
        self.emit(
            "head",
            vec![("last_head", pointer(last.as_ref().map(Instrumented::id)))],
            "head pointer shifts",
        )
    }

    fn node_at(&self, index: usize) -> Option<LinkedListNode> {
        let mut current = self.head.clone();
        for _ in 0..index {
            current = current?.next();
        }
        current
    }

    /// Insert at the front
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn push_front(&mut self, value: impl Into<Value>) -> TraceResult<()> {
        self.binding.ensure_open()?;
        let node = LinkedListNode::new(self.binding.log(), value, "")?;
        node.set_next(self.head.as_ref(), "")?;
        self.shift_head(Some(node))?;
        self.size += 1;
        Ok(())
    }

    /// Insert before position `index`, or at the end when `index` is `None`
    /// or past the end
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn insert(&mut self, value: impl Into<Value>, index: Option<usize>) -> TraceResult<()> {
        let index = index.unwrap_or(self.size).min(self.size);
        if index == 0 {
            return self.push_front(value);
        }
        self.binding.ensure_open()?;
        let Some(before) = self.node_at(index - 1) else {
            return self.push_front(value);
        };
        let node = LinkedListNode::new(self.binding.log(), value, "")?;
        node.set_next(before.next().as_ref(), "")?;
        before.set_next(Some(&node), "")?;
        self.size += 1;
        Ok(())
    }

    /// Remove and return the first element; the unlinked node is disposed
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the list is empty
    pub fn pop_front(&mut self) -> TraceResult<Value> {
        let Some(head) = self.head.clone() else {
            return Err(TraceError::empty(self.binding.name()));
        };
        self.binding.ensure_open()?;
        let value = head.value();
        self.shift_head(head.next())?;
        head.dispose("")?;
        self.size -= 1;
        Ok(value)
    }

    /// Read the first element
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the list is empty
    pub fn front(&self) -> TraceResult<Value> {
        match &self.head {
            Some(head) => head.read(""),
            None => Err(TraceError::empty(self.binding.name())),
        }
    }

    /// Remove every element equal to `value`, disposing the unlinked nodes.
    /// Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the list is empty
    pub fn remove(&mut self, value: impl Into<Value>) -> TraceResult<usize> {
        if self.head.is_none() {
            return Err(TraceError::empty(self.binding.name()));
        }
        self.binding.ensure_open()?;
        let value = value.into();
        let mut removed = 0;
        let mut previous: Option<LinkedListNode> = None;
        let mut current = self.head.clone();
        while let Some(node) = current {
            let next = node.next();
            if node.value() == value {
                match &previous {
                    Some(before) => before.set_next(next.as_ref(), "")?,
                    None => self.shift_head(next.clone())?,
                }
                node.dispose("")?;
                removed += 1;
            } else {
                previous = Some(node);
            }
            current = next;
        }
        self.size -= removed;
        Ok(removed)
    }

    /// Copy of the values in order, without recording
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().collect()
    }

    /// Values in order, without recording
    pub fn iter(&self) -> impl Iterator<Item = Value> {
        std::iter::successors(self.head.clone(), LinkedListNode::next).map(|node| node.value())
    }
}

impl Instrumented for ForwardList {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn state_fields(&self) -> Payload {
        head_fields(self.head.as_ref())
    }
}

impl_reference_value!(LinkedListNode, LinkedList, ForwardList);

impl std::fmt::Display for LinkedListNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.next_id() {
            Some(next) => write!(f, "LinkedListNode({}) -> {}", self.value(), next),
            None => write!(f, "LinkedListNode({}) -> {}", self.value(), NONE),
        }
    }
}
