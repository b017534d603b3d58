//! Doubly linked nodes, a head/tail holder, and a ready-made list.
//!
//! `next` links are strong and `prev` links are weak, so a chain of nodes
//! is released once nothing outside holds it.

use crate::contract::{impl_reference_value, or_default, pointer, Binding, Instrumented};
use algotrace_core::{ContainerId, ContainerKind, TraceError, TraceResult, Value};
use algotrace_log::{Payload, StateLog};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

struct NodeState {
    value: Value,
    next: Option<DoublyLinkedListNode>,
    prev: Weak<NodeShared>,
    disposed: bool,
}

struct NodeShared {
    binding: Binding,
    state: RefCell<NodeState>,
}

/// Shared handle to one doubly linked node
#[derive(Clone)]
pub struct DoublyLinkedListNode(Rc<NodeShared>);

impl DoublyLinkedListNode {
    /// Declare a detached node holding `value`
    ///
    /// # Errors
    ///
    /// Returns `Binding` if the log is sealed
    pub fn new(log: &StateLog, value: impl Into<Value>, comments: &str) -> TraceResult<Self> {
        let node = Self(Rc::new(NodeShared {
            binding: Binding::anonymous(ContainerKind::DoublyLinkedListNode, log)?,
            state: RefCell::new(NodeState {
                value: value.into(),
                next: None,
                prev: Weak::new(),
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
    pub fn next(&self) -> Option<DoublyLinkedListNode> {
        self.0.state.borrow().next.clone()
    }

    /// Predecessor, if any and still alive.
    ///
    /// The back-pointer is weak: once every handle to the predecessor is
    /// dropped this returns `None`, and later snapshots of this node show
    /// `prev` as `none`. Dropping records nothing; call
    /// [`set_prev`](Self::set_prev) or [`dispose`](Self::dispose) on the
    /// predecessor first so the trace shows the unlink.
    #[must_use]
    pub fn prev(&self) -> Option<DoublyLinkedListNode> {
        self.0.state.borrow().prev.upgrade().map(DoublyLinkedListNode)
    }

    /// Whether `dispose` has been called
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.0.state.borrow().disposed
    }

    /// Whether both handles point at the same node
    #[must_use]
    pub fn ptr_eq(&self, other: &DoublyLinkedListNode) -> bool {
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

    fn ensure_linkable(&self, other: Option<&DoublyLinkedListNode>) -> TraceResult<()> {
        self.ensure_live()?;
        if let Some(node) = other {
            node.ensure_live()?;
            self.0.binding.ensure_same_log(&node.0.binding)?;
        }
        self.0.binding.ensure_open()
    }

    fn next_id(&self) -> Option<ContainerId> {
        self.next().map(|n| n.0.binding.id())
    }

    fn prev_id(&self) -> Option<ContainerId> {
        self.prev().map(|n| n.0.binding.id())
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
        self.ensure_linkable(None)?;
        let last_value = std::mem::replace(&mut self.0.state.borrow_mut().value, value.into());
        self.emit(
            "iter",
            vec![("last_value", last_value)],
            or_default(comments, "value updated"),
        )
    }

    /// Point at a new successor, or at none. None to none records nothing.
    ///
    /// # Errors
    ///
    /// Returns `Disposed` if either node was disposed, `Binding` if the
    /// successor records into another log
    pub fn set_next(&self, next: Option<&DoublyLinkedListNode>, comments: &str) -> TraceResult<()> {
        self.ensure_linkable(next)?;
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

    /// Point at a new predecessor, or at none. None to none records nothing.
    ///
    /// # Errors
    ///
    /// Returns `Disposed` if either node was disposed, `Binding` if the
    /// predecessor records into another log
    pub fn set_prev(&self, prev: Option<&DoublyLinkedListNode>, comments: &str) -> TraceResult<()> {
        self.ensure_linkable(prev)?;
        let last_prev = self.prev_id();
        self.0.state.borrow_mut().prev = prev.map_or_else(Weak::new, |p| Rc::downgrade(&p.0));
        if last_prev.is_none() && prev.is_none() {
            return Ok(());
        }
        self.emit(
            "prev",
            vec![("last_prev", pointer(last_prev))],
            or_default(comments, "prev pointer updated"),
        )
    }

    /// Release the node. Every later mutation fails with `Disposed`.
    ///
    /// # Errors
    ///
    /// Returns `Disposed` if already disposed
    pub fn dispose(&self, comments: &str) -> TraceResult<()> {
        self.ensure_linkable(None)?;
        self.0.state.borrow_mut().disposed = true;
        self.0
            .binding
            .record("delete", Payload::new(), or_default(comments, "Node was deleted"))
    }
}

impl Instrumented for DoublyLinkedListNode {
    fn binding(&self) -> &Binding {
        &self.0.binding
    }

    fn state_fields(&self) -> Payload {
        let mut fields = Payload::with_capacity(3);
        fields.insert("value".to_string(), self.value());
        fields.insert("next".to_string(), pointer(self.next_id()));
        fields.insert("prev".to_string(), pointer(self.prev_id()));
        fields
    }
}

impl std::fmt::Debug for DoublyLinkedListNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoublyLinkedListNode")
            .field("id", &self.0.binding.id())
            .field("value", &self.value())
            .field("next", &self.next_id())
            .field("prev", &self.prev_id())
            .finish()
    }
}

fn ends_fields(head: Option<&DoublyLinkedListNode>, tail: Option<&DoublyLinkedListNode>) -> Payload {
    let mut fields = Payload::with_capacity(2);
    fields.insert("head".to_string(), pointer(head.map(Instrumented::id)));
    fields.insert("tail".to_string(), pointer(tail.map(Instrumented::id)));
    fields
}

/// Head and tail pointers with their records
#[derive(Debug)]
struct Ends {
    head: Option<DoublyLinkedListNode>,
    tail: Option<DoublyLinkedListNode>,
}

/// Holder of head and tail pointers, for hand-written doubly linked lists
#[derive(Debug)]
pub struct DoublyLinkedList {
    binding: Binding,
    ends: Ends,
}

impl DoublyLinkedList {
    /// Declare a list starting at `head`. The tail starts at `head` too.
    ///
    /// # Errors
    ///
    /// Returns `Binding` for a bad name, sealed log, or a head from another log
    pub fn new(
        name: impl Into<String>,
        log: &StateLog,
        head: Option<&DoublyLinkedListNode>,
        comments: &str,
    ) -> TraceResult<Self> {
        let binding = Binding::new(name, ContainerKind::DoublyLinkedList, log)?;
        if let Some(node) = head {
            binding.ensure_same_log(node.binding())?;
        }
        let list = Self {
            binding,
            ends: Ends {
                head: head.cloned(),
                tail: head.cloned(),
            },
        };
        list.declare(comments)?;
        Ok(list)
    }

    /// Current head
    #[must_use]
    pub fn head(&self) -> Option<DoublyLinkedListNode> {
        self.ends.head.clone()
    }

    /// Current tail
    #[must_use]
    pub fn tail(&self) -> Option<DoublyLinkedListNode> {
        self.ends.tail.clone()
    }

    fn check(&self, node: Option<&DoublyLinkedListNode>) -> TraceResult<()> {
        if let Some(node) = node {
            self.binding.ensure_same_log(node.binding())?;
        }
        self.binding.ensure_open()
    }

    /// Move the head pointer
    ///
    /// # Errors
    ///
    /// Returns `Binding` if the node records into another log
    pub fn set_head(&mut self, head: Option<&DoublyLinkedListNode>, comments: &str) -> TraceResult<()> {
        self.check(head)?;
        let last = std::mem::replace(&mut self.ends.head, head.cloned());
        self.emit(
            "head",
            vec![("last_head", pointer(last.as_ref().map(Instrumented::id)))],
            or_default(comments, "head pointer shifts"),
        )
    }

    /// Move the tail pointer
    ///
    /// # Errors
    ///
    /// Returns `Binding` if the node records into another log
    pub fn set_tail(&mut self, tail: Option<&DoublyLinkedListNode>, comments: &str) -> TraceResult<()> {
        self.check(tail)?;
        let last = std::mem::replace(&mut self.ends.tail, tail.cloned());
        self.emit(
            "tail",
            vec![("last_tail", pointer(last.as_ref().map(Instrumented::id)))],
            or_default(comments, "tail pointer shifts"),
        )
    }
}

impl Instrumented for DoublyLinkedList {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn state_fields(&self) -> Payload {
        ends_fields(self.ends.head.as_ref(), self.ends.tail.as_ref())
    }
}

/// Complete doubly linked list that manages its own nodes
#[derive(Debug)]
pub struct List {
    inner: DoublyLinkedList,
    size: usize,
}

impl List {
    /// Declare an empty list
    ///
    /// # Errors
    ///
    /// Returns `Binding` for a bad name or sealed log
    pub fn new(name: impl Into<String>, log: &StateLog, comments: &str) -> TraceResult<Self> {
        let list = Self {
            inner: DoublyLinkedList {
                binding: Binding::new(name, ContainerKind::List, log)?,
                ends: Ends { head: None, tail: None },
            },
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
    pub fn head(&self) -> Option<DoublyLinkedListNode> {
        self.inner.head()
    }

    /// Current tail node
    #[must_use]
    pub fn tail(&self) -> Option<DoublyLinkedListNode> {
        self.inner.tail()
    }

    fn new_node(&self, value: impl Into<Value>) -> TraceResult<DoublyLinkedListNode> {
        self.inner.binding.ensure_open()?;
        DoublyLinkedListNode::new(self.inner.binding.log(), value, "")
    }

    fn empty_error(&self) -> TraceError {
        TraceError::empty(self.inner.binding.name())
    }

    /// Insert at the front
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn push_front(&mut self, value: impl Into<Value>) -> TraceResult<()> {
        let node = self.new_node(value)?;
        match self.inner.head() {
            Some(head) => {
                node.set_next(Some(&head), "")?;
                head.set_prev(Some(&node), "")?;
                self.inner.set_head(Some(&node), "")?;
            }
            None => {
                self.inner.set_head(Some(&node), "")?;
                self.inner.set_tail(Some(&node), "")?;
            }
        }
        self.size += 1;
        Ok(())
    }

    /// Insert at the back
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn push_back(&mut self, value: impl Into<Value>) -> TraceResult<()> {
        let node = self.new_node(value)?;
        match self.inner.tail() {
            Some(tail) => {
                node.set_prev(Some(&tail), "")?;
                tail.set_next(Some(&node), "")?;
                self.inner.set_tail(Some(&node), "")?;
            }
            None => {
                self.inner.set_head(Some(&node), "")?;
                self.inner.set_tail(Some(&node), "")?;
            }
        }
        self.size += 1;
        Ok(())
    }

    /// Insert before position `index`, or at the back when `index` is
    /// `None` or not before the end
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn insert(&mut self, value: impl Into<Value>, index: Option<usize>) -> TraceResult<()> {
        let index = index.unwrap_or(self.size);
        if self.size == 0 || index == 0 {
            return self.push_front(value);
        }
        if index >= self.size {
            return self.push_back(value);
        }
        let Some(before) = self.node_at(index - 1) else {
            return self.push_back(value);
        };
        let Some(after) = before.next() else {
            return self.push_back(value);
        };
        let node = self.new_node(value)?;
        node.set_next(Some(&after), "")?;
        node.set_prev(Some(&before), "")?;
        after.set_prev(Some(&node), "")?;
        before.set_next(Some(&node), "")?;
        self.size += 1;
        Ok(())
    }

    fn node_at(&self, index: usize) -> Option<DoublyLinkedListNode> {
        self.nodes().nth(index)
    }

    fn nodes(&self) -> impl Iterator<Item = DoublyLinkedListNode> {
        std::iter::successors(self.inner.head(), DoublyLinkedListNode::next)
    }

    /// Remove and return the first element; the unlinked node is disposed
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the list is empty
    pub fn pop_front(&mut self) -> TraceResult<Value> {
        let head = self.inner.head().ok_or_else(|| self.empty_error())?;
        self.inner.binding.ensure_open()?;
        let value = head.value();
        let next = head.next();
        self.inner.set_head(next.as_ref(), "")?;
        match &next {
            Some(node) => node.set_prev(None, "")?,
            None => self.inner.set_tail(None, "")?,
        }
        head.dispose("")?;
        self.size -= 1;
        Ok(value)
    }

    /// Remove and return the last element; the unlinked node is disposed
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the list is empty
    pub fn pop_back(&mut self) -> TraceResult<Value> {
        let tail = self.inner.tail().ok_or_else(|| self.empty_error())?;
        self.inner.binding.ensure_open()?;
        let value = tail.value();
        let prev = tail.prev();
        self.inner.set_tail(prev.as_ref(), "")?;
        match &prev {
            Some(node) => node.set_next(None, "")?,
            None => self.inner.set_head(None, "")?,
        }
        tail.dispose("")?;
        self.size -= 1;
        Ok(value)
    }

    /// Read the first element
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the list is empty
    pub fn front(&self) -> TraceResult<Value> {
        self.inner.head().ok_or_else(|| self.empty_error())?.read("")
    }

    /// Read the last element
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the list is empty
    pub fn back(&self) -> TraceResult<Value> {
        self.inner.tail().ok_or_else(|| self.empty_error())?.read("")
    }

    /// Remove every element equal to `value`, disposing the unlinked nodes.
    /// Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the list is empty
    pub fn remove(&mut self, value: impl Into<Value>) -> TraceResult<usize> {
        if self.size == 0 {
            return Err(self.empty_error());
        }
        self.inner.binding.ensure_open()?;
        let value = value.into();
        let matching: Vec<DoublyLinkedListNode> =
            self.nodes().filter(|node| node.value() == value).collect();
        for node in &matching {
            let (prev, next) = (node.prev(), node.next());
            match &prev {
                Some(before) => before.set_next(next.as_ref(), "")?,
                None => self.inner.set_head(next.as_ref(), "")?,
            }
            match &next {
                Some(after) => after.set_prev(prev.as_ref(), "")?,
                None => self.inner.set_tail(prev.as_ref(), "")?,
            }
            node.dispose("")?;
        }
        self.size -= matching.len();
        Ok(matching.len())
    }

    /// Copy of the values in order, without recording
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().collect()
    }

    /// Values in order, without recording
    pub fn iter(&self) -> impl Iterator<Item = Value> {
        self.nodes().map(|node| node.value())
    }
}

impl Instrumented for List {
    fn binding(&self) -> &Binding {
        &self.inner.binding
    }

    fn state_fields(&self) -> Payload {
        self.inner.state_fields()
    }
}

impl_reference_value!(DoublyLinkedListNode, DoublyLinkedList, List);

#[cfg(test)]
mod tests {
    use super::*;

    fn values(list: &List) -> Vec<i64> {
        list.iter().filter_map(|v| v.as_i64()).collect()
    }

    #[test]
    fn test_node_pointers() {
        let log = StateLog::new();
        let a = DoublyLinkedListNode::new(&log, 1, "").unwrap();
        let b = DoublyLinkedListNode::new(&log, 2, "").unwrap();
        let declare = log.last().unwrap();
        assert_eq!(declare.kind(), "dllnode_declare");
        assert_eq!(declare.field("prev"), Some(&Value::from("none")));

        a.set_next(Some(&b), "").unwrap();
        b.set_prev(Some(&a), "").unwrap();
        let record = log.last().unwrap();
        assert_eq!(record.kind(), "dllnode_prev");
        assert_eq!(record.annotation(), "prev pointer updated");
        assert_eq!(record.field("prev"), Some(&Value::from(a.id().to_string())));
        assert_eq!(record.field("last_prev"), Some(&Value::from("none")));
        assert!(b.prev().unwrap().ptr_eq(&a));
    }

    #[test]
    fn test_prev_is_weak() {
        let log = StateLog::new();
        let b = DoublyLinkedListNode::new(&log, 2, "").unwrap();
        {
            let a = DoublyLinkedListNode::new(&log, 1, "").unwrap();
            b.set_prev(Some(&a), "").unwrap();
        }
        let before = log.len();
        assert!(b.prev().is_none());
        assert_eq!(log.len(), before);
        b.read("").unwrap();
        assert_eq!(log.last().unwrap().field("prev"), Some(&Value::from("none")));
    }

    #[test]
    fn test_holder_records() {
        let log = StateLog::new();
        let a = DoublyLinkedListNode::new(&log, 1, "").unwrap();
        let mut dll = DoublyLinkedList::new("dll", &log, Some(&a), "").unwrap();
        assert_eq!(log.last().unwrap().field("tail"), Some(&Value::from(a.id().to_string())));
        dll.set_tail(None, "").unwrap();
        let record = log.last().unwrap();
        assert_eq!(record.kind(), "dll_tail");
        assert_eq!(record.annotation(), "tail pointer shifts");
        assert_eq!(record.field("last_tail"), Some(&Value::from(a.id().to_string())));
    }

    #[test]
    fn test_holder_rejects_foreign_head() {
        let log = StateLog::new();
        let stranger = DoublyLinkedListNode::new(&StateLog::new(), 1, "").unwrap();
        let result = DoublyLinkedList::new("dll", &log, Some(&stranger), "");
        assert!(matches!(result, Err(TraceError::Binding { .. })));
    }

    #[test]
    fn test_list_push_and_pop() {
        let log = StateLog::new();
        let mut list = List::new("lis", &log, "").unwrap();
        assert_eq!(log.last().unwrap().kind(), "dll_declare");
        list.push_back(2).unwrap();
        list.push_front(1).unwrap();
        list.push_back(3).unwrap();
        assert_eq!(values(&list), vec![1, 2, 3]);
        assert_eq!(list.front().unwrap(), Value::Int(1));
        assert_eq!(list.back().unwrap(), Value::Int(3));
        assert_eq!(list.pop_back().unwrap(), Value::Int(3));
        assert_eq!(list.pop_front().unwrap(), Value::Int(1));
        assert_eq!(values(&list), vec![2]);
        assert!(list.head().unwrap().ptr_eq(&list.tail().unwrap()));
        assert_eq!(list.pop_front().unwrap(), Value::Int(2));
        assert!(list.head().is_none() && list.tail().is_none());
        assert!(matches!(list.pop_back(), Err(TraceError::EmptyContainer { .. })));
    }

    #[test]
    fn test_list_insert_middle() {
        let log = StateLog::new();
        let mut list = List::new("lis", &log, "").unwrap();
        for v in [1, 2, 4] {
            list.insert(v, None).unwrap();
        }
        list.insert(3, Some(2)).unwrap();
        list.insert(0, Some(0)).unwrap();
        assert_eq!(values(&list), vec![0, 1, 2, 3, 4]);
        let backwards: Vec<i64> = std::iter::successors(list.tail(), DoublyLinkedListNode::prev)
            .filter_map(|n| n.value().as_i64())
            .collect();
        assert_eq!(backwards, vec![4, 3, 2, 1, 0]);
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn test_list_remove() {
        let log = StateLog::new();
        let mut list = List::new("lis", &log, "").unwrap();
        for v in [3, 1, 3, 2, 3] {
            list.push_back(v).unwrap();
        }
        assert_eq!(list.remove(3).unwrap(), 3);
        assert_eq!(values(&list), vec![1, 2]);
        assert_eq!(list.tail().unwrap().value(), Value::Int(2));
        assert_eq!(list.head().unwrap().prev().map(|n| n.value()), None);
    }

    #[test]
    fn test_popped_node_disposed() {
        let log = StateLog::new();
        let mut list = List::new("lis", &log, "").unwrap();
        list.push_back(1).unwrap();
        let node = list.head().unwrap();
        list.pop_front().unwrap();
        assert!(node.is_disposed());
        assert_eq!(log.last().unwrap().kind(), "dllnode_delete");
        assert!(matches!(node.set_value(2, ""), Err(TraceError::Disposed { .. })));
    }
}
