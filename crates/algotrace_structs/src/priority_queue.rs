//! Min-heap priority queue.
//!
//! The body is kept in binary-heap order, which is what the consumer
//! draws, so snapshots show the heap array rather than sorted contents.

use crate::contract::{body_fields, impl_reference_value, Binding, Instrumented};
use algotrace_core::{ContainerKind, TraceError, TraceResult, Value};
use algotrace_log::{Payload, StateLog};
use std::cmp::Ordering;

fn less(a: &Value, b: &Value) -> bool {
    Value::try_cmp(a, b).unwrap_or(Ordering::Equal) == Ordering::Less
}

/// Instrumented priority queue, smallest element first
#[derive(Debug)]
pub struct PriorityQueue {
    binding: Binding,
    heap: Vec<Value>,
}

impl PriorityQueue {
    /// Declare an empty priority queue
    ///
    /// # Errors
    ///
    /// Returns `Binding` for a bad name or sealed log
    pub fn new(name: impl Into<String>, log: &StateLog, comments: &str) -> TraceResult<Self> {
        let queue = Self {
            binding: Binding::new(name, ContainerKind::PriorityQueue, log)?,
            heap: Vec::new(),
        };
        queue.declare(comments)?;
        Ok(queue)
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Copy of the heap array
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::List(self.heap.clone())
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if !less(&self.heap[pos], &self.heap[parent]) {
                break;
            }
            self.heap.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let (left, right) = (2 * pos + 1, 2 * pos + 2);
            let mut smallest = pos;
            if left < len && less(&self.heap[left], &self.heap[smallest]) {
                smallest = left;
            }
            if right < len && less(&self.heap[right], &self.heap[smallest]) {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.heap.swap(pos, smallest);
            pos = smallest;
        }
    }

    /// Insert an element.
    ///
    /// Elements must be mutually ordered: numbers with numbers, text with text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if `element` cannot be ordered against the
    /// queue contents
    pub fn offer(&mut self, element: impl Into<Value>, comments: &str) -> TraceResult<()> {
        let element = element.into();
        match self.heap.first() {
            Some(root) => {
                Value::try_cmp(&element, root)?;
            }
            None => {
                Value::try_cmp(&element, &element)?;
            }
        }
        self.binding.ensure_open()?;
        self.heap.push(element.clone());
        self.sift_up(self.heap.len() - 1);
        self.emit("offer", vec![("element", element)], comments)
    }

    /// Remove and return the smallest element
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the queue is empty
    pub fn poll(&mut self, comments: &str) -> TraceResult<Value> {
        if self.heap.is_empty() {
            return Err(TraceError::empty(self.binding.name()));
        }
        self.binding.ensure_open()?;
        let smallest = self.heap.swap_remove(0);
        self.sift_down(0);
        self.emit("poll", Vec::new(), comments)?;
        Ok(smallest)
    }

    /// Read the smallest element
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the queue is empty
    pub fn peek(&self, comments: &str) -> TraceResult<Value> {
        let smallest = self
            .heap
            .first()
            .cloned()
            .ok_or_else(|| TraceError::empty(self.binding.name()))?;
        self.emit("peek", Vec::new(), comments)?;
        Ok(smallest)
    }
}

impl Instrumented for PriorityQueue {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn state_fields(&self) -> Payload {
        body_fields(self.to_value())
    }
}

impl_reference_value!(PriorityQueue);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_poll_smallest_first() {
        let log = StateLog::new();
        let mut pq = PriorityQueue::new("pq", &log, "").unwrap();
        for v in [5, 1, 4, 2] {
            pq.offer(v, "").unwrap();
        }
        assert_eq!(pq.peek("").unwrap(), Value::Int(1));
        assert_eq!(pq.poll("").unwrap(), Value::Int(1));
        assert_eq!(pq.poll("").unwrap(), Value::Int(2));
        assert_eq!(log.last().unwrap().kind(), "priorityqueue_poll");
    }

    #[test]
    fn test_heap_order_body() {
        let log = StateLog::new();
        let mut pq = PriorityQueue::new("pq", &log, "").unwrap();
        for v in [3, 2, 1] {
            pq.offer(v, "").unwrap();
        }
        assert_eq!(pq.to_value(), Value::from(vec![1, 3, 2]));
    }

    #[test]
    fn test_incomparable_rejected() {
        let log = StateLog::new();
        let mut pq = PriorityQueue::new("pq", &log, "").unwrap();
        pq.offer(1, "").unwrap();
        assert!(matches!(pq.offer("a", ""), Err(TraceError::InvalidValue { .. })));
        assert!(pq.offer(Value::Null, "").is_err());
        assert_eq!(pq.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_empty_poll() {
        let log = StateLog::new();
        let mut pq = PriorityQueue::new("pq", &log, "").unwrap();
        assert!(matches!(pq.poll(""), Err(TraceError::EmptyContainer { .. })));
        assert!(pq.peek("").is_err());
    }

    proptest! {
        #[test]
        fn prop_drains_sorted(values in proptest::collection::vec(-1000i64..1000, 0..40)) {
            let log = StateLog::new();
            let mut pq = PriorityQueue::new("pq", &log, "").unwrap();
            for v in &values {
                pq.offer(*v, "").unwrap();
            }
            let mut drained = Vec::new();
            while !pq.is_empty() {
                drained.push(pq.poll("").unwrap().as_i64().unwrap());
            }
            let mut sorted = values.clone();
            sorted.sort_unstable();
            prop_assert_eq!(drained, sorted);
        }
    }
}
