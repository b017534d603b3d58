//! First-in first-out queue.

use crate::contract::{body_fields, impl_reference_value, Binding, Instrumented};
use algotrace_core::{ContainerKind, TraceError, TraceResult, Value};
use algotrace_log::{Payload, StateLog};
use std::collections::VecDeque;

/// Instrumented queue
#[derive(Debug)]
pub struct Queue {
    binding: Binding,
    body: VecDeque<Value>,
}

impl Queue {
    /// Declare an empty queue
    ///
    /// # Errors
    ///
    /// Returns `Binding` for a bad name or sealed log
    pub fn new(name: impl Into<String>, log: &StateLog, comments: &str) -> TraceResult<Self> {
        let queue = Self {
            binding: Binding::new(name, ContainerKind::Queue, log)?,
            body: VecDeque::new(),
        };
        queue.declare(comments)?;
        Ok(queue)
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Copy of the contents, front first
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::List(self.body.iter().cloned().collect())
    }

    /// Enqueue at the back
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn push(&mut self, element: impl Into<Value>, comments: &str) -> TraceResult<()> {
        self.binding.ensure_open()?;
        let element = element.into();
        self.body.push_back(element.clone());
        self.emit("push", vec![("element", element)], comments)
    }

    /// Dequeue from the front
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the queue is empty
    pub fn pop(&mut self, comments: &str) -> TraceResult<Value> {
        if self.body.is_empty() {
            return Err(TraceError::empty(self.binding.name()));
        }
        self.binding.ensure_open()?;
        let front = self.body.pop_front().unwrap_or_default();
        self.emit("pop", Vec::new(), comments)?;
        Ok(front)
    }

    /// Read the front
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the queue is empty
    pub fn front(&self, comments: &str) -> TraceResult<Value> {
        let front = self
            .body
            .front()
            .cloned()
            .ok_or_else(|| TraceError::empty(self.binding.name()))?;
        self.emit("front", Vec::new(), comments)?;
        Ok(front)
    }

    /// Read the back
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the queue is empty
    pub fn back(&self, comments: &str) -> TraceResult<Value> {
        let back = self
            .body
            .back()
            .cloned()
            .ok_or_else(|| TraceError::empty(self.binding.name()))?;
        self.emit("back", Vec::new(), comments)?;
        Ok(back)
    }
}

impl Instrumented for Queue {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn state_fields(&self) -> Payload {
        body_fields(self.to_value())
    }
}

impl_reference_value!(Queue);
