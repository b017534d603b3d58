//! Last-in first-out stack.

use crate::contract::{body_fields, impl_reference_value, Binding, Instrumented};
use algotrace_core::{ContainerKind, TraceError, TraceResult, Value};
use algotrace_log::{Payload, StateLog};

/// Instrumented stack
#[derive(Debug)]
pub struct Stack {
    binding: Binding,
    body: Vec<Value>,
}

impl Stack {
    /// Declare an empty stack
    ///
    /// # Errors
    ///
    /// Returns `Binding` for a bad name or sealed log
    pub fn new(name: impl Into<String>, log: &StateLog, comments: &str) -> TraceResult<Self> {
        let stack = Self {
            binding: Binding::new(name, ContainerKind::Stack, log)?,
            body: Vec::new(),
        };
        stack.declare(comments)?;
        Ok(stack)
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the stack is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Copy of the contents, bottom first
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::List(self.body.clone())
    }

    /// Push onto the top
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn push(&mut self, element: impl Into<Value>, comments: &str) -> TraceResult<()> {
        self.binding.ensure_open()?;
        let element = element.into();
        self.body.push(element.clone());
        self.emit("push", vec![("element", element)], comments)
    }

    /// Remove and return the top
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the stack is empty
    pub fn pop(&mut self, comments: &str) -> TraceResult<Value> {
        if self.body.is_empty() {
            return Err(TraceError::empty(self.binding.name()));
        }
        self.binding.ensure_open()?;
        let top = self.body.pop().unwrap_or_default();
        self.emit("pop", Vec::new(), comments)?;
        Ok(top)
    }

    /// Read the top without removing it
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if the stack is empty
    pub fn top(&self, comments: &str) -> TraceResult<Value> {
        let top = self
            .body
            .last()
            .cloned()
            .ok_or_else(|| TraceError::empty(self.binding.name()))?;
        self.emit("top", Vec::new(), comments)?;
        Ok(top)
    }
}

impl Instrumented for Stack {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn state_fields(&self) -> Payload {
        body_fields(self.to_value())
    }
}

impl_reference_value!(Stack);
