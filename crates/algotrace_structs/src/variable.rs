//! A single named value.

use crate::contract::{Binding, Instrumented};
use algotrace_core::{ContainerKind, TraceResult, Value};
use algotrace_log::{Payload, StateLog};

/// Instrumented variable
#[derive(Debug)]
pub struct Variable {
    binding: Binding,
    value: Value,
}

impl Variable {
    /// Declare a variable holding `value`
    ///
    /// # Errors
    ///
    /// Returns `Binding` for a bad name or sealed log
    pub fn new(
        name: impl Into<String>,
        log: &StateLog,
        value: impl Into<Value>,
        comments: &str,
    ) -> TraceResult<Self> {
        let variable = Self {
            binding: Binding::new(name, ContainerKind::Variable, log)?,
            value: value.into(),
        };
        variable.declare(comments)?;
        Ok(variable)
    }

    /// Current value, without recording
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Replace the value, recording a highlight
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn set(&mut self, value: impl Into<Value>, comments: &str) -> TraceResult<()> {
        self.binding.ensure_open()?;
        let last_value = std::mem::replace(&mut self.value, value.into());
        self.emit("highlight", vec![("last_value", last_value)], comments)
    }

    /// Draw attention to the variable without changing it
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn highlight(&self, comments: &str) -> TraceResult<()> {
        self.emit("highlight", Vec::new(), comments)
    }
}

impl Instrumented for Variable {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn state_fields(&self) -> Payload {
        let mut fields = Payload::with_capacity(1);
        fields.insert("value".to_string(), self.value.clone());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_set() {
        let log = StateLog::new();
        let mut v = Variable::new("count", &log, 0, "").unwrap();
        assert_eq!(log.last().unwrap().kind(), "variable_declare");
        v.set(5, "").unwrap();
        let record = log.last().unwrap();
        assert_eq!(record.kind(), "variable_highlight");
        assert_eq!(record.field("value"), Some(&Value::Int(5)));
        assert_eq!(record.field("last_value"), Some(&Value::Int(0)));
        assert_eq!(v.value(), &Value::Int(5));
    }

    #[test]
    fn test_highlight_keeps_value() {
        let log = StateLog::new();
        let v = Variable::new("x", &log, "a", "").unwrap();
        v.highlight("look").unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.last().unwrap().field("value"), Some(&Value::from("a")));
    }
}
