//! Character string.
//!
//! Indices count characters, not bytes.

use crate::contract::{body_fields, impl_reference_value, Binding, Instrumented};
use algotrace_core::{ContainerKind, TraceError, TraceResult, Value};
use algotrace_log::{Payload, StateLog};
use std::ops::Range;

/// Instrumented string
#[derive(Debug)]
pub struct Text {
    binding: Binding,
    body: String,
}

impl Text {
    /// Declare a string
    ///
    /// # Errors
    ///
    /// Returns `Binding` for a bad name or sealed log
    pub fn new(
        name: impl Into<String>,
        log: &StateLog,
        body: impl Into<String>,
        comments: &str,
    ) -> TraceResult<Self> {
        Self::from_parts(Binding::new(name, ContainerKind::String, log)?, body.into(), comments)
    }

    fn from_parts(binding: Binding, body: String, comments: &str) -> TraceResult<Self> {
        let text = Self { binding, body };
        text.declare(comments)?;
        Ok(text)
    }

    /// Number of characters
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.chars().count()
    }

    /// Whether the string is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Contents, without recording
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.body
    }

    /// Read the character at `index`
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` outside the bounds
    pub fn get(&self, index: usize, comments: &str) -> TraceResult<String> {
        let ch = self
            .body
            .chars()
            .nth(index)
            .ok_or_else(|| TraceError::out_of_range(self.binding.name(), index, self.len()))?;
        let annotation = if comments.is_empty() {
            format!("accessing character at {}", index)
        } else {
            comments.to_string()
        };
        self.emit("iter", vec![("index", Value::from(index))], &annotation)?;
        Ok(ch.to_string())
    }

    /// Copy characters `range` into a new string `<name>_sub`
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if the range exceeds the length
    pub fn slice(&self, range: Range<usize>, comments: &str) -> TraceResult<Text> {
        let len = self.len();
        if range.start > range.end || range.end > len {
            return Err(TraceError::out_of_range(
                self.binding.name(),
                format!("{}..{}", range.start, range.end),
                len,
            ));
        }
        let annotation = if comments.is_empty() {
            format!("creating new substring for {}..{}", range.start, range.end)
        } else {
            comments.to_string()
        };
        let body: String = self.body.chars().skip(range.start).take(range.len()).collect();
        let binding = Binding::new(
            self.binding.derived_name("sub"),
            ContainerKind::String,
            self.binding.log(),
        )?;
        Self::from_parts(binding, body, &annotation)
    }

    /// Append text in place
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn append(&mut self, element: &str, comments: &str) -> TraceResult<()> {
        self.binding.ensure_open()?;
        self.body.push_str(element);
        self.emit("append", vec![("element", Value::from(element))], comments)
    }

    /// New string `<name>_super` holding this one followed by `element`
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn concat(&self, element: &str, comments: &str) -> TraceResult<Text> {
        let binding = Binding::new(
            self.binding.derived_name("super"),
            ContainerKind::String,
            self.binding.log(),
        )?;
        let declare_note = format!(
            "creating new string with {} appended to the original string",
            element
        );
        let mut joined = Self::from_parts(binding, self.body.clone(), &declare_note)?;
        joined.append(element, comments)?;
        Ok(joined)
    }

    /// Iterate the characters, recording each access
    pub fn iter(&self) -> impl Iterator<Item = TraceResult<String>> + '_ {
        (0..self.len()).map(move |i| self.get(i, ""))
    }
}

impl Instrumented for Text {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn state_fields(&self) -> Payload {
        body_fields(Value::from(self.body.as_str()))
    }
}

impl_reference_value!(Text);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_records_index() {
        let log = StateLog::new();
        let s = Text::new("s", &log, "abc", "").unwrap();
        assert_eq!(s.get(1, "").unwrap(), "b");
        let record = log.last().unwrap();
        assert_eq!(record.kind(), "string_iter");
        assert_eq!(record.annotation(), "accessing character at 1");
        assert!(s.get(3, "").is_err());
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_char_indices() {
        let log = StateLog::new();
        let s = Text::new("s", &log, "héllo", "").unwrap();
        assert_eq!(s.len(), 5);
        assert_eq!(s.get(1, "").unwrap(), "é");
    }

    #[test]
    fn test_append() {
        let log = StateLog::new();
        let mut s = Text::new("s", &log, "ab", "").unwrap();
        s.append("cd", "").unwrap();
        assert_eq!(s.as_str(), "abcd");
        let record = log.last().unwrap();
        assert_eq!(record.kind(), "string_append");
        assert_eq!(record.field("body"), Some(&Value::from("abcd")));
    }

    #[test]
    fn test_slice_and_concat() {
        let log = StateLog::new();
        let s = Text::new("s", &log, "hello", "").unwrap();
        let sub = s.slice(1..3, "").unwrap();
        assert_eq!(sub.as_str(), "el");
        assert_eq!(sub.name(), "s_sub");
        let joined = s.concat("!", "").unwrap();
        assert_eq!(joined.as_str(), "hello!");
        assert_eq!(joined.name(), "s_super");
        assert_eq!(s.as_str(), "hello");
        let records = log.records();
        let kinds: Vec<&str> = records.iter().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec!["string_declare", "string_declare", "string_declare", "string_append"]
        );
    }
}
