//! Growable sequence.

use crate::contract::{body_fields, impl_reference_value, Binding, Instrumented};
use algotrace_core::{ContainerKind, TraceError, TraceResult, Value};
use algotrace_log::{Payload, StateLog};
use std::ops::Range;

/// Instrumented vector
#[derive(Debug)]
pub struct Vector {
    binding: Binding,
    body: Vec<Value>,
}

impl Vector {
    /// Declare a vector holding `items`
    ///
    /// # Errors
    ///
    /// Returns `Binding` for a bad name or sealed log
    pub fn new<T: Into<Value>>(
        name: impl Into<String>,
        log: &StateLog,
        items: impl IntoIterator<Item = T>,
        comments: &str,
    ) -> TraceResult<Self> {
        let body = items.into_iter().map(Into::into).collect();
        Self::from_parts(Binding::new(name, ContainerKind::Vector, log)?, body, comments)
    }

    /// Declare an empty vector
    ///
    /// # Errors
    ///
    /// Returns `Binding` for a bad name or sealed log
    pub fn empty(name: impl Into<String>, log: &StateLog, comments: &str) -> TraceResult<Self> {
        Self::from_parts(Binding::new(name, ContainerKind::Vector, log)?, Vec::new(), comments)
    }

    fn from_parts(binding: Binding, body: Vec<Value>, comments: &str) -> TraceResult<Self> {
        let vector = Self { binding, body };
        vector.declare(comments)?;
        Ok(vector)
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the vector is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Copy of the contents, without recording
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::List(self.body.clone())
    }

    fn check(&self, index: usize) -> TraceResult<()> {
        if index < self.body.len() {
            Ok(())
        } else {
            Err(TraceError::out_of_range(self.binding.name(), index, self.body.len()))
        }
    }

    /// Read one element
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` outside the bounds
    pub fn get(&self, index: usize, comments: &str) -> TraceResult<Value> {
        self.check(index)?;
        self.emit("iter", vec![("index", Value::from(index))], comments)?;
        Ok(self.body[index].clone())
    }

    /// Overwrite one element
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` outside the bounds
    pub fn set(&mut self, index: usize, value: impl Into<Value>, comments: &str) -> TraceResult<()> {
        self.check(index)?;
        self.binding.ensure_open()?;
        let value = value.into();
        let last_value = std::mem::replace(&mut self.body[index], value.clone());
        let annotation = if comments.is_empty() {
            format!("Writing {} at index {}", value, index)
        } else {
            comments.to_string()
        };
        self.emit(
            "iter",
            vec![
                ("index", Value::from(index)),
                ("value", value),
                ("last_value", last_value),
            ],
            &annotation,
        )
    }

    /// Insert `value` at `index`, or at the end when `index` is `None`
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if `index` exceeds the length
    pub fn insert(
        &mut self,
        value: impl Into<Value>,
        index: Option<usize>,
        comments: &str,
    ) -> TraceResult<()> {
        let index = index.unwrap_or(self.body.len());
        if index > self.body.len() {
            return Err(TraceError::out_of_range(self.binding.name(), index, self.body.len()));
        }
        self.binding.ensure_open()?;
        let value = value.into();
        self.body.insert(index, value.clone());
        self.emit(
            "insert",
            vec![("element", value), ("index", Value::from(index))],
            comments,
        )
    }

    /// Append to the end
    ///
    /// # Errors
    ///
    /// Returns `LogSealed` once recording has ended
    pub fn push(&mut self, value: impl Into<Value>, comments: &str) -> TraceResult<()> {
        self.insert(value, None, comments)
    }

    /// Remove and return the element at `index`
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` outside the bounds
    pub fn remove_at(&mut self, index: usize, comments: &str) -> TraceResult<Value> {
        self.check(index)?;
        self.binding.ensure_open()?;
        let removed = self.body.remove(index);
        self.emit("remove", vec![("index", Value::from(index))], comments)?;
        Ok(removed)
    }

    /// Remove and return the last element
    ///
    /// # Errors
    ///
    /// Returns `EmptyContainer` if there is nothing to remove
    pub fn pop(&mut self, comments: &str) -> TraceResult<Value> {
        match self.body.len() {
            0 => Err(TraceError::empty(self.binding.name())),
            len => self.remove_at(len - 1, comments),
        }
    }

    /// Remove the first element equal to `value`
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if no element matches
    pub fn remove_value(&mut self, value: impl Into<Value>, comments: &str) -> TraceResult<()> {
        let value = value.into();
        let index = self
            .body
            .iter()
            .position(|v| *v == value)
            .ok_or_else(|| TraceError::KeyNotFound {
                container: self.binding.name().to_string(),
                key: value.to_string(),
            })?;
        self.remove_at(index, comments).map(|_| ())
    }

    /// Compare two elements as `a - b`
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for bad indices, `InvalidValue` for
    /// non-numeric elements
    pub fn compare(&self, first: usize, second: usize, comments: &str) -> TraceResult<Value> {
        self.compare_by(first, second, Value::difference, comments)?
    }

    /// Compare two elements with a caller-supplied comparator
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for bad indices
    pub fn compare_by<R>(
        &self,
        first: usize,
        second: usize,
        compare: impl FnOnce(&Value, &Value) -> R,
        comments: &str,
    ) -> TraceResult<R> {
        self.check(first)?;
        self.check(second)?;
        self.emit(
            "compare",
            vec![("index1", Value::from(first)), ("index2", Value::from(second))],
            comments,
        )?;
        Ok(compare(&self.body[first], &self.body[second]))
    }

    /// Swap two elements
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for bad indices
    pub fn swap(&mut self, first: usize, second: usize, comments: &str) -> TraceResult<()> {
        self.check(first)?;
        self.check(second)?;
        self.binding.ensure_open()?;
        self.body.swap(first, second);
        self.emit(
            "swap",
            vec![("index1", Value::from(first)), ("index2", Value::from(second))],
            comments,
        )
    }

    /// Copy `range` into a new vector `<name>_sub`
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if the range exceeds the length
    pub fn slice(&self, range: Range<usize>, comments: &str) -> TraceResult<Vector> {
        if range.start > range.end || range.end > self.body.len() {
            return Err(TraceError::out_of_range(
                self.binding.name(),
                format!("{}..{}", range.start, range.end),
                self.body.len(),
            ));
        }
        let binding = Binding::new(
            self.binding.derived_name("sub"),
            ContainerKind::Vector,
            self.binding.log(),
        )?;
        Self::from_parts(binding, self.body[range].to_vec(), comments)
    }

    /// Iterate the elements, recording each access
    pub fn iter(&self) -> impl Iterator<Item = TraceResult<Value>> + '_ {
        (0..self.body.len()).map(move |i| self.get(i, ""))
    }
}

impl Instrumented for Vector {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn state_fields(&self) -> Payload {
        body_fields(self.to_value())
    }
}

impl_reference_value!(Vector);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_positions() {
        let log = StateLog::new();
        let mut v = Vector::new("v", &log, vec![1, 3], "").unwrap();
        v.insert(2, Some(1), "").unwrap();
        v.push(4, "").unwrap();
        assert_eq!(v.to_value(), Value::from(vec![1, 2, 3, 4]));
        let record = log.last().unwrap();
        assert_eq!(record.kind(), "vector_insert");
        assert_eq!(record.field("index"), Some(&Value::Int(3)));
        assert_eq!(record.field("element"), Some(&Value::Int(4)));
    }

    #[test]
    fn test_insert_out_of_range() {
        let log = StateLog::new();
        let mut v = Vector::empty("v", &log, "").unwrap();
        assert!(matches!(
            v.insert(1, Some(2), ""),
            Err(TraceError::IndexOutOfRange { .. })
        ));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_pop_empty() {
        let log = StateLog::new();
        let mut v = Vector::empty("v", &log, "").unwrap();
        assert!(matches!(v.pop(""), Err(TraceError::EmptyContainer { .. })));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_remove_records_index() {
        let log = StateLog::new();
        let mut v = Vector::new("v", &log, vec!["a", "b", "c"], "").unwrap();
        v.remove_value("b", "").unwrap();
        let record = log.last().unwrap();
        assert_eq!(record.kind(), "vector_remove");
        assert_eq!(record.field("index"), Some(&Value::Int(1)));
        assert_eq!(v.pop("").unwrap(), Value::from("c"));
        assert!(v.remove_value("z", "").is_err());
    }

    #[test]
    fn test_swap_and_compare() {
        let log = StateLog::new();
        let mut v = Vector::new("v", &log, vec![3, 1], "").unwrap();
        assert_eq!(v.compare(0, 1, "").unwrap(), Value::Int(2));
        v.swap(0, 1, "").unwrap();
        assert_eq!(v.to_value(), Value::from(vec![1, 3]));
        assert_eq!(log.last().unwrap().kind(), "vector_swap");
    }

    #[test]
    fn test_snapshot_is_copy() {
        let log = StateLog::new();
        let mut v = Vector::new("v", &log, vec![1], "").unwrap();
        v.push(2, "").unwrap();
        let records = log.records();
        assert_eq!(records.get(0).unwrap().field("body"), Some(&Value::from(vec![1])));
        assert_eq!(records.get(1).unwrap().field("body"), Some(&Value::from(vec![1, 2])));
    }

    #[test]
    fn test_slice() {
        let log = StateLog::new();
        let v = Vector::new("v", &log, 0..5, "").unwrap();
        let part = v.slice(1..3, "").unwrap();
        assert_eq!(part.name(), "v_sub");
        assert_eq!(part.to_value(), Value::from(vec![1, 2]));
    }
}
