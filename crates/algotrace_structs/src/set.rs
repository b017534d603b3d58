//! Insertion-ordered set of primitives and container references.

use crate::contract::{body_fields, impl_reference_value, Binding, Instrumented};
use algotrace_core::{ContainerKind, Key, TraceError, TraceResult, Value};
use algotrace_log::{Payload, StateLog};
use indexmap::IndexSet;

/// Instrumented set
#[derive(Debug)]
pub struct Set {
    binding: Binding,
    body: IndexSet<Key>,
}

impl Set {
    /// Declare an empty set
    ///
    /// # Errors
    ///
    /// Returns `Binding` for a bad name or sealed log
    pub fn new(name: impl Into<String>, log: &StateLog, comments: &str) -> TraceResult<Self> {
        Self::from_keys(Binding::new(name, ContainerKind::Set, log)?, IndexSet::new(), comments)
    }

    /// Declare a set holding `values`
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` if any value is unhashable, `Binding` for a bad
    /// name or sealed log
    pub fn from_values<T: Into<Value>>(
        name: impl Into<String>,
        log: &StateLog,
        values: impl IntoIterator<Item = T>,
        comments: &str,
    ) -> TraceResult<Self> {
        let body = values
            .into_iter()
            .map(|v| Key::try_from(v.into()))
            .collect::<TraceResult<IndexSet<Key>>>()?;
        Self::from_keys(Binding::new(name, ContainerKind::Set, log)?, body, comments)
    }

    fn from_keys(binding: Binding, body: IndexSet<Key>, comments: &str) -> TraceResult<Self> {
        let set = Self { binding, body };
        set.declare(comments)?;
        Ok(set)
    }

    /// Number of members
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Copy of the members
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::List(self.body.iter().cloned().map(Value::from).collect())
    }

    /// Members in insertion order, without recording
    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.body.iter()
    }

    /// Add a member
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` for an unhashable value
    pub fn add(&mut self, key: impl Into<Value>, comments: &str) -> TraceResult<()> {
        let key = Key::try_from(key.into())?;
        self.binding.ensure_open()?;
        self.body.insert(key.clone());
        self.emit("add", vec![("key", Value::from(key))], comments)
    }

    /// Remove a member that must be present
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if absent, `InvalidKey` for an unhashable value
    pub fn remove(&mut self, key: impl Into<Value>, comments: &str) -> TraceResult<()> {
        let key = Key::try_from(key.into())?;
        if !self.body.contains(&key) {
            return Err(TraceError::KeyNotFound {
                container: self.binding.name().to_string(),
                key: key.to_string(),
            });
        }
        self.binding.ensure_open()?;
        self.body.shift_remove(&key);
        self.emit("remove", vec![("key", Value::from(key))], comments)
    }

    /// Test membership
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` for an unhashable value
    pub fn find(&self, key: impl Into<Value>, comments: &str) -> TraceResult<bool> {
        let key = Key::try_from(key.into())?;
        let found = self.body.contains(&key);
        self.emit(
            "find",
            vec![("key", Value::from(key)), ("found", Value::Bool(found))],
            comments,
        )?;
        Ok(found)
    }

    fn combine(
        &self,
        other: &Set,
        operation: &str,
        members: IndexSet<Key>,
        comments: &str,
    ) -> TraceResult<Set> {
        self.binding.ensure_same_log(&other.binding)?;
        let name = format!("{}_{}_{}", self.binding.name(), operation, other.binding.name());
        let annotation = if comments.is_empty() {
            format!(
                "Creating new set with {} of {} and {}",
                operation,
                self.binding.name(),
                other.binding.name()
            )
        } else {
            comments.to_string()
        };
        let binding = Binding::new(name, ContainerKind::Set, self.binding.log())?;
        Self::from_keys(binding, members, &annotation)
    }

    /// New set with the members of both, named `<a>_union_<b>`
    ///
    /// # Errors
    ///
    /// Returns `Binding` if the sets record into different logs
    pub fn union(&self, other: &Set, comments: &str) -> TraceResult<Set> {
        let members = self.body.union(&other.body).cloned().collect();
        self.combine(other, "union", members, comments)
    }

    /// New set with the shared members, named `<a>_intersection_<b>`
    ///
    /// # Errors
    ///
    /// Returns `Binding` if the sets record into different logs
    pub fn intersection(&self, other: &Set, comments: &str) -> TraceResult<Set> {
        let members = self.body.intersection(&other.body).cloned().collect();
        self.combine(other, "intersection", members, comments)
    }

    /// New set with the members not in `other`, named `<a>_difference_<b>`
    ///
    /// # Errors
    ///
    /// Returns `Binding` if the sets record into different logs
    pub fn difference(&self, other: &Set, comments: &str) -> TraceResult<Set> {
        let members = self.body.difference(&other.body).cloned().collect();
        self.combine(other, "difference", members, comments)
    }
}

impl Instrumented for Set {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn state_fields(&self) -> Payload {
        body_fields(self.to_value())
    }
}

impl_reference_value!(Set);
