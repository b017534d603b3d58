//! Insertion-ordered key/value map.
//!
//! Keys are primitives or container references; values are primitives
//! or containers. Absent values are recorded as `"none"`.

use crate::contract::{body_fields, impl_reference_value, Binding, Instrumented, NONE};
use algotrace_core::{ContainerKind, Key, TraceError, TraceResult, Value};
use algotrace_log::{Payload, StateLog};
use indexmap::IndexMap;

/// Instrumented map
#[derive(Debug)]
pub struct Map {
    binding: Binding,
    body: IndexMap<Key, Value>,
}

impl Map {
    /// Declare an empty map
    ///
    /// # Errors
    ///
    /// Returns `Binding` for a bad name or sealed log
    pub fn new(name: impl Into<String>, log: &StateLog, comments: &str) -> TraceResult<Self> {
        let map = Self {
            binding: Binding::new(name, ContainerKind::Map, log)?,
            body: IndexMap::new(),
        };
        map.declare(comments)?;
        Ok(map)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the map is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Copy of the contents
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Map(self.body.clone())
    }

    /// Whether `key` is present, without recording
    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        self.body.contains_key(key)
    }

    /// Keys in insertion order, without recording
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.body.keys()
    }

    /// Values in insertion order, without recording
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.body.values()
    }

    /// Entries in insertion order, without recording
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.body.iter()
    }

    fn missing(&self, key: &Key) -> TraceError {
        TraceError::KeyNotFound {
            container: self.binding.name().to_string(),
            key: key.to_string(),
        }
    }

    /// Insert or overwrite an entry
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` or `InvalidValue` for unstorable input
    pub fn set(
        &mut self,
        key: impl Into<Value>,
        value: impl Into<Value>,
        comments: &str,
    ) -> TraceResult<()> {
        let key = Key::try_from(key.into())?;
        let value = value.into();
        value.ensure_storable()?;
        self.binding.ensure_open()?;
        let last_value = self
            .body
            .insert(key.clone(), value.clone())
            .unwrap_or_else(|| Value::from(NONE));
        self.emit(
            "set",
            vec![
                ("key", Value::from(key)),
                ("value", value),
                ("last_value", last_value),
            ],
            comments,
        )
    }

    /// Read an entry
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if absent, `InvalidKey` for an unhashable key
    pub fn get(&self, key: impl Into<Value>, comments: &str) -> TraceResult<Value> {
        let key = Key::try_from(key.into())?;
        let value = self.body.get(&key).cloned().ok_or_else(|| self.missing(&key))?;
        self.emit(
            "get",
            vec![("key", Value::from(key)), ("value", value.clone())],
            comments,
        )?;
        Ok(value)
    }

    /// Read an entry, falling back to `default` when absent.
    ///
    /// A miss is still recorded, carrying the default.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` for an unhashable key
    pub fn get_or(
        &self,
        key: impl Into<Value>,
        default: impl Into<Value>,
        comments: &str,
    ) -> TraceResult<Value> {
        let key = Key::try_from(key.into())?;
        if let Some(value) = self.body.get(&key).cloned() {
            self.emit(
                "get",
                vec![("key", Value::from(key)), ("value", value.clone())],
                comments,
            )?;
            return Ok(value);
        }
        let default = default.into();
        let recorded = if default.is_null() { Value::from(NONE) } else { default.clone() };
        let annotation = format!("key not found. value defaulted to {}", recorded);
        self.emit(
            "get",
            vec![("key", Value::from(key)), ("value", recorded)],
            &annotation,
        )?;
        Ok(default)
    }

    /// Remove an entry if present, recording either way
    ///
    /// # Errors
    ///
    /// Returns `InvalidKey` for an unhashable key
    pub fn remove(&mut self, key: impl Into<Value>, comments: &str) -> TraceResult<Option<Value>> {
        let key = Key::try_from(key.into())?;
        self.binding.ensure_open()?;
        match self.body.shift_remove(&key) {
            Some(value) => {
                self.emit(
                    "remove",
                    vec![("key", Value::from(key)), ("value", value.clone())],
                    comments,
                )?;
                Ok(Some(value))
            }
            None => {
                self.emit(
                    "remove",
                    vec![("key", Value::from(key)), ("value", Value::from(NONE))],
                    "key not found, nothing removed.",
                )?;
                Ok(None)
            }
        }
    }

    /// Remove an entry that must be present
    ///
    /// # Errors
    ///
    /// Returns `KeyNotFound` if absent, `InvalidKey` for an unhashable key
    pub fn delete(&mut self, key: impl Into<Value>, comments: &str) -> TraceResult<Value> {
        let key = Key::try_from(key.into())?;
        if !self.body.contains_key(&key) {
            return Err(self.missing(&key));
        }
        self.remove(key, comments)?
            .ok_or_else(|| TraceError::invalid_value("entry vanished during delete"))
    }
}

impl Instrumented for Map {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn state_fields(&self) -> Payload {
        body_fields(self.to_value())
    }
}

impl_reference_value!(Map);
