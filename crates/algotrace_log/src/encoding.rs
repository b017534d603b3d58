//! Reference encoding for finished traces.
//!
//! Containers are never inlined: wherever one appears in a snapshot it is
//! written as a reference token `$<Namespace>.<Kind>:<id>`, so the
//! consumer resolves every occurrence to one logical object. The encoder
//! holds no state beyond its configuration, so encoding the same value
//! twice yields identical output.

use crate::record::{Payload, RecordDraft, StateRecord};
use algotrace_core::{ContainerRef, Key, TraceError, TraceResult, Value, DEFAULT_NAMESPACE};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

/// Encoder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Namespace written into reference tokens
    pub namespace: String,
    /// Pretty-print rendered documents
    pub pretty: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            pretty: false,
        }
    }
}

/// Trait for values the encoder can turn into a plain document tree
pub trait Encode {
    /// Convert to a serializable tree
    ///
    /// # Errors
    ///
    /// Returns `UnencodableType` if some part cannot be represented
    fn encode_with(&self, encoder: &Encoder) -> TraceResult<JsonValue>;
}

/// Stateless reference encoder
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    /// Create an encoder
    #[must_use]
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Create an encoder with a custom token namespace
    #[must_use]
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self::new(EncoderConfig {
            namespace: namespace.into(),
            ..EncoderConfig::default()
        })
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Reference token for a container
    #[must_use]
    pub fn token(&self, reference: &ContainerRef) -> String {
        reference.token(&self.config.namespace)
    }

    /// Encode anything implementing [`Encode`]
    ///
    /// # Errors
    ///
    /// Returns `UnencodableType` if some part cannot be represented
    pub fn encode<T: Encode + ?Sized>(&self, value: &T) -> TraceResult<JsonValue> {
        value.encode_with(self)
    }

    /// Encode and render as JSON text
    ///
    /// # Errors
    ///
    /// Returns `UnencodableType` or `Encoding` on failure
    pub fn to_string<T: Encode + ?Sized>(&self, value: &T) -> TraceResult<String> {
        let tree = self.encode(value)?;
        let rendered = if self.config.pretty {
            serde_json::to_string_pretty(&tree)
        } else {
            serde_json::to_string(&tree)
        };
        rendered.map_err(|e| TraceError::Encoding {
            message: e.to_string(),
        })
    }

    fn encode_float(&self, v: f64) -> TraceResult<JsonValue> {
        Number::from_f64(v)
            .map(JsonValue::Number)
            .ok_or_else(|| TraceError::UnencodableType {
                type_name: format!("non-finite float ({})", v),
            })
    }

    fn encode_key(&self, key: &Key) -> TraceResult<String> {
        match key {
            Key::Bool(b) => Ok(b.to_string()),
            Key::Int(v) => Ok(v.to_string()),
            Key::Float(v) if !v.is_finite() => Err(TraceError::UnencodableType {
                type_name: format!("non-finite float key ({})", v),
            }),
            Key::Float(v) => Ok(format!("{:?}", v)),
            Key::Str(s) => Ok(s.clone()),
            Key::Ref(r) => Ok(self.token(r)),
        }
    }

    /// Encode one value
    ///
    /// # Errors
    ///
    /// Returns `UnencodableType` for non-finite floats
    pub fn encode_value(&self, value: &Value) -> TraceResult<JsonValue> {
        self.encode(value)
    }

    /// Encode one finalized record
    ///
    /// # Errors
    ///
    /// Returns `UnencodableType` if the payload cannot be represented
    pub fn encode_record(&self, record: &StateRecord) -> TraceResult<JsonValue> {
        self.encode(record)
    }

    /// Encode a sequence of finalized records as a JSON array
    ///
    /// # Errors
    ///
    /// Returns `UnencodableType` if any payload cannot be represented
    pub fn encode_records(&self, records: &[StateRecord]) -> TraceResult<JsonValue> {
        self.encode(records)
    }

    /// Encode a record payload as a JSON object
    ///
    /// # Errors
    ///
    /// Returns `UnencodableType` if a field cannot be represented
    pub fn encode_payload(&self, payload: &Payload) -> TraceResult<JsonValue> {
        let mut object = JsonMap::with_capacity(payload.len());
        for (field, value) in payload {
            object.insert(field.clone(), self.encode(value)?);
        }
        Ok(JsonValue::Object(object))
    }

    fn encode_parts(
        &self,
        kind: &str,
        payload: Option<&Payload>,
        annotation: &str,
        autoplay: bool,
    ) -> TraceResult<JsonValue> {
        let mut object = JsonMap::with_capacity(4);
        object.insert("state_type".to_string(), JsonValue::from(kind));
        let state_def = match payload {
            Some(p) => self.encode_payload(p)?,
            None => JsonValue::Null,
        };
        object.insert("state_def".to_string(), state_def);
        object.insert("comments".to_string(), JsonValue::from(annotation));
        object.insert("autoplay".to_string(), JsonValue::Bool(autoplay));
        Ok(JsonValue::Object(object))
    }
}

impl Encode for Value {
    fn encode_with(&self, encoder: &Encoder) -> TraceResult<JsonValue> {
        match self {
            Value::Null => Ok(JsonValue::Null),
            Value::Bool(b) => Ok(JsonValue::Bool(*b)),
            Value::Int(v) => Ok(JsonValue::from(*v)),
            Value::Float(v) => encoder.encode_float(*v),
            Value::Str(s) => Ok(JsonValue::String(s.clone())),
            Value::List(items) => items
                .iter()
                .map(|item| encoder.encode(item))
                .collect::<TraceResult<Vec<_>>>()
                .map(JsonValue::Array),
            Value::Map(entries) => {
                let mut object = JsonMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let rendered = encoder.encode_key(key)?;
                    if object.contains_key(&rendered) {
                        return Err(TraceError::UnencodableType {
                            type_name: format!("map with colliding keys ({:?})", rendered),
                        });
                    }
                    object.insert(rendered, encoder.encode(value)?);
                }
                Ok(JsonValue::Object(object))
            }
            Value::Ref(r) => Ok(JsonValue::String(encoder.token(r))),
        }
    }
}

impl Encode for ContainerRef {
    fn encode_with(&self, encoder: &Encoder) -> TraceResult<JsonValue> {
        Ok(JsonValue::String(encoder.token(self)))
    }
}

impl Encode for Key {
    fn encode_with(&self, encoder: &Encoder) -> TraceResult<JsonValue> {
        Value::from(self.clone()).encode_with(encoder)
    }
}

impl Encode for Payload {
    fn encode_with(&self, encoder: &Encoder) -> TraceResult<JsonValue> {
        encoder.encode_payload(self)
    }
}

impl Encode for StateRecord {
    fn encode_with(&self, encoder: &Encoder) -> TraceResult<JsonValue> {
        encoder.encode_parts(self.kind(), self.payload(), self.annotation(), self.autoplay())
    }
}

/// Drafts encode with `autoplay: false`; use finalized records for playback output.
impl Encode for RecordDraft {
    fn encode_with(&self, encoder: &Encoder) -> TraceResult<JsonValue> {
        encoder.encode_parts(self.kind(), self.payload(), self.annotation(), false)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode_with(&self, encoder: &Encoder) -> TraceResult<JsonValue> {
        self.iter()
            .map(|item| encoder.encode(item))
            .collect::<TraceResult<Vec<_>>>()
            .map(JsonValue::Array)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode_with(&self, encoder: &Encoder) -> TraceResult<JsonValue> {
        self.as_slice().encode_with(encoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algotrace_core::{ContainerId, ContainerKind};
    use indexmap::IndexMap;
    use serde_json::json;

    fn string_ref(id: u64) -> ContainerRef {
        ContainerRef::new(ContainerKind::String, ContainerId::from_raw(id))
    }

    #[test]
    fn test_primitives_pass_through() {
        let encoder = Encoder::default();
        assert_eq!(encoder.encode(&Value::Int(3)).unwrap(), json!(3));
        assert_eq!(encoder.encode(&Value::Float(1.5)).unwrap(), json!(1.5));
        assert_eq!(encoder.encode(&Value::from("x")).unwrap(), json!("x"));
        assert_eq!(encoder.encode(&Value::Bool(true)).unwrap(), json!(true));
        assert_eq!(encoder.encode(&Value::Null).unwrap(), JsonValue::Null);
    }

    #[test]
    fn test_container_becomes_token() {
        let encoder = Encoder::default();
        let value = Value::from(vec![Value::Ref(string_ref(4)), Value::Int(1)]);
        assert_eq!(encoder.encode(&value).unwrap(), json!(["$Toolkit.String:4", 1]));
    }

    #[test]
    fn test_custom_namespace() {
        let encoder = Encoder::with_namespace("ARgorithmToolkit");
        assert_eq!(encoder.token(&string_ref(9)), "$ARgorithmToolkit.String:9");
    }

    #[test]
    fn test_token_deterministic() {
        let encoder = Encoder::default();
        let r = string_ref(12);
        assert_eq!(
            encoder.to_string(&r).unwrap(),
            encoder.to_string(&r).unwrap()
        );
    }

    #[test]
    fn test_map_keys_stringified() {
        let encoder = Encoder::default();
        let mut entries = IndexMap::new();
        entries.insert(Key::Str("abcd".to_string()), Value::Int(123));
        entries.insert(Key::Int(2), Value::from("hello"));
        entries.insert(Key::Ref(string_ref(1)), Value::Int(456));
        let encoded = encoder.encode(&Value::Map(entries)).unwrap();
        assert_eq!(
            encoded,
            json!({"abcd": 123, "2": "hello", "$Toolkit.String:1": 456})
        );
    }

    #[test]
    fn test_float_key_keeps_fraction() {
        let encoder = Encoder::default();
        let mut entries = IndexMap::new();
        entries.insert(Key::Float(2.0), Value::Int(1));
        entries.insert(Key::Float(0.5), Value::Int(2));
        let encoded = encoder.encode(&Value::Map(entries)).unwrap();
        assert_eq!(encoded, json!({"2.0": 1, "0.5": 2}));
    }

    #[test]
    fn test_colliding_keys_are_unencodable() {
        let encoder = Encoder::default();
        let mut entries = IndexMap::new();
        entries.insert(Key::Int(1), Value::from("a"));
        entries.insert(Key::Str("1".to_string()), Value::from("c"));
        assert_eq!(entries.len(), 2);
        let result = encoder.encode(&Value::Map(entries));
        assert!(matches!(result, Err(TraceError::UnencodableType { .. })));
    }

    #[test]
    fn test_non_finite_is_unencodable() {
        let encoder = Encoder::default();
        let result = encoder.encode(&Value::Float(f64::INFINITY));
        assert!(matches!(result, Err(TraceError::UnencodableType { .. })));

        let nested = Value::from(vec![Value::Float(f64::NAN)]);
        assert!(encoder.encode(&nested).is_err());
    }

    #[test]
    fn test_record_shape() {
        let encoder = Encoder::default();
        let draft = RecordDraft::builder()
            .kind("array_swap")
            .field("id", "1")
            .field("variable_name", "arr")
            .field("index1", 0)
            .field("index2", 2)
            .annotation("swap")
            .build()
            .unwrap();
        let record = draft.finalize(false);
        let encoded = encoder.encode_record(&record).unwrap();
        assert_eq!(
            encoded,
            json!({
                "state_type": "array_swap",
                "state_def": {"id": "1", "variable_name": "arr", "index1": 0, "index2": 2},
                "comments": "swap",
                "autoplay": false
            })
        );
    }

    #[test]
    fn test_comment_state_def_null() {
        let encoder = Encoder::default();
        let record = RecordDraft::comment("narration").finalize(true);
        let encoded = encoder.encode(&record).unwrap();
        assert!(encoded["state_def"].is_null());
        assert_eq!(encoded["autoplay"], json!(true));
    }

    #[test]
    fn test_pretty_render() {
        let encoder = Encoder::new(EncoderConfig {
            pretty: true,
            ..EncoderConfig::default()
        });
        let rendered = encoder.to_string(&Value::from(vec![1, 2])).unwrap();
        assert!(rendered.contains('\n'));
    }
}
