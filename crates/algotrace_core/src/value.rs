//! Snapshot values.
//!
//! A [`Value`] is a plain, owned copy of container contents. Snapshots
//! never alias live container bodies; nested containers appear only as
//! [`Value::Ref`].

use crate::error::{TraceError, TraceResult};
use crate::id::ContainerRef;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// A snapshot value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value, rendered as `none`
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text
    Str(String),
    /// Ordered sequence
    List(Vec<Value>),
    /// Insertion-ordered mapping
    Map(IndexMap<Key, Value>),
    /// Reference to another instrumented container
    Ref(ContainerRef),
}

impl Value {
    /// Short type description used in error messages
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Ref(_) => "container",
        }
    }

    /// Whether this is [`Value::Null`]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this is a primitive (bool, int, float, str)
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::Str(_))
    }

    /// Integer view of numeric values
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Float view of numeric values
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }

    /// Text view
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Container reference view
    #[must_use]
    pub fn as_container(&self) -> Option<ContainerRef> {
        match self {
            Self::Ref(r) => Some(*r),
            _ => None,
        }
    }

    /// List view
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Check that the value may be stored in a map or set: a primitive or a container.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for none, raw lists and raw maps
    pub fn ensure_storable(&self) -> TraceResult<()> {
        if self.is_primitive() || matches!(self, Self::Ref(_)) {
            Ok(())
        } else {
            Err(TraceError::invalid_value(format!(
                "value cannot be {}, expected a primitive or a container",
                self.type_name()
            )))
        }
    }

    /// Default comparator: numeric difference `a - b`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if either operand is not numeric
    pub fn difference(a: &Value, b: &Value) -> TraceResult<Value> {
        if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
            return Ok(match x.checked_sub(y) {
                Some(d) => Value::Int(d),
                None => Value::Float(x as f64 - y as f64),
            });
        }
        match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(Value::Float(x - y)),
            _ => Err(TraceError::invalid_value(format!(
                "cannot subtract {} from {}",
                b.type_name(),
                a.type_name()
            ))),
        }
    }

    /// Total ordering between two comparable values.
    ///
    /// Numbers compare with numbers and text with text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for incomparable operands or NaN
    pub fn try_cmp(a: &Value, b: &Value) -> TraceResult<Ordering> {
        if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
            return Ok(x.cmp(&y));
        }
        if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
            return x
                .partial_cmp(&y)
                .ok_or_else(|| TraceError::invalid_value("NaN is not comparable"));
        }
        match (a, b) {
            (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
            _ => Err(TraceError::invalid_value(format!(
                "cannot order {} against {}",
                a.type_name(),
                b.type_name()
            ))),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("none"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
            Self::Ref(r) => write!(f, "{}", r),
        }
    }
}

macro_rules! value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

value_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! value_from_wide_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                match i64::try_from(v) {
                    Ok(i) => Value::Int(i),
                    Err(_) => Value::Float(v as f64),
                }
            }
        })*
    };
}

value_from_wide_int!(u64, usize, isize, i128, u128);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

impl From<ContainerRef> for Value {
    fn from(r: ContainerRef) -> Self {
        Value::Ref(r)
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<IndexMap<Key, Value>> for Value {
    fn from(entries: IndexMap<Key, Value>) -> Self {
        Value::Map(entries)
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        match key {
            Key::Bool(b) => Value::Bool(b),
            Key::Int(v) => Value::Int(v),
            Key::Float(v) => Value::Float(v),
            Key::Str(s) => Value::Str(s),
            Key::Ref(r) => Value::Ref(r),
        }
    }
}

/// A hashable map key or set member.
///
/// Numeric keys compare by value across variants: `Bool(true)`, `Int(1)`
/// and `Float(1.0)` are the same key. A map or set keeps whichever form
/// was inserted first.
#[derive(Debug, Clone)]
pub enum Key {
    /// Boolean key
    Bool(bool),
    /// Integer key
    Int(i64),
    /// Float key; integral floats equal the matching `Int`
    Float(f64),
    /// Text key
    Str(String),
    /// Container key
    Ref(ContainerRef),
}

/// Identity used for key equality and hashing
#[derive(PartialEq, Eq, Hash)]
enum Canonical<'a> {
    Int(i64),
    Float(u64),
    Str(&'a str),
    Ref(ContainerRef),
}

impl Key {
    fn canonical(&self) -> Canonical<'_> {
        match self {
            Self::Bool(b) => Canonical::Int(i64::from(*b)),
            Self::Int(v) => Canonical::Int(*v),
            Self::Float(v) => match integral(*v) {
                Some(i) => Canonical::Int(i),
                None => Canonical::Float(v.to_bits()),
            },
            Self::Str(s) => Canonical::Str(s),
            Self::Ref(r) => Canonical::Ref(*r),
        }
    }
}

/// The `i64` an integral float equals, if it fits
fn integral(v: f64) -> Option<i64> {
    // 2^63 is the first float past i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (v.is_finite() && v.fract() == 0.0 && v >= -LIMIT && v < LIMIT).then_some(v as i64)
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl TryFrom<Value> for Key {
    type Error = TraceError;

    fn try_from(value: Value) -> TraceResult<Self> {
        match value {
            Value::Bool(b) => Ok(Key::Bool(b)),
            Value::Int(v) => Ok(Key::Int(v)),
            Value::Float(v) if v.is_nan() => Err(TraceError::InvalidKey {
                reason: "NaN is not hashable".to_string(),
            }),
            Value::Float(v) if v.is_infinite() => Err(TraceError::InvalidKey {
                reason: format!("{} cannot be rendered as a key", v),
            }),
            Value::Float(v) => Ok(Key::Float(v)),
            Value::Str(s) => Ok(Key::Str(s)),
            Value::Ref(r) => Ok(Key::Ref(r)),
            other => Err(TraceError::InvalidKey {
                reason: format!(
                    "key cannot be {}, expected (int, float, str, bool) or a container",
                    other.type_name()
                ),
            }),
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Str(s) => f.write_str(s),
            Self::Ref(r) => write!(f, "{}", r),
        }
    }
}
