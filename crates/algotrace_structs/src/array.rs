//! Fixed-shape n-dimensional array.
//!
//! Elements are stored row-major next to the shape, so a snapshot
//! rebuilds the nested lists from a flat buffer.

use crate::contract::{body_fields, impl_reference_value, Binding, Instrumented};
use algotrace_core::{ContainerKind, TraceError, TraceResult, Value};
use algotrace_log::{Payload, StateLog};
use std::ops::Range;

/// Anything usable as an array index: `2`, `(0, 2)`, `[1, 0, 3]`
pub trait ArrayIndex {
    /// Position along each leading dimension
    fn positions(&self) -> Vec<usize>;
}

impl ArrayIndex for usize {
    fn positions(&self) -> Vec<usize> {
        vec![*self]
    }
}

impl ArrayIndex for (usize, usize) {
    fn positions(&self) -> Vec<usize> {
        vec![self.0, self.1]
    }
}

impl ArrayIndex for (usize, usize, usize) {
    fn positions(&self) -> Vec<usize> {
        vec![self.0, self.1, self.2]
    }
}

impl<const N: usize> ArrayIndex for [usize; N] {
    fn positions(&self) -> Vec<usize> {
        self.to_vec()
    }
}

impl ArrayIndex for &[usize] {
    fn positions(&self) -> Vec<usize> {
        self.to_vec()
    }
}

impl ArrayIndex for Vec<usize> {
    fn positions(&self) -> Vec<usize> {
        self.clone()
    }
}

/// Index as it appears in records: a scalar for one dimension, a list otherwise
fn index_value(positions: &[usize]) -> Value {
    match positions {
        [single] => Value::from(*single),
        many => Value::List(many.iter().map(|&p| Value::from(p)).collect()),
    }
}

fn index_label(positions: &[usize]) -> String {
    match positions {
        [single] => single.to_string(),
        many => {
            let parts: Vec<String> = many.iter().map(ToString::to_string).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// Work out the shape of nested lists, rejecting ragged input
fn shape_of(value: &Value) -> TraceResult<Vec<usize>> {
    let Value::List(items) = value else {
        return Ok(Vec::new());
    };
    let Some(first) = items.first() else {
        return Ok(vec![0]);
    };
    let inner = shape_of(first)?;
    for item in &items[1..] {
        if shape_of(item)? != inner {
            return Err(TraceError::invalid_value(
                "array rows should all have the same dimensions",
            ));
        }
    }
    let mut shape = Vec::with_capacity(inner.len() + 1);
    shape.push(items.len());
    shape.extend(inner);
    Ok(shape)
}

fn flatten_into(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::List(items) => items.into_iter().for_each(|item| flatten_into(item, out)),
        leaf => out.push(leaf),
    }
}

fn nest(shape: &[usize], data: &[Value]) -> Value {
    match shape {
        [] => data.first().cloned().unwrap_or_default(),
        [_] => Value::List(data.to_vec()),
        [rows, rest @ ..] => {
            let stride: usize = rest.iter().product();
            Value::List(
                (0..*rows)
                    .map(|r| nest(rest, &data[r * stride..(r + 1) * stride]))
                    .collect(),
            )
        }
    }
}

/// Instrumented n-dimensional array
#[derive(Debug)]
pub struct Array {
    binding: Binding,
    shape: Vec<usize>,
    data: Vec<Value>,
}

impl Array {
    /// Declare an array from (possibly nested) lists.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for scalars or ragged rows, `Binding` for a
    /// bad name or sealed log
    pub fn new(
        name: impl Into<String>,
        log: &StateLog,
        data: impl Into<Value>,
        comments: &str,
    ) -> TraceResult<Self> {
        let data = data.into();
        if !matches!(data, Value::List(_)) {
            return Err(TraceError::invalid_value(format!(
                "array data should be a list, got {}",
                data.type_name()
            )));
        }
        let shape = shape_of(&data)?;
        let mut flat = Vec::with_capacity(shape.iter().product());
        flatten_into(data, &mut flat);
        Self::from_parts(Binding::new(name, ContainerKind::Array, log)?, shape, flat, comments)
    }

    /// Declare an array of `shape` with every element set to `fill`
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` for an empty or overflowing shape, `Binding`
    /// for a bad name or sealed log
    pub fn filled(
        name: impl Into<String>,
        log: &StateLog,
        shape: &[usize],
        fill: impl Into<Value>,
        comments: &str,
    ) -> TraceResult<Self> {
        if shape.is_empty() {
            return Err(TraceError::invalid_value("array shape needs at least one dimension"));
        }
        let len = shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| TraceError::invalid_value(format!("array shape {:?} is too large", shape)))?;
        let data = vec![fill.into(); len];
        Self::from_parts(
            Binding::new(name, ContainerKind::Array, log)?,
            shape.to_vec(),
            data,
            comments,
        )
    }

    fn from_parts(
        binding: Binding,
        shape: Vec<usize>,
        data: Vec<Value>,
        comments: &str,
    ) -> TraceResult<Self> {
        let array = Self { binding, shape, data };
        array.declare(comments)?;
        Ok(array)
    }

    /// Length of the first dimension
    #[must_use]
    pub fn len(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    /// Whether the first dimension is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of every dimension
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Nested-list copy of the contents, without recording
    #[must_use]
    pub fn to_value(&self) -> Value {
        nest(&self.shape, &self.data)
    }

    /// Check bounds and return the flat offset of the selected block and its size
    fn locate(&self, positions: &[usize]) -> TraceResult<(usize, usize)> {
        if positions.is_empty() || positions.len() > self.shape.len() {
            return Err(TraceError::out_of_range(
                self.binding.name(),
                index_label(positions),
                self.len(),
            ));
        }
        let mut offset = 0;
        for (dim, (&pos, &size)) in positions.iter().zip(&self.shape).enumerate() {
            if pos >= size {
                return Err(TraceError::out_of_range(self.binding.name(), pos, size));
            }
            let stride: usize = self.shape[dim + 1..].iter().product();
            offset += pos * stride;
        }
        let block: usize = self.shape[positions.len()..].iter().product();
        Ok((offset, block))
    }

    fn element_offset(&self, positions: &[usize]) -> TraceResult<usize> {
        if positions.len() != self.shape.len() {
            return Err(TraceError::invalid_value(format!(
                "index {} of {} selects a sub-array, use sub()",
                index_label(positions),
                self.binding.name()
            )));
        }
        self.locate(positions).map(|(offset, _)| offset)
    }

    /// Read one element.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` outside the bounds, `InvalidValue` if the
    /// index does not address a single element
    pub fn get(&self, index: impl ArrayIndex, comments: &str) -> TraceResult<Value> {
        let positions = index.positions();
        let offset = self.element_offset(&positions)?;
        self.emit("iter", vec![("index", index_value(&positions))], comments)?;
        Ok(self.data[offset].clone())
    }

    /// Overwrite one element
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` outside the bounds, `InvalidValue` if the
    /// index does not address a single element
    pub fn set(
        &mut self,
        index: impl ArrayIndex,
        value: impl Into<Value>,
        comments: &str,
    ) -> TraceResult<()> {
        let positions = index.positions();
        let offset = self.element_offset(&positions)?;
        self.binding.ensure_open()?;
        let value = value.into();
        let last_value = std::mem::replace(&mut self.data[offset], value.clone());
        let annotation = if comments.is_empty() {
            format!("Writing {} at index {}", value, index_label(&positions))
        } else {
            comments.to_string()
        };
        self.emit(
            "iter",
            vec![
                ("index", index_value(&positions)),
                ("value", value),
                ("last_value", last_value),
            ],
            &annotation,
        )
    }

    /// Select a sub-array along the leading dimensions, declared as `<name>_sub`
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` outside the bounds, `InvalidValue` if the
    /// index addresses a single element
    pub fn sub(&self, index: impl ArrayIndex, comments: &str) -> TraceResult<Array> {
        let positions = index.positions();
        if positions.len() >= self.shape.len() {
            return Err(TraceError::invalid_value(format!(
                "index {} of {} selects an element, use get()",
                index_label(&positions),
                self.binding.name()
            )));
        }
        let (offset, block) = self.locate(&positions)?;
        let binding = Binding::new(self.binding.derived_name("sub"), ContainerKind::Array, self.binding.log())?;
        self.emit("iter", vec![("index", index_value(&positions))], comments)?;
        let shape = self.shape[positions.len()..].to_vec();
        let data = self.data[offset..offset + block].to_vec();
        Self::from_parts(binding, shape, data, comments)
    }

    /// Copy rows `range` of the first dimension into a new array `<name>_sub`
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if the range exceeds the first dimension
    pub fn slice(&self, range: Range<usize>, comments: &str) -> TraceResult<Array> {
        if range.start > range.end || range.end > self.len() {
            return Err(TraceError::out_of_range(
                self.binding.name(),
                format!("{}..{}", range.start, range.end),
                self.len(),
            ));
        }
        let stride: usize = self.shape[1..].iter().product();
        let mut shape = self.shape.clone();
        shape[0] = range.len();
        let data = self.data[range.start * stride..range.end * stride].to_vec();
        let binding = Binding::new(self.binding.derived_name("sub"), ContainerKind::Array, self.binding.log())?;
        Self::from_parts(binding, shape, data, comments)
    }

    /// Compare two elements as `a - b`
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for bad indices, `InvalidValue` for
    /// non-numeric elements
    pub fn compare(
        &self,
        first: impl ArrayIndex,
        second: impl ArrayIndex,
        comments: &str,
    ) -> TraceResult<Value> {
        self.compare_by(first, second, Value::difference, comments)?
    }

    /// Compare two elements with a caller-supplied comparator
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for bad indices
    pub fn compare_by<R>(
        &self,
        first: impl ArrayIndex,
        second: impl ArrayIndex,
        compare: impl FnOnce(&Value, &Value) -> R,
        comments: &str,
    ) -> TraceResult<R> {
        let (i, j) = (first.positions(), second.positions());
        let (a, b) = (self.element_offset(&i)?, self.element_offset(&j)?);
        self.emit(
            "compare",
            vec![("index1", index_value(&i)), ("index2", index_value(&j))],
            comments,
        )?;
        Ok(compare(&self.data[a], &self.data[b]))
    }

    /// Swap two elements
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` for bad indices
    pub fn swap(
        &mut self,
        first: impl ArrayIndex,
        second: impl ArrayIndex,
        comments: &str,
    ) -> TraceResult<()> {
        let (i, j) = (first.positions(), second.positions());
        let (a, b) = (self.element_offset(&i)?, self.element_offset(&j)?);
        self.binding.ensure_open()?;
        self.data.swap(a, b);
        self.emit(
            "swap",
            vec![("index1", index_value(&i)), ("index2", index_value(&j))],
            comments,
        )
    }

    /// Iterate the elements of a one-dimensional array, recording each access
    pub fn iter(&self) -> impl Iterator<Item = TraceResult<Value>> + '_ {
        (0..self.len()).map(move |i| self.get(i, ""))
    }

    /// Iterate the rows of a multi-dimensional array as `<name>_sub` arrays
    pub fn rows(&self) -> impl Iterator<Item = TraceResult<Array>> + '_ {
        (0..self.len()).map(move |i| self.sub(i, ""))
    }
}

impl Instrumented for Array {
    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn state_fields(&self) -> Payload {
        body_fields(self.to_value())
    }
}

impl_reference_value!(Array);
