//! Single-type column storage.

use crate::error::{DataError, DataResult};
use crate::event::{ColumnEvent, ListenerId, Listeners};
use crate::value::{parse_date, DataType, Value};
use chrono::NaiveDateTime;
use std::fmt;

/// Capacity of a column created without an explicit capacity.
pub const DEFAULT_CAPACITY: usize = 10;

/// A Rust type that can back a column.
pub trait NativeType: Clone + fmt::Debug + Send + 'static {
    /// Type descriptor of columns storing this type.
    const DATA_TYPE: DataType;

    fn to_value(&self) -> Value;

    /// Convert a generic value for storage.
    ///
    /// Numeric values are converted with `as` semantics (float to integer
    /// truncates toward zero and saturates, NaN becomes 0, long to int wraps).
    /// Strings are parsed with the native parser. Null is rejected unless
    /// the type can hold it.
    fn coerce(value: Value) -> DataResult<Self>;

    /// Equality used to suppress no-op writes.
    fn same(&self, other: &Self) -> bool;
}

fn reject(expected: DataType, value: &Value) -> DataError {
    match value {
        Value::Null => DataError::NullRejected(expected),
        Value::String(s) => DataError::mismatch(expected, format!("string {:?}", s)),
        other => DataError::mismatch(expected, other.type_name()),
    }
}

macro_rules! numeric_native {
    ($ty:ty, $variant:ident, $same:expr) => {
        impl NativeType for $ty {
            const DATA_TYPE: DataType = DataType::$variant;

            fn to_value(&self) -> Value {
                Value::$variant(*self)
            }

            fn coerce(value: Value) -> DataResult<Self> {
                match value {
                    Value::Int(v) => Ok(v as $ty),
                    Value::Long(v) => Ok(v as $ty),
                    Value::Float(v) => Ok(v as $ty),
                    Value::Double(v) => Ok(v as $ty),
                    Value::String(ref s) => s
                        .trim()
                        .parse::<$ty>()
                        .map_err(|_| reject(Self::DATA_TYPE, &value)),
                    other => Err(reject(Self::DATA_TYPE, &other)),
                }
            }

            fn same(&self, other: &Self) -> bool {
                let same: fn(&$ty, &$ty) -> bool = $same;
                same(self, other)
            }
        }
    };
}

numeric_native!(i32, Int, |a, b| a == b);
numeric_native!(i64, Long, |a, b| a == b);
// bit equality, so NaN over NaN is a no-op
numeric_native!(f32, Float, |a, b| a.to_bits() == b.to_bits());
numeric_native!(f64, Double, |a, b| a.to_bits() == b.to_bits());

impl NativeType for bool {
    const DATA_TYPE: DataType = DataType::Boolean;

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }

    fn coerce(value: Value) -> DataResult<Self> {
        match value {
            Value::Boolean(v) => Ok(v),
            Value::String(ref s) => s
                .trim()
                .to_ascii_lowercase()
                .parse::<bool>()
                .map_err(|_| reject(DataType::Boolean, &value)),
            other => Err(reject(DataType::Boolean, &other)),
        }
    }

    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl NativeType for String {
    const DATA_TYPE: DataType = DataType::String;

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn coerce(value: Value) -> DataResult<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(reject(DataType::String, &other)),
        }
    }

    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

impl NativeType for NaiveDateTime {
    const DATA_TYPE: DataType = DataType::Date;

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }

    fn coerce(value: Value) -> DataResult<Self> {
        match value {
            Value::Date(d) => Ok(d),
            Value::String(ref s) => parse_date(s).ok_or_else(|| reject(DataType::Date, &value)),
            other => Err(reject(DataType::Date, &other)),
        }
    }

    fn same(&self, other: &Self) -> bool {
        self == other
    }
}

/// Object columns store the generic value itself and accept anything.
impl NativeType for Value {
    const DATA_TYPE: DataType = DataType::Object;

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn coerce(value: Value) -> DataResult<Self> {
        Ok(value)
    }

    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }
}

/// Densely indexed, growable storage for one native type.
///
/// `values.len()` is the capacity. Every slot at or beyond `size` holds the
/// default value.
pub struct TypedColumn<T: NativeType> {
    values: Vec<T>,
    size: usize,
    default: T,
    read_only: bool,
    listeners: Listeners<ColumnEvent>,
}

impl<T: NativeType> TypedColumn<T> {
    /// Create an empty column with the default capacity.
    pub fn new(default: T) -> Self {
        Self::build(0, DEFAULT_CAPACITY, default)
    }

    /// Create a column with `nrows` rows, all holding `default`.
    pub fn with_rows(nrows: usize, default: T) -> Self {
        Self::build(nrows, nrows, default)
    }

    pub fn with_capacity(nrows: usize, capacity: usize, default: T) -> DataResult<Self> {
        if capacity < nrows {
            return Err(DataError::InvalidCapacity {
                rows: nrows,
                capacity,
            });
        }
        Ok(Self::build(nrows, capacity, default))
    }

    fn build(nrows: usize, capacity: usize, default: T) -> Self {
        Self {
            values: vec![default.clone(); capacity],
            size: nrows,
            default,
            read_only: false,
            listeners: Listeners::new(),
        }
    }

    pub fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    pub fn row_count(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Set the logical row count, growing the backing storage if needed.
    ///
    /// Growth is to `max(3 * capacity / 2 + 1, nrows)`. Capacity never shrinks.
    pub fn set_maximum_row(&mut self, nrows: usize) {
        let capacity = self.values.len();
        if nrows > capacity {
            let grown = ((3 * capacity) / 2 + 1).max(nrows);
            log::debug!(
                "growing {} column from {} to {} slots",
                T::DATA_TYPE,
                capacity,
                grown
            );
            self.values.resize(grown, self.default.clone());
        } else if nrows < self.size {
            for slot in &mut self.values[nrows..self.size] {
                *slot = self.default.clone();
            }
        }
        self.size = nrows;
    }

    fn check_row(&self, row: usize) -> DataResult<()> {
        if row >= self.size {
            return Err(DataError::OutOfBounds {
                row,
                size: self.size,
            });
        }
        Ok(())
    }

    pub fn get(&self, row: usize) -> DataResult<&T> {
        self.check_row(row)?;
        Ok(&self.values[row])
    }

    pub fn get_value(&self, row: usize) -> DataResult<Value> {
        self.get(row).map(T::to_value)
    }

    pub fn set(&mut self, row: usize, value: T) -> DataResult<()> {
        self.apply(row, value).map(drop)
    }

    /// Coerce a generic value to the native type and store it.
    pub fn set_value(&mut self, row: usize, value: Value) -> DataResult<()> {
        self.apply_value(row, value).map(drop)
    }

    /// Store a value, returning the event that was fired, or `None` when the
    /// value was unchanged.
    pub(crate) fn apply(&mut self, row: usize, value: T) -> DataResult<Option<ColumnEvent>> {
        if self.read_only {
            return Err(DataError::ReadOnly);
        }
        self.check_row(row)?;

        let slot = &mut self.values[row];
        if slot.same(&value) {
            return Ok(None);
        }
        let previous = std::mem::replace(slot, value);

        let event = ColumnEvent {
            row,
            previous: previous.to_value(),
        };
        self.listeners.fire(&event);
        Ok(Some(event))
    }

    pub(crate) fn apply_value(
        &mut self,
        row: usize,
        value: Value,
    ) -> DataResult<Option<ColumnEvent>> {
        if self.read_only {
            return Err(DataError::ReadOnly);
        }
        self.check_row(row)?;
        if value.is_null() && !T::DATA_TYPE.accepts_null() {
            return Err(DataError::NullRejected(T::DATA_TYPE));
        }
        let native = T::coerce(value)?;
        self.apply(row, native)
    }

    pub fn revert_to_default(&mut self, row: usize) -> DataResult<()> {
        self.apply(row, self.default.clone()).map(drop)
    }

    /// Put the default back into a cell without notifying listeners.
    pub(crate) fn reset(&mut self, row: usize) {
        if let Some(slot) = self.values.get_mut(row) {
            *slot = self.default.clone();
        }
    }

    pub fn add_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&ColumnEvent) + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }
}

impl<T: NativeType> fmt::Debug for TypedColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedColumn")
            .field("data_type", &T::DATA_TYPE)
            .field("size", &self.size)
            .field("capacity", &self.values.len())
            .field("default", &self.default)
            .field("read_only", &self.read_only)
            .field("listeners", &self.listeners)
            .finish()
    }
}
