//! Column storage for table fields.
//!
//! This module provides:
//!
//! - **TypedColumn**: growable, densely indexed storage for one native type
//! - **Column**: the closed set of column variants a table can hold, with the
//!   typed accessor family and its widening rules
//!
//! Typed reads and writes succeed when the source type widens to the target
//! type (see [`DataType::widens_to`]). The generic `get`/`set` pair exchanges
//! [`Value`]s and applies the more permissive coercion of
//! [`NativeType::coerce`].

pub mod typed;

pub use typed::{NativeType, TypedColumn, DEFAULT_CAPACITY};

use crate::error::{DataError, DataResult};
use crate::event::{ColumnEvent, ListenerId};
use crate::value::{DataType, Value};
use chrono::NaiveDateTime;

pub type IntColumn = TypedColumn<i32>;
pub type LongColumn = TypedColumn<i64>;
pub type FloatColumn = TypedColumn<f32>;
pub type DoubleColumn = TypedColumn<f64>;
pub type BooleanColumn = TypedColumn<bool>;
pub type StringColumn = TypedColumn<String>;
pub type DateColumn = TypedColumn<NaiveDateTime>;
pub type ObjectColumn = TypedColumn<Value>;

/// A column of any supported type.
#[derive(Debug)]
pub enum Column {
    Int(IntColumn),
    Long(LongColumn),
    Float(FloatColumn),
    Double(DoubleColumn),
    Boolean(BooleanColumn),
    String(StringColumn),
    Date(DateColumn),
    Object(ObjectColumn),
}

macro_rules! dispatch {
    ($self:expr, $col:ident => $body:expr) => {
        match $self {
            Column::Int($col) => $body,
            Column::Long($col) => $body,
            Column::Float($col) => $body,
            Column::Double($col) => $body,
            Column::Boolean($col) => $body,
            Column::String($col) => $body,
            Column::Date($col) => $body,
            Column::Object($col) => $body,
        }
    };
}

impl Column {
    /// Create a column of the given type with `nrows` rows and room for
    /// `capacity`, every slot holding `default`.
    ///
    /// The default is coerced to the column type like a generic `set`.
    pub fn new(
        data_type: DataType,
        nrows: usize,
        capacity: usize,
        default: Value,
    ) -> DataResult<Self> {
        fn typed<T: NativeType>(
            nrows: usize,
            capacity: usize,
            default: Value,
        ) -> DataResult<TypedColumn<T>> {
            if default.is_null() && !T::DATA_TYPE.accepts_null() {
                return Err(DataError::NullRejected(T::DATA_TYPE));
            }
            TypedColumn::with_capacity(nrows, capacity, T::coerce(default)?)
        }

        Ok(match data_type {
            DataType::Int => Column::Int(typed(nrows, capacity, default)?),
            DataType::Long => Column::Long(typed(nrows, capacity, default)?),
            DataType::Float => Column::Float(typed(nrows, capacity, default)?),
            DataType::Double => Column::Double(typed(nrows, capacity, default)?),
            DataType::Boolean => Column::Boolean(typed(nrows, capacity, default)?),
            DataType::String => Column::String(typed(nrows, capacity, default)?),
            DataType::Date => Column::Date(typed(nrows, capacity, default)?),
            DataType::Object => Column::Object(typed(nrows, capacity, default)?),
        })
    }

    /// Create an empty column holding the type's natural default.
    pub fn empty(data_type: DataType) -> Self {
        match data_type {
            DataType::Int => Column::Int(TypedColumn::new(0)),
            DataType::Long => Column::Long(TypedColumn::new(0)),
            DataType::Float => Column::Float(TypedColumn::new(0.0)),
            DataType::Double => Column::Double(TypedColumn::new(0.0)),
            DataType::Boolean => Column::Boolean(TypedColumn::new(false)),
            DataType::String => Column::String(TypedColumn::new(String::new())),
            DataType::Date => Column::Date(TypedColumn::new(crate::value::epoch())),
            DataType::Object => Column::Object(TypedColumn::new(Value::Null)),
        }
    }

    pub fn data_type(&self) -> DataType {
        dispatch!(self, c => c.data_type())
    }

    pub fn row_count(&self) -> usize {
        dispatch!(self, c => c.row_count())
    }

    pub fn capacity(&self) -> usize {
        dispatch!(self, c => c.capacity())
    }

    pub fn set_maximum_row(&mut self, nrows: usize) {
        dispatch!(self, c => c.set_maximum_row(nrows))
    }

    pub fn is_read_only(&self) -> bool {
        dispatch!(self, c => c.is_read_only())
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        dispatch!(self, c => c.set_read_only(read_only))
    }

    pub fn default_value(&self) -> Value {
        dispatch!(self, c => c.default_value().to_value())
    }

    /// Whether a typed read of `requested` can succeed on this column.
    ///
    /// Object columns only guarantee generic (`Object`) reads; typed reads on
    /// them depend on the stored value.
    pub fn can_get(&self, requested: DataType) -> bool {
        self.data_type().widens_to(requested)
    }

    /// Whether a typed write of `supplied` can succeed on this column.
    pub fn can_set(&self, supplied: DataType) -> bool {
        !self.is_read_only() && supplied.widens_to(self.data_type())
    }

    // ------------------------------------------------------------------------
    // Generic access

    /// Read a cell as a generic value. Always succeeds for an in-bounds row.
    pub fn get(&self, row: usize) -> DataResult<Value> {
        dispatch!(self, c => c.get_value(row))
    }

    pub fn set(&mut self, row: usize, value: Value) -> DataResult<()> {
        self.apply(row, value).map(drop)
    }

    pub fn revert_to_default(&mut self, row: usize) -> DataResult<()> {
        dispatch!(self, c => c.revert_to_default(row))
    }

    pub(crate) fn apply(&mut self, row: usize, value: Value) -> DataResult<Option<ColumnEvent>> {
        dispatch!(self, c => c.apply_value(row, value))
    }

    pub(crate) fn apply_default(&mut self, row: usize) -> DataResult<Option<ColumnEvent>> {
        dispatch!(self, c => c.apply(row, c.default_value().clone()))
    }

    pub(crate) fn reset(&mut self, row: usize) {
        dispatch!(self, c => c.reset(row))
    }

    pub fn add_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&ColumnEvent) + Send + Sync + 'static,
    {
        dispatch!(self, c => c.add_listener(listener))
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        dispatch!(self, c => c.remove_listener(id))
    }

    fn mismatch(&self, requested: DataType) -> DataError {
        DataError::mismatch(requested, self.data_type().as_str())
    }

    fn object_read<T>(
        &self,
        col: &ObjectColumn,
        row: usize,
        requested: DataType,
        read: impl FnOnce(&Value) -> Option<T>,
    ) -> DataResult<T> {
        let value = col.get(row)?;
        read(value).ok_or_else(|| DataError::mismatch(requested, value.type_name()))
    }

    // ------------------------------------------------------------------------
    // Typed reads

    pub fn get_int(&self, row: usize) -> DataResult<i32> {
        match self {
            Column::Int(c) => c.get(row).copied(),
            Column::Object(c) => self.object_read(c, row, DataType::Int, Value::as_int),
            _ => Err(self.mismatch(DataType::Int)),
        }
    }

    pub fn get_long(&self, row: usize) -> DataResult<i64> {
        match self {
            Column::Int(c) => c.get(row).map(|v| i64::from(*v)),
            Column::Long(c) => c.get(row).copied(),
            Column::Object(c) => self.object_read(c, row, DataType::Long, Value::as_long),
            _ => Err(self.mismatch(DataType::Long)),
        }
    }

    pub fn get_float(&self, row: usize) -> DataResult<f32> {
        match self {
            Column::Int(c) => c.get(row).map(|v| *v as f32),
            Column::Long(c) => c.get(row).map(|v| *v as f32),
            Column::Float(c) => c.get(row).copied(),
            Column::Object(c) => self.object_read(c, row, DataType::Float, Value::as_float),
            _ => Err(self.mismatch(DataType::Float)),
        }
    }

    /// Read as `f64`. Exact for every `i32` and `f32`.
    pub fn get_double(&self, row: usize) -> DataResult<f64> {
        match self {
            Column::Int(c) => c.get(row).map(|v| f64::from(*v)),
            Column::Long(c) => c.get(row).map(|v| *v as f64),
            Column::Float(c) => c.get(row).map(|v| f64::from(*v)),
            Column::Double(c) => c.get(row).copied(),
            Column::Object(c) => self.object_read(c, row, DataType::Double, Value::as_double),
            _ => Err(self.mismatch(DataType::Double)),
        }
    }

    pub fn get_boolean(&self, row: usize) -> DataResult<bool> {
        match self {
            Column::Boolean(c) => c.get(row).copied(),
            Column::Object(c) => self.object_read(c, row, DataType::Boolean, Value::as_bool),
            _ => Err(self.mismatch(DataType::Boolean)),
        }
    }

    pub fn get_string(&self, row: usize) -> DataResult<String> {
        match self {
            Column::String(c) => c.get(row).cloned(),
            Column::Object(c) => {
                self.object_read(c, row, DataType::String, |v| v.as_str().map(str::to_string))
            }
            _ => Err(self.mismatch(DataType::String)),
        }
    }

    pub fn get_date(&self, row: usize) -> DataResult<NaiveDateTime> {
        match self {
            Column::Date(c) => c.get(row).copied(),
            Column::Object(c) => self.object_read(c, row, DataType::Date, Value::as_date),
            _ => Err(self.mismatch(DataType::Date)),
        }
    }

    // ------------------------------------------------------------------------
    // Typed writes

    pub fn set_int(&mut self, row: usize, value: i32) -> DataResult<()> {
        self.apply_int(row, value).map(drop)
    }

    pub fn set_long(&mut self, row: usize, value: i64) -> DataResult<()> {
        self.apply_long(row, value).map(drop)
    }

    pub fn set_float(&mut self, row: usize, value: f32) -> DataResult<()> {
        self.apply_float(row, value).map(drop)
    }

    pub fn set_double(&mut self, row: usize, value: f64) -> DataResult<()> {
        self.apply_double(row, value).map(drop)
    }

    pub fn set_boolean(&mut self, row: usize, value: bool) -> DataResult<()> {
        self.apply_boolean(row, value).map(drop)
    }

    pub fn set_string(&mut self, row: usize, value: impl Into<String>) -> DataResult<()> {
        self.apply_string(row, value.into()).map(drop)
    }

    pub fn set_date(&mut self, row: usize, value: NaiveDateTime) -> DataResult<()> {
        self.apply_date(row, value).map(drop)
    }

    pub(crate) fn apply_int(&mut self, row: usize, value: i32) -> DataResult<Option<ColumnEvent>> {
        match self {
            Column::Int(c) => c.apply(row, value),
            Column::Long(c) => c.apply(row, i64::from(value)),
            Column::Float(c) => c.apply(row, value as f32),
            Column::Double(c) => c.apply(row, f64::from(value)),
            Column::Object(c) => c.apply(row, Value::Int(value)),
            _ => Err(DataError::mismatch(self.data_type(), "int")),
        }
    }

    pub(crate) fn apply_long(&mut self, row: usize, value: i64) -> DataResult<Option<ColumnEvent>> {
        match self {
            Column::Long(c) => c.apply(row, value),
            Column::Float(c) => c.apply(row, value as f32),
            Column::Double(c) => c.apply(row, value as f64),
            Column::Object(c) => c.apply(row, Value::Long(value)),
            _ => Err(DataError::mismatch(self.data_type(), "long")),
        }
    }

    pub(crate) fn apply_float(
        &mut self,
        row: usize,
        value: f32,
    ) -> DataResult<Option<ColumnEvent>> {
        match self {
            Column::Float(c) => c.apply(row, value),
            Column::Double(c) => c.apply(row, f64::from(value)),
            Column::Object(c) => c.apply(row, Value::Float(value)),
            _ => Err(DataError::mismatch(self.data_type(), "float")),
        }
    }

    pub(crate) fn apply_double(
        &mut self,
        row: usize,
        value: f64,
    ) -> DataResult<Option<ColumnEvent>> {
        match self {
            Column::Double(c) => c.apply(row, value),
            Column::Object(c) => c.apply(row, Value::Double(value)),
            _ => Err(DataError::mismatch(self.data_type(), "double")),
        }
    }

    pub(crate) fn apply_boolean(
        &mut self,
        row: usize,
        value: bool,
    ) -> DataResult<Option<ColumnEvent>> {
        match self {
            Column::Boolean(c) => c.apply(row, value),
            Column::Object(c) => c.apply(row, Value::Boolean(value)),
            _ => Err(DataError::mismatch(self.data_type(), "boolean")),
        }
    }

    pub(crate) fn apply_string(
        &mut self,
        row: usize,
        value: String,
    ) -> DataResult<Option<ColumnEvent>> {
        match self {
            Column::String(c) => c.apply(row, value),
            Column::Object(c) => c.apply(row, Value::String(value)),
            _ => Err(DataError::mismatch(self.data_type(), "string")),
        }
    }

    pub(crate) fn apply_date(
        &mut self,
        row: usize,
        value: NaiveDateTime,
    ) -> DataResult<Option<ColumnEvent>> {
        match self {
            Column::Date(c) => c.apply(row, value),
            Column::Object(c) => c.apply(row, Value::Date(value)),
            _ => Err(DataError::mismatch(self.data_type(), "date")),
        }
    }
}
