//! Tables: a schema plus one column per field, addressed by row.
//!
//! Rows are dense indices into every column. Deleting a row leaves a hole
//! that the next [`Table::add_row`] fills again, lowest hole first; tuples
//! issued for the deleted row stop working at that point.

mod field;
mod rows;

pub use field::Field;

use crate::column::{Column, DEFAULT_CAPACITY};
use crate::error::{DataError, DataResult};
use crate::event::{ColumnEvent, ListenerId, Listeners, TableEvent};
use crate::schema::Schema;
use crate::tuple::{Tuple, TupleManager};
use crate::value::{DataType, Value};
use chrono::NaiveDateTime;
use rows::RowManager;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-unique identity of a table, carried by its tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(u64);

impl TableId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        TableId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

macro_rules! typed_access {
    ($get:ident, $set:ident, $apply:ident, $ty:ty) => {
        pub fn $get<'f>(&self, row: usize, field: impl Into<Field<'f>>) -> DataResult<$ty> {
            let col = self.cell(row, field.into())?;
            self.columns[col].$get(row)
        }

        pub fn $set<'f>(
            &mut self,
            row: usize,
            field: impl Into<Field<'f>>,
            value: $ty,
        ) -> DataResult<()> {
            let col = self.cell(row, field.into())?;
            let event = self.columns[col].$apply(row, value)?;
            self.forward(col, event);
            Ok(())
        }
    };
}

#[derive(Debug)]
pub struct Table {
    id: TableId,
    schema: Arc<Schema>,
    columns: Vec<Column>,
    rows: RowManager,
    tuples: TupleManager,
    listeners: Listeners<TableEvent>,
}

impl Table {
    /// Create an empty table for `schema`.
    pub fn new(schema: impl Into<Arc<Schema>>) -> DataResult<Self> {
        Self::with_capacity(schema, 0, DEFAULT_CAPACITY)
    }

    /// Create a table with `nrows` live rows, all holding field defaults, and
    /// room for `capacity` rows before the columns reallocate.
    pub fn with_capacity(
        schema: impl Into<Arc<Schema>>,
        nrows: usize,
        capacity: usize,
    ) -> DataResult<Self> {
        let schema = schema.into();
        let columns = schema
            .columns()
            .iter()
            .map(|info| Column::new(info.data_type, nrows, capacity, info.default.clone()))
            .collect::<DataResult<Vec<_>>>()?;
        Ok(Self::from_parts(schema, columns, nrows))
    }

    fn from_parts(schema: Arc<Schema>, columns: Vec<Column>, nrows: usize) -> Self {
        let id = TableId::next();
        log::debug!("created table {:?} with {} and {} rows", id, schema, nrows);
        Self {
            id,
            schema,
            columns,
            rows: RowManager::with_rows(nrows),
            tuples: TupleManager::new(id),
            listeners: Listeners::new(),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    // ------------------------------------------------------------------------
    // Field introspection

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.schema.column_name(index)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.index_of(name)
    }

    pub fn column_type<'f>(&self, field: impl Into<Field<'f>>) -> Option<DataType> {
        self.position(field.into()).ok().map(|i| self.columns[i].data_type())
    }

    pub fn column<'f>(&self, field: impl Into<Field<'f>>) -> DataResult<&Column> {
        let col = self.position(field.into())?;
        Ok(&self.columns[col])
    }

    pub fn default_value<'f>(&self, field: impl Into<Field<'f>>) -> DataResult<Value> {
        Ok(self.column(field)?.default_value())
    }

    /// Whether a typed read of `requested` from `field` would succeed.
    /// Unknown fields answer false.
    pub fn can_get<'f>(&self, field: impl Into<Field<'f>>, requested: DataType) -> bool {
        self.column(field).map_or(false, |c| c.can_get(requested))
    }

    /// Whether a typed write of `supplied` into `field` would succeed.
    /// Unknown fields answer false.
    pub fn can_set<'f>(&self, field: impl Into<Field<'f>>, supplied: DataType) -> bool {
        self.column(field).map_or(false, |c| c.can_set(supplied))
    }

    pub fn is_read_only<'f>(&self, field: impl Into<Field<'f>>) -> DataResult<bool> {
        Ok(self.column(field)?.is_read_only())
    }

    pub fn set_read_only<'f>(
        &mut self,
        field: impl Into<Field<'f>>,
        read_only: bool,
    ) -> DataResult<()> {
        let col = self.position(field.into())?;
        self.columns[col].set_read_only(read_only);
        Ok(())
    }

    fn position(&self, field: Field<'_>) -> DataResult<usize> {
        match field {
            Field::Name(name) => self
                .schema
                .index_of(name)
                .ok_or_else(|| DataError::UnknownField(name.to_string())),
            Field::Index(index) if index < self.columns.len() => Ok(index),
            Field::Index(index) => Err(DataError::ColumnIndexOutOfBounds {
                index,
                count: self.columns.len(),
            }),
        }
    }

    fn check_row(&self, row: usize) -> DataResult<()> {
        if row >= self.rows.max_row() {
            return Err(DataError::OutOfBounds {
                row,
                size: self.rows.max_row(),
            });
        }
        if !self.rows.is_valid(row) {
            return Err(DataError::InvalidRow(row));
        }
        Ok(())
    }

    fn cell(&self, row: usize, field: Field<'_>) -> DataResult<usize> {
        let col = self.position(field)?;
        self.check_row(row)?;
        Ok(col)
    }

    // ------------------------------------------------------------------------
    // Rows

    /// Number of live rows.
    pub fn row_count(&self) -> usize {
        self.rows.row_count()
    }

    /// Number of allocated row slots, including deleted ones.
    pub fn max_row(&self) -> usize {
        self.rows.max_row()
    }

    pub fn is_valid_row(&self, row: usize) -> bool {
        self.rows.is_valid(row)
    }

    /// Live row indices in ascending order.
    pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.rows()
    }

    /// Add a row holding field defaults and return its index.
    pub fn add_row(&mut self) -> usize {
        let (row, reused) = self.rows.add_row();
        if reused {
            for column in self.columns.iter_mut() {
                column.reset(row);
            }
        } else {
            let nrows = self.rows.max_row();
            for column in self.columns.iter_mut() {
                column.set_maximum_row(nrows);
            }
        }
        log::trace!("table {:?}: added row {} (reused: {})", self.id, row, reused);
        self.listeners.fire(&TableEvent::Inserted { row });
        row
    }

    pub fn add_rows(&mut self, count: usize) -> Vec<usize> {
        (0..count).map(|_| self.add_row()).collect()
    }

    /// Delete a row. Returns false if the row was not live.
    pub fn remove_row(&mut self, row: usize) -> bool {
        if !self.rows.is_valid(row) {
            return false;
        }
        self.listeners.fire(&TableEvent::Deleted { row });
        self.rows.remove_row(row);
        self.tuples.invalidate(row);
        log::trace!("table {:?}: removed row {}", self.id, row);
        true
    }

    /// Delete every row and release the column storage.
    pub fn clear(&mut self) {
        let live: Vec<usize> = self.rows.rows().collect();
        for row in live {
            self.listeners.fire(&TableEvent::Deleted { row });
            self.tuples.invalidate(row);
        }
        self.rows.clear();
        for column in self.columns.iter_mut() {
            column.set_maximum_row(0);
        }
        log::debug!("table {:?}: cleared", self.id);
    }

    // ------------------------------------------------------------------------
    // Tuples

    /// The tuple for a live row.
    pub fn tuple(&self, row: usize) -> DataResult<Tuple> {
        self.check_row(row)?;
        Ok(self.tuples.tuple(row))
    }

    /// Tuples for every live row, in row order.
    pub fn tuples(&self) -> impl Iterator<Item = Tuple> + '_ {
        self.rows.rows().map(|row| self.tuples.tuple(row))
    }

    /// Resolve a tuple to its row, failing if it was retired or belongs to
    /// another table.
    pub fn validate(&self, tuple: Tuple) -> DataResult<usize> {
        if tuple.table_id() == self.id
            && self.rows.is_valid(tuple.row())
            && self.tuples.is_current(tuple)
        {
            Ok(tuple.row())
        } else {
            Err(DataError::InvalidTuple)
        }
    }

    // ------------------------------------------------------------------------
    // Cells

    /// Read a cell as a generic value.
    pub fn get<'f>(&self, row: usize, field: impl Into<Field<'f>>) -> DataResult<Value> {
        let col = self.cell(row, field.into())?;
        self.columns[col].get(row)
    }

    /// Write a generic value, coercing it to the field's type.
    pub fn set<'f>(
        &mut self,
        row: usize,
        field: impl Into<Field<'f>>,
        value: impl Into<Value>,
    ) -> DataResult<()> {
        let col = self.cell(row, field.into())?;
        let event = self.columns[col].apply(row, value.into())?;
        self.forward(col, event);
        Ok(())
    }

    pub fn revert_to_default<'f>(
        &mut self,
        row: usize,
        field: impl Into<Field<'f>>,
    ) -> DataResult<()> {
        let col = self.cell(row, field.into())?;
        let event = self.columns[col].apply_default(row)?;
        self.forward(col, event);
        Ok(())
    }

    typed_access!(get_int, set_int, apply_int, i32);
    typed_access!(get_long, set_long, apply_long, i64);
    typed_access!(get_float, set_float, apply_float, f32);
    typed_access!(get_double, set_double, apply_double, f64);
    typed_access!(get_boolean, set_boolean, apply_boolean, bool);
    typed_access!(get_date, set_date, apply_date, NaiveDateTime);

    pub fn get_string<'f>(&self, row: usize, field: impl Into<Field<'f>>) -> DataResult<String> {
        let col = self.cell(row, field.into())?;
        self.columns[col].get_string(row)
    }

    pub fn set_string<'f>(
        &mut self,
        row: usize,
        field: impl Into<Field<'f>>,
        value: impl Into<String>,
    ) -> DataResult<()> {
        let col = self.cell(row, field.into())?;
        let event = self.columns[col].apply_string(row, value.into())?;
        self.forward(col, event);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Listeners

    pub fn add_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&TableEvent) + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Listen to value changes of a single field.
    pub fn add_column_listener<'f, F>(
        &mut self,
        field: impl Into<Field<'f>>,
        listener: F,
    ) -> DataResult<ListenerId>
    where
        F: FnMut(&ColumnEvent) + Send + Sync + 'static,
    {
        let col = self.position(field.into())?;
        Ok(self.columns[col].add_listener(listener))
    }

    pub fn remove_column_listener<'f>(
        &mut self,
        field: impl Into<Field<'f>>,
        id: ListenerId,
    ) -> DataResult<bool> {
        let col = self.position(field.into())?;
        Ok(self.columns[col].remove_listener(id))
    }

    fn forward(&mut self, column: usize, event: Option<ColumnEvent>) {
        let Some(ColumnEvent { row, previous }) = event else {
            return;
        };
        if self.listeners.is_empty() {
            return;
        }
        let field = self.schema.column_name(column).unwrap_or_default().to_string();
        self.listeners.fire(&TableEvent::Updated {
            column,
            field,
            row,
            previous,
        });
    }
}
