//! Tuples: stable row handles that detect deletion of their row.
//!
//! A [`Tuple`] is a small copyable handle of table identity, row index and
//! generation. The owning table keeps one generation counter per row slot in
//! its [`TupleManager`] and bumps it when the row is deleted, so every handle
//! issued before the deletion fails with [`DataError::InvalidTuple`](crate::error::DataError::InvalidTuple) from then
//! on, even once the slot has been reused by a new row.

use crate::error::DataResult;
use crate::table::{Field, Table, TableId};
use crate::value::{DataType, Value};
use chrono::NaiveDateTime;
use std::fmt;

/// Handle to one row of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tuple {
    table: TableId,
    row: usize,
    generation: u64,
}

/// Per-row generation counters for the tuples of a single table.
///
/// Slots are created lazily: a row that was never deleted is at generation 0
/// and occupies no storage.
#[derive(Debug)]
pub struct TupleManager {
    table: TableId,
    generations: Vec<u64>,
}

impl TupleManager {
    pub fn new(table: TableId) -> Self {
        Self {
            table,
            generations: Vec::new(),
        }
    }

    fn generation(&self, row: usize) -> u64 {
        self.generations.get(row).copied().unwrap_or(0)
    }

    /// The current tuple for a row. Repeated calls return equal handles until
    /// the row is invalidated.
    pub fn tuple(&self, row: usize) -> Tuple {
        Tuple {
            table: self.table,
            row,
            generation: self.generation(row),
        }
    }

    pub fn is_current(&self, tuple: Tuple) -> bool {
        tuple.table == self.table && tuple.generation == self.generation(tuple.row)
    }

    /// Retire every tuple issued for `row` so far.
    pub fn invalidate(&mut self, row: usize) {
        if row >= self.generations.len() {
            self.generations.resize(row + 1, 0);
        }
        self.generations[row] += 1;
    }
}

macro_rules! tuple_access {
    ($get:ident, $set:ident, $ty:ty) => {
        pub fn $get<'f>(&self, table: &Table, field: impl Into<Field<'f>>) -> DataResult<$ty> {
            let row = table.validate(*self)?;
            table.$get(row, field)
        }

        pub fn $set<'f>(
            &self,
            table: &mut Table,
            field: impl Into<Field<'f>>,
            value: $ty,
        ) -> DataResult<()> {
            let row = table.validate(*self)?;
            table.$set(row, field, value)
        }
    };
}

impl Tuple {
    /// Row index this tuple was issued for. Available even after the tuple
    /// has been retired.
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn table_id(&self) -> TableId {
        self.table
    }

    pub fn is_valid(&self, table: &Table) -> bool {
        table.validate(*self).is_ok()
    }

    pub fn ensure_valid(&self, table: &Table) -> DataResult<()> {
        table.validate(*self).map(drop)
    }

    /// Borrow the table alongside the tuple for read access.
    pub fn bind<'a>(&self, table: &'a Table) -> TupleRef<'a> {
        TupleRef {
            table,
            tuple: *self,
        }
    }

    pub fn column_count(&self, table: &Table) -> usize {
        table.column_count()
    }

    pub fn column_name<'t>(&self, table: &'t Table, index: usize) -> Option<&'t str> {
        table.column_name(index)
    }

    pub fn column_index(&self, table: &Table, name: &str) -> Option<usize> {
        table.column_index(name)
    }

    pub fn column_type<'f>(&self, table: &Table, field: impl Into<Field<'f>>) -> Option<DataType> {
        table.column_type(field)
    }

    pub fn can_get<'f>(
        &self,
        table: &Table,
        field: impl Into<Field<'f>>,
        requested: DataType,
    ) -> bool {
        self.is_valid(table) && table.can_get(field, requested)
    }

    pub fn can_set<'f>(
        &self,
        table: &Table,
        field: impl Into<Field<'f>>,
        supplied: DataType,
    ) -> bool {
        self.is_valid(table) && table.can_set(field, supplied)
    }

    pub fn get<'f>(&self, table: &Table, field: impl Into<Field<'f>>) -> DataResult<Value> {
        let row = table.validate(*self)?;
        table.get(row, field)
    }

    pub fn set<'f>(
        &self,
        table: &mut Table,
        field: impl Into<Field<'f>>,
        value: impl Into<Value>,
    ) -> DataResult<()> {
        let row = table.validate(*self)?;
        table.set(row, field, value)
    }

    pub fn default_value<'f>(&self, table: &Table, field: impl Into<Field<'f>>) -> DataResult<Value> {
        table.validate(*self)?;
        table.default_value(field)
    }

    pub fn revert_to_default<'f>(
        &self,
        table: &mut Table,
        field: impl Into<Field<'f>>,
    ) -> DataResult<()> {
        let row = table.validate(*self)?;
        table.revert_to_default(row, field)
    }

    tuple_access!(get_int, set_int, i32);
    tuple_access!(get_long, set_long, i64);
    tuple_access!(get_float, set_float, f32);
    tuple_access!(get_double, set_double, f64);
    tuple_access!(get_boolean, set_boolean, bool);
    tuple_access!(get_date, set_date, NaiveDateTime);

    pub fn get_string<'f>(&self, table: &Table, field: impl Into<Field<'f>>) -> DataResult<String> {
        let row = table.validate(*self)?;
        table.get_string(row, field)
    }

    pub fn set_string<'f>(
        &self,
        table: &mut Table,
        field: impl Into<Field<'f>>,
        value: impl Into<String>,
    ) -> DataResult<()> {
        let row = table.validate(*self)?;
        table.set_string(row, field, value)
    }
}

/// A tuple together with a shared borrow of its table.
#[derive(Debug, Clone, Copy)]
pub struct TupleRef<'a> {
    table: &'a Table,
    tuple: Tuple,
}

impl<'a> TupleRef<'a> {
    pub fn tuple(&self) -> Tuple {
        self.tuple
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn is_valid(&self) -> bool {
        self.tuple.is_valid(self.table)
    }

    pub fn get<'f>(&self, field: impl Into<Field<'f>>) -> DataResult<Value> {
        self.tuple.get(self.table, field)
    }

    pub fn get_int<'f>(&self, field: impl Into<Field<'f>>) -> DataResult<i32> {
        self.tuple.get_int(self.table, field)
    }

    pub fn get_long<'f>(&self, field: impl Into<Field<'f>>) -> DataResult<i64> {
        self.tuple.get_long(self.table, field)
    }

    pub fn get_float<'f>(&self, field: impl Into<Field<'f>>) -> DataResult<f32> {
        self.tuple.get_float(self.table, field)
    }

    pub fn get_double<'f>(&self, field: impl Into<Field<'f>>) -> DataResult<f64> {
        self.tuple.get_double(self.table, field)
    }

    pub fn get_boolean<'f>(&self, field: impl Into<Field<'f>>) -> DataResult<bool> {
        self.tuple.get_boolean(self.table, field)
    }

    pub fn get_string<'f>(&self, field: impl Into<Field<'f>>) -> DataResult<String> {
        self.tuple.get_string(self.table, field)
    }

    pub fn get_date<'f>(&self, field: impl Into<Field<'f>>) -> DataResult<NaiveDateTime> {
        self.tuple.get_date(self.table, field)
    }

    /// All field values in column order.
    pub fn values(&self) -> DataResult<Vec<Value>> {
        let row = self.table.validate(self.tuple)?;
        (0..self.table.column_count())
            .map(|i| self.table.get(row, Field::Index(i)))
            .collect()
    }
}

impl fmt::Display for TupleRef<'_> {
    /// `Tuple[v0,v1,...]`; cells that cannot be read show as `?`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "Tuple[invalid row {}]", self.tuple.row);
        }
        f.write_str("Tuple[")?;
        for i in 0..self.table.column_count() {
            if i > 0 {
                f.write_str(",")?;
            }
            match self.table.get(self.tuple.row, Field::Index(i)) {
                Ok(value) => write!(f, "{}", value)?,
                Err(_) => f.write_str("?")?,
            }
        }
        f.write_str("]")
    }
}

impl From<TupleRef<'_>> for Tuple {
    fn from(r: TupleRef<'_>) -> Self {
        r.tuple
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use crate::schema::Schema;

    fn table() -> Table {
        let schema = Schema::builder()
            .field("name", DataType::String)
            .field("age", DataType::Int)
            .field("score", DataType::Float)
            .build()
            .unwrap();
        let mut table = Table::new(schema).unwrap();
        table.add_rows(3);
        table
    }

    #[test]
    fn test_manager_generations() {
        let t = table();
        let mut manager = TupleManager::new(t.id());
        let first = manager.tuple(4);
        assert_eq!(manager.tuple(4), first);
        assert!(manager.is_current(first));

        manager.invalidate(4);
        assert!(!manager.is_current(first));
        assert_ne!(manager.tuple(4), first);
        assert_eq!(manager.tuple(4).row(), 4);
    }

    #[test]
    fn test_generation_past_u32_range() {
        let t = table();
        let mut manager = TupleManager::new(t.id());
        manager.generations = vec![u64::from(u32::MAX)];
        let stale = manager.tuple(0);

        manager.invalidate(0);
        let fresh = manager.tuple(0);
        assert!(!manager.is_current(stale));
        assert!(manager.is_current(fresh));
        assert_eq!(fresh.generation, u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_tuple_access() {
        let mut t = table();
        let tuple = t.tuple(1).unwrap();
        tuple.set_string(&mut t, "name", "grace").unwrap();
        tuple.set_int(&mut t, "age", 85).unwrap();
        tuple.set(&mut t, "score", 9.5f32).unwrap();

        assert_eq!(tuple.get_string(&t, "name").unwrap(), "grace");
        assert_eq!(tuple.get_long(&t, "age").unwrap(), 85);
        assert_eq!(tuple.get(&t, "score").unwrap(), Value::Float(9.5));
        assert_eq!(tuple.column_count(&t), 3);
        assert_eq!(tuple.column_index(&t, "age"), Some(1));
        assert_eq!(tuple.column_type(&t, "score"), Some(DataType::Float));
        assert!(tuple.can_get(&t, "score", DataType::Double));
        assert!(!tuple.can_set(&t, "score", DataType::Double));
    }

    #[test]
    fn test_bound_typed_reads() {
        let schema = Schema::builder()
            .field("score", DataType::Float)
            .field("at", DataType::Date)
            .build()
            .unwrap();
        let mut t = Table::new(schema).unwrap();
        let row = t.add_row();
        let at = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        t.set_float(row, "score", 2.5).unwrap();
        t.set_date(row, "at", at).unwrap();

        let bound = t.tuple(row).unwrap().bind(&t);
        assert_eq!(bound.get_float("score").unwrap(), 2.5);
        assert_eq!(bound.get_double("score").unwrap(), 2.5);
        assert_eq!(bound.get_date("at").unwrap(), at);
        assert_eq!(bound.get_date(1).unwrap(), at);
        assert!(matches!(
            bound.get_float("at").unwrap_err(),
            DataError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_invalid_tuple() {
        let mut t = table();
        let tuple = t.tuple(0).unwrap();
        assert!(t.remove_row(0));

        assert!(!tuple.is_valid(&t));
        assert_eq!(tuple.get(&t, "age").unwrap_err(), DataError::InvalidTuple);
        assert_eq!(
            tuple.set_int(&mut t, "age", 1).unwrap_err(),
            DataError::InvalidTuple
        );
        assert_eq!(tuple.ensure_valid(&t).unwrap_err(), DataError::InvalidTuple);
        assert!(!tuple.can_get(&t, "age", DataType::Int));

        // introspection still answers
        assert_eq!(tuple.row(), 0);
        assert_eq!(tuple.column_name(&t, 0), Some("name"));
    }

    #[test]
    fn test_display() {
        let mut t = table();
        t.set_string(2, "name", "ada").unwrap();
        t.set_int(2, "age", 36).unwrap();
        let tuple = t.tuple(2).unwrap();
        assert_eq!(tuple.bind(&t).to_string(), "Tuple[ada,36,0]");
        assert_eq!(
            tuple.bind(&t).values().unwrap(),
            vec![Value::from("ada"), Value::Int(36), Value::Float(0.0)]
        );

        t.remove_row(2);
        assert_eq!(tuple.bind(&t).to_string(), "Tuple[invalid row 2]");
    }
}
