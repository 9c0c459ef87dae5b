//! Loading externally typed records into tables.
//!
//! A [`RecordSource`] yields records whose columns carry a [`SourceType`]
//! (the type system of the external store). A [`FieldHandler`] decides which
//! table field type each source column maps to and writes each value through
//! the matching typed setter of the table.

use crate::schema::{ColumnInfo, Schema};
use crate::table::Table;
use crate::value::{DataType, Value};
use anyhow::{bail, Context, Result};

/// Column types of an external record source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    BigInt,
    Integer,
    SmallInt,
    TinyInt,
    Real,
    Float,
    Double,
    Decimal,
    Numeric,
    Boolean,
    Bit,
    Char,
    VarChar,
    LongVarChar,
    Date,
    Time,
    Timestamp,
    Binary,
    Other,
}

impl SourceType {
    /// Parse a source type name such as `varchar` or `BIGINT`. Unrecognized
    /// names map to [`SourceType::Other`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "bigint" | "int8" => SourceType::BigInt,
            "integer" | "int" | "int4" => SourceType::Integer,
            "smallint" | "int2" => SourceType::SmallInt,
            "tinyint" => SourceType::TinyInt,
            "real" | "float4" => SourceType::Real,
            "float" => SourceType::Float,
            "double" | "float8" | "double precision" => SourceType::Double,
            "decimal" => SourceType::Decimal,
            "numeric" => SourceType::Numeric,
            "boolean" | "bool" => SourceType::Boolean,
            "bit" => SourceType::Bit,
            "char" => SourceType::Char,
            "varchar" | "text" => SourceType::VarChar,
            "longvarchar" => SourceType::LongVarChar,
            "date" => SourceType::Date,
            "time" => SourceType::Time,
            "timestamp" | "datetime" => SourceType::Timestamp,
            "binary" | "varbinary" | "longvarbinary" | "blob" => SourceType::Binary,
            _ => SourceType::Other,
        }
    }

    /// The source type that stores values of a table field type.
    pub fn for_data_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Int => SourceType::Integer,
            DataType::Long => SourceType::BigInt,
            DataType::Float => SourceType::Real,
            DataType::Double => SourceType::Double,
            DataType::Boolean => SourceType::Boolean,
            DataType::String => SourceType::VarChar,
            DataType::Date => SourceType::Timestamp,
            DataType::Object => SourceType::Other,
        }
    }
}

/// Cursor over externally typed records.
pub trait RecordSource {
    fn column_count(&self) -> usize;

    fn column_name(&self, col: usize) -> &str;

    fn column_type(&self, col: usize) -> SourceType;

    /// Value of a column in the current record.
    fn value(&self, col: usize) -> Value;

    /// Move to the next record. Returns false once the records are exhausted.
    /// Must be called once before the first record is read.
    fn advance(&mut self) -> Result<bool>;
}

/// Maps source columns onto table fields.
pub trait FieldHandler {
    /// Copy column `col` of the current record into `row` of `table`.
    fn process(
        &self,
        table: &mut Table,
        row: usize,
        source: &dyn RecordSource,
        col: usize,
    ) -> Result<()>;

    /// Field type for a source column, or `None` to leave the column out.
    fn data_type(&self, name: &str, source_type: SourceType) -> Option<DataType>;
}

/// Handler covering the common source types.
///
/// NULL source values revert the cell to the field default. Columns of
/// unknown type are skipped unless `ignore_unknown_types` is off, in which
/// case they are stored in object fields.
#[derive(Debug, Clone)]
pub struct DefaultFieldHandler {
    pub ignore_unknown_types: bool,
}

impl Default for DefaultFieldHandler {
    fn default() -> Self {
        Self {
            ignore_unknown_types: true,
        }
    }
}

impl DefaultFieldHandler {
    pub fn new(ignore_unknown_types: bool) -> Self {
        Self {
            ignore_unknown_types,
        }
    }
}

impl FieldHandler for DefaultFieldHandler {
    fn process(
        &self,
        table: &mut Table,
        row: usize,
        source: &dyn RecordSource,
        col: usize,
    ) -> Result<()> {
        let field = source.column_name(col);
        let source_type = source.column_type(col);
        let value = source.value(col);

        if source_type == SourceType::Other && self.ignore_unknown_types {
            log::trace!("skipping column {} of unknown type", field);
            return Ok(());
        }
        if value.is_null() {
            return table
                .revert_to_default(row, field)
                .with_context(|| format!("Failed to reset field '{}' in row {}", field, row));
        }

        let result = match (source_type, &value) {
            (SourceType::BigInt, Value::Int(_) | Value::Long(_)) => {
                table.set_long(row, field, value.as_long().unwrap_or_default())
            }
            (
                SourceType::Integer | SourceType::SmallInt | SourceType::TinyInt,
                Value::Int(n),
            ) => table.set_int(row, field, *n),
            (SourceType::Real, Value::Float(n)) => table.set_float(row, field, *n),
            (
                SourceType::Float | SourceType::Double | SourceType::Decimal | SourceType::Numeric,
                v,
            ) if v.is_numeric() => table.set_double(row, field, v.as_double().unwrap_or_default()),
            (SourceType::Boolean | SourceType::Bit, Value::Boolean(b)) => {
                table.set_boolean(row, field, *b)
            }
            (
                SourceType::Char | SourceType::VarChar | SourceType::LongVarChar,
                Value::String(s),
            ) => table.set_string(row, field, s.as_str()),
            (SourceType::Date | SourceType::Time | SourceType::Timestamp, Value::Date(d)) => {
                table.set_date(row, field, *d)
            }
            // anything else goes through the coercing generic setter
            _ => table.set(row, field, value.clone()),
        };

        result.with_context(|| {
            format!(
                "Failed to store {} value {} in field '{}' of row {}",
                value.type_name(),
                value,
                field,
                row
            )
        })
    }

    fn data_type(&self, _name: &str, source_type: SourceType) -> Option<DataType> {
        match source_type {
            SourceType::BigInt => Some(DataType::Long),
            SourceType::Integer | SourceType::SmallInt | SourceType::TinyInt => Some(DataType::Int),
            SourceType::Real => Some(DataType::Float),
            SourceType::Float | SourceType::Double | SourceType::Decimal | SourceType::Numeric => {
                Some(DataType::Double)
            }
            SourceType::Boolean | SourceType::Bit => Some(DataType::Boolean),
            SourceType::Char | SourceType::VarChar | SourceType::LongVarChar => {
                Some(DataType::String)
            }
            SourceType::Date | SourceType::Time | SourceType::Timestamp => Some(DataType::Date),
            SourceType::Binary => Some(DataType::Object),
            SourceType::Other if self.ignore_unknown_types => None,
            SourceType::Other => Some(DataType::Object),
        }
    }
}

/// Derive a table schema from the columns of a source.
pub fn schema_for(source: &dyn RecordSource, handler: &dyn FieldHandler) -> Result<Schema> {
    let columns = (0..source.column_count())
        .filter_map(|col| {
            let name = source.column_name(col);
            handler
                .data_type(name, source.column_type(col))
                .map(|data_type| ColumnInfo::new(name, data_type))
        })
        .collect();
    Schema::new(columns).context("Failed to derive schema from record source")
}

/// Append one row per remaining record of `source` and return the number of
/// rows added. A record that fails to load is not left behind in the table.
pub fn load_records(
    table: &mut Table,
    source: &mut dyn RecordSource,
    handler: &dyn FieldHandler,
) -> Result<usize> {
    let columns: Vec<usize> = (0..source.column_count())
        .filter(|&col| table.column_index(source.column_name(col)).is_some())
        .collect();
    if columns.is_empty() && source.column_count() > 0 {
        bail!("None of the source columns match a field of the table");
    }

    let mut loaded = 0;
    while source.advance()? {
        let row = table.add_row();
        for &col in &columns {
            if let Err(err) = handler.process(table, row, &*source, col) {
                table.remove_row(row);
                return Err(err.context(format!("Failed to load record {}", loaded)));
            }
        }
        loaded += 1;
    }

    log::debug!("loaded {} records into table {:?}", loaded, table.id());
    Ok(loaded)
}

/// Record source over records held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    columns: Vec<(String, SourceType)>,
    records: Vec<Vec<Value>>,
    cursor: Option<usize>,
}

impl MemorySource {
    pub fn new(columns: Vec<(String, SourceType)>) -> Self {
        Self {
            columns,
            records: Vec::new(),
            cursor: None,
        }
    }

    /// Append a record. Missing trailing values read as NULL.
    pub fn push(&mut self, record: Vec<Value>) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for MemorySource {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, col: usize) -> &str {
        &self.columns[col].0
    }

    fn column_type(&self, col: usize) -> SourceType {
        self.columns[col].1
    }

    fn value(&self, col: usize) -> Value {
        self.cursor
            .and_then(|i| self.records.get(i))
            .and_then(|record| record.get(col))
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn advance(&mut self) -> Result<bool> {
        let next = self.cursor.map_or(0, |i| i + 1);
        self.cursor = Some(next.min(self.records.len()));
        Ok(next < self.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::parse_date;

    fn source() -> MemorySource {
        let mut source = MemorySource::new(vec![
            ("id".to_string(), SourceType::BigInt),
            ("name".to_string(), SourceType::VarChar),
            ("price".to_string(), SourceType::Numeric),
            ("in_stock".to_string(), SourceType::Bit),
            ("added".to_string(), SourceType::Timestamp),
            ("blob".to_string(), SourceType::Other),
        ]);
        source.push(vec![
            Value::Int(1),
            Value::from("lamp"),
            Value::Int(20),
            Value::Boolean(true),
            Value::from("2020-01-02 03:04:05"),
            Value::from("xx"),
        ]);
        source.push(vec![Value::Long(2), Value::Null, Value::Double(4.5)]);
        source
    }

    #[test]
    fn test_source_type_names() {
        assert_eq!(SourceType::from_name("VARCHAR"), SourceType::VarChar);
        assert_eq!(SourceType::from_name("int8"), SourceType::BigInt);
        assert_eq!(SourceType::from_name("geometry"), SourceType::Other);
        for data_type in DataType::ALL {
            let handler = DefaultFieldHandler::new(false);
            assert_eq!(
                handler.data_type("x", SourceType::for_data_type(data_type)),
                Some(data_type)
            );
        }
    }

    #[test]
    fn test_schema_for() {
        let schema = schema_for(&source(), &DefaultFieldHandler::default()).unwrap();
        assert_eq!(
            schema.to_string(),
            "Schema[id:long, name:string, price:double, in_stock:boolean, added:date]"
        );

        let schema = schema_for(&source(), &DefaultFieldHandler::new(false)).unwrap();
        assert_eq!(schema.column_type(5), Some(DataType::Object));
    }

    #[test]
    fn test_load_records() {
        let mut source = source();
        let handler = DefaultFieldHandler::default();
        let mut table = Table::new(schema_for(&source, &handler).unwrap()).unwrap();

        assert_eq!(load_records(&mut table, &mut source, &handler).unwrap(), 2);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get_long(0, "id").unwrap(), 1);
        assert_eq!(table.get_string(0, "name").unwrap(), "lamp");
        assert_eq!(table.get_double(0, "price").unwrap(), 20.0);
        assert!(table.get_boolean(0, "in_stock").unwrap());
        assert_eq!(
            table.get_date(0, "added").unwrap(),
            parse_date("2020-01-02 03:04:05").unwrap()
        );

        // NULL and missing values leave the defaults in place
        assert_eq!(table.get_string(1, "name").unwrap(), "");
        assert!(!table.get_boolean(1, "in_stock").unwrap());
        assert_eq!(table.get_double(1, "price").unwrap(), 4.5);

        // exhausted
        assert_eq!(load_records(&mut table, &mut source, &handler).unwrap(), 0);
    }

    #[test]
    fn test_unknown_types_are_stored_when_not_ignored() {
        let mut source = source();
        let handler = DefaultFieldHandler::new(false);
        let mut table = Table::new(schema_for(&source, &handler).unwrap()).unwrap();
        load_records(&mut table, &mut source, &handler).unwrap();
        assert_eq!(table.get(0, "blob").unwrap(), Value::from("xx"));
        assert_eq!(table.get(1, "blob").unwrap(), Value::Null);
    }

    #[test]
    fn test_failed_record_is_removed() {
        let mut source = MemorySource::new(vec![("n".to_string(), SourceType::Integer)]);
        source.push(vec![Value::Int(1)]);
        source.push(vec![Value::from("not a number")]);

        let schema = Schema::builder().field("n", DataType::Int).build().unwrap();
        let mut table = Table::new(schema).unwrap();
        let err = load_records(&mut table, &mut source, &DefaultFieldHandler::default())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load record 1"));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_no_matching_columns() {
        let mut source = MemorySource::new(vec![("other".to_string(), SourceType::Integer)]);
        let schema = Schema::builder().field("n", DataType::Int).build().unwrap();
        let mut table = Table::new(schema).unwrap();
        assert!(load_records(&mut table, &mut source, &DefaultFieldHandler::default()).is_err());
    }
}
