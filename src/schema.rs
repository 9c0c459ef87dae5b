//! Table schemas: ordered field name, type and default triples.

use crate::column::Column;
use crate::error::{DataError, DataResult};
use crate::value::{DataType, Value};
use std::collections::HashMap;
use std::fmt;

/// Description of a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: DataType,
    pub default: Value,
}

impl ColumnInfo {
    /// A field holding the type's natural default.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            default: data_type.default_value(),
        }
    }

    pub fn with_default(name: impl Into<String>, data_type: DataType, default: Value) -> Self {
        Self {
            name: name.into(),
            data_type,
            default,
        }
    }
}

/// Immutable, ordered template for tables.
///
/// A schema does not own any row data; tables share it through an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<ColumnInfo>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema, checking that field names are unique and that every
    /// default fits its field type. Defaults are normalized to the field's
    /// native type (an int default on a double field becomes a double).
    pub fn new(columns: Vec<ColumnInfo>) -> DataResult<Self> {
        let mut index = HashMap::with_capacity(columns.len());
        let mut normalized = Vec::with_capacity(columns.len());

        for (position, info) in columns.into_iter().enumerate() {
            if index.insert(info.name.clone(), position).is_some() {
                return Err(DataError::SchemaConflict(info.name));
            }
            let default = Column::new(info.data_type, 0, 0, info.default)?.default_value();
            normalized.push(ColumnInfo { default, ..info });
        }

        Ok(Self {
            columns: normalized,
            index,
        })
    }

    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&ColumnInfo> {
        self.columns.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(|c| c.name.as_str())
    }

    pub fn column_type(&self, index: usize) -> Option<DataType> {
        self.columns.get(index).map(|c| c.data_type)
    }

    pub fn default_value(&self, index: usize) -> Option<&Value> {
        self.columns.get(index).map(|c| &c.default)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Schema[")?;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:{}", column.name, column.data_type)?;
        }
        f.write_str("]")
    }
}

/// Incremental schema construction.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<ColumnInfo>,
}

impl SchemaBuilder {
    pub fn field(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns.push(ColumnInfo::new(name, data_type));
        self
    }

    pub fn field_with_default(
        mut self,
        name: impl Into<String>,
        data_type: DataType,
        default: impl Into<Value>,
    ) -> Self {
        self.columns
            .push(ColumnInfo::with_default(name, data_type, default.into()));
        self
    }

    pub fn build(self) -> DataResult<Schema> {
        Schema::new(self.columns)
    }
}
