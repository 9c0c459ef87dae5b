//! Schema declarations read from the command line or a JSON file.
//!
//! A field list on the command line looks like
//! `name:string,age:int:-1,joined:date`, i.e. comma separated
//! `name:type[:default]` entries. The JSON form is
//!
//! ```json
//! {
//!   "capacity": 64,
//!   "fields": [
//!     { "name": "name", "type": "string" },
//!     { "name": "age", "type": "int", "default": -1 }
//!   ],
//!   "read_only": ["name"]
//! }
//! ```

use crate::schema::{ColumnInfo, Schema};
use crate::table::Table;
use crate::value::{DataType, Value};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    pub fields: Vec<FieldConfig>,
    /// Initial row capacity of tables built from this schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    /// Fields that reject writes once the table is built.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub read_only: Vec<String>,
}

impl SchemaConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse schema JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid schema file {}", path.display()))
    }

    /// Parse a `name:type[:default],...` field list.
    pub fn parse_fields(list: &str) -> Result<Self> {
        let mut fields = Vec::new();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let mut parts = entry.splitn(3, ':');
            let name = parts.next().unwrap_or_default().trim();
            let data_type = parts
                .next()
                .ok_or_else(|| anyhow!("Field '{}' has no type (expected name:type)", entry))?
                .trim();
            if name.is_empty() {
                bail!("Field entry '{}' has an empty name", entry);
            }
            fields.push(FieldConfig {
                name: name.to_string(),
                data_type: data_type.to_string(),
                default: parts.next().map(|d| serde_json::Value::String(d.to_string())),
            });
        }
        if fields.is_empty() {
            bail!("No fields declared");
        }
        Ok(Self {
            fields,
            ..Default::default()
        })
    }

    pub fn to_schema(&self) -> Result<Schema> {
        let columns = self
            .fields
            .iter()
            .map(|field| {
                let data_type = DataType::from_name(&field.data_type).ok_or_else(|| {
                    anyhow!("Unknown type '{}' for field '{}'", field.data_type, field.name)
                })?;
                Ok(match &field.default {
                    Some(default) => {
                        ColumnInfo::with_default(&field.name, data_type, json_to_value(default))
                    }
                    None => ColumnInfo::new(&field.name, data_type),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Schema::new(columns).context("Invalid schema declaration")
    }

    /// Build an empty table for this schema, applying capacity and read-only
    /// settings.
    pub fn build_table(&self, capacity: Option<usize>) -> Result<Table> {
        let schema = self.to_schema()?;
        let mut table = match capacity.or(self.capacity) {
            Some(capacity) => Table::with_capacity(schema, 0, capacity)?,
            None => Table::new(schema)?,
        };
        for field in &self.read_only {
            table
                .set_read_only(field.as_str(), true)
                .with_context(|| format!("Cannot mark '{}' read-only", field))?;
        }
        Ok(table)
    }
}

/// Convert a JSON scalar to a cell value. Integers that fit `i32` become
/// ints, wider ones longs; other numbers become doubles.
pub fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => i32::try_from(i).map_or(Value::Long(i), Value::Int),
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}
