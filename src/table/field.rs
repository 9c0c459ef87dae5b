//! Addressing a table field by name or by position.

use std::fmt;

/// A field reference: either the field name or its column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field<'a> {
    Name(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for Field<'a> {
    fn from(name: &'a str) -> Self {
        Field::Name(name)
    }
}

impl<'a> From<&'a String> for Field<'a> {
    fn from(name: &'a String) -> Self {
        Field::Name(name.as_str())
    }
}

impl From<usize> for Field<'_> {
    fn from(index: usize) -> Self {
        Field::Index(index)
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Name(name) => f.write_str(name),
            Field::Index(index) => write!(f, "#{}", index),
        }
    }
}
