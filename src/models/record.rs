use std::collections::HashMap;

use crate::error::{AppError, AppResult};

/// A single field value as read from a result row
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// One result row keyed by column alias
///
/// Accessors coerce between representations the way the MovieLens data
/// tends to need it: numeric text reads as a number and integers read as
/// floats. Anything else is a decode error naming the column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for fakes and tests
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn field(&self, name: &str) -> AppResult<&FieldValue> {
        self.fields
            .get(name)
            .ok_or_else(|| AppError::Decode(format!("missing column `{}`", name)))
    }

    pub fn int(&self, name: &str) -> AppResult<i64> {
        match self.field(name)? {
            FieldValue::Integer(v) => Ok(*v),
            FieldValue::Text(s) => s.trim().parse().map_err(|_| mismatch(name, "integer", s)),
            FieldValue::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
            other => Err(mismatch(name, "integer", &format!("{:?}", other))),
        }
    }

    pub fn float(&self, name: &str) -> AppResult<f64> {
        match self.field(name)? {
            FieldValue::Float(v) => Ok(*v),
            FieldValue::Integer(v) => Ok(*v as f64),
            FieldValue::Text(s) => s.trim().parse().map_err(|_| mismatch(name, "float", s)),
            FieldValue::Null => Err(mismatch(name, "float", "null")),
        }
    }

    pub fn text(&self, name: &str) -> AppResult<String> {
        match self.opt_text(name)? {
            Some(s) => Ok(s),
            None => Err(mismatch(name, "text", "null")),
        }
    }

    /// Text column that may be null
    pub fn opt_text(&self, name: &str) -> AppResult<Option<String>> {
        match self.field(name)? {
            FieldValue::Text(s) => Ok(Some(s.clone())),
            FieldValue::Integer(v) => Ok(Some(v.to_string())),
            FieldValue::Float(v) => Ok(Some(v.to_string())),
            FieldValue::Null => Ok(None),
        }
    }
}

fn mismatch(name: &str, expected: &str, found: &str) -> AppError {
    AppError::Decode(format!(
        "column `{}` expected {}, found {}",
        name, expected, found
    ))
}
