use std::fmt::Display;

use crate::{error::AppResult, models::Record};

/// A value bound to a named query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Integer(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(v) => write!(f, "{:?}", v),
        }
    }
}

/// Declared type of a returned column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
    /// Text that may come back as null
    OptionalText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// A parameterized Cypher statement plus the columns it returns
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Short label used in logs
    pub name: &'static str,
    pub text: String,
    pub params: Vec<(&'static str, ParamValue)>,
    pub columns: &'static [Column],
}

impl Statement {
    pub fn new(name: &'static str, text: impl Into<String>, columns: &'static [Column]) -> Self {
        Self {
            name,
            text: text.into(),
            params: Vec::new(),
            columns,
        }
    }

    pub fn param(mut self, key: &'static str, value: ParamValue) -> Self {
        self.params.push((key, value));
        self
    }

    /// Looks up a bound parameter by name
    pub fn get_param(&self, key: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }
}

/// Query execution interface of the graph store
///
/// Every call is its own unit of work: implementations acquire a session,
/// run the statement, drain the result stream and release the session
/// before returning. Failures reported by the store come back as
/// `AppError::Query` with the driver error as source.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GraphStore: Send + Sync {
    /// Runs a read statement and collects every row
    async fn fetch(&self, statement: &Statement) -> AppResult<Vec<Record>>;

    /// Runs a write statement inside a transaction
    async fn execute(&self, statement: &Statement) -> AppResult<()>;

    /// Releases the underlying connection resources
    async fn close(&self) -> AppResult<()>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}
