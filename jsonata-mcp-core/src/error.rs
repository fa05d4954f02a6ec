//! Error types for the evaluate pipeline.
//!
//! Every failure the handler can hit is one of four [`EvaluateError`] categories. Their
//! `Display` output is the labelled diagnostic that ends up in the response text.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::classify::Classified;

pub type EvaluateResult<T> = Result<T, EvaluateError>;

/// A value thrown by the expression engine.
///
/// The payload is arbitrary JSON; it may or may not have the shape of an
/// [`ErrorRecord`](crate::classify::ErrorRecord).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct EngineError(pub Value);

impl EngineError {
    /// Builds a thrown value carrying the full structured-record shape.
    pub fn record(
        code: &str,
        message: impl Into<String>,
        position: usize,
        token: impl Into<String>,
    ) -> Self {
        Self(serde_json::json!({
            "code": code,
            "message": message.into(),
            "position": position,
            "token": token.into(),
        }))
    }

    /// Builds a thrown value that only carries a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self(serde_json::json!({ "message": message.into() }))
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }
}

/// Native representation of a JSON input that could not be used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonInputError {
    pub name: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl From<serde_json::Error> for JsonInputError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        let name = match err.classify() {
            Category::Syntax | Category::Eof => "SyntaxError",
            Category::Data => "DataError",
            Category::Io => "IoError",
        };
        Self {
            name,
            message: err.to_string(),
            line: Some(err.line()),
            column: Some(err.column()),
        }
    }
}

impl fmt::Display for JsonInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_json(f, self)
    }
}

/// The four disjoint failure categories of an evaluate call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluateError {
    #[error("JSONata expression error: {0}")]
    Expression(Classified),

    #[error("Data JSON error: {0}")]
    Data(JsonInputError),

    #[error("Bindings JSON error: {0}")]
    Bindings(JsonInputError),

    #[error("Evaluation error: {0}")]
    Evaluation(Classified),
}

impl EvaluateError {
    /// Short category name, used in log fields.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Expression(_) => "expression",
            Self::Data(_) => "data",
            Self::Bindings(_) => "bindings",
            Self::Evaluation(_) => "evaluation",
        }
    }
}

/// Raised when tool arguments cannot be coerced into an evaluate request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    #[error("missing required argument `{0}`")]
    Missing(&'static str),

    #[error("argument `{name}` must be a string, found {found}")]
    NotAString { name: &'static str, found: &'static str },

    #[error("arguments must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn write_json<T: Serialize>(f: &mut fmt::Formatter<'_>, value: &T) -> fmt::Result {
    let text = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    f.write_str(&text)
}
