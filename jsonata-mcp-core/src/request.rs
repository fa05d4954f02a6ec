use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ArgumentError, JsonInputError, json_kind};

/// Text used for `data` and `bindings` when the caller leaves them out.
pub const EMPTY_OBJECT: &str = "{}";

fn default_object() -> String {
    EMPTY_OBJECT.to_string()
}

/// Inputs of one `evaluate` call. Everything crosses the boundary as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    /// JSON document to query.
    #[serde(default = "default_object")]
    pub data: String,

    /// JSONata expression text.
    pub expression: String,

    /// JSON object whose entries become expression variables.
    #[serde(default = "default_object")]
    pub bindings: String,
}

impl EvaluateRequest {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            data: default_object(),
            expression: expression.into(),
            bindings: default_object(),
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_bindings(mut self, bindings: impl Into<String>) -> Self {
        self.bindings = bindings.into();
        self
    }

    /// Coerces raw tool-call arguments into a request.
    ///
    /// `expression` is required. `data` and `bindings` may be absent or `null`,
    /// in which case they default to `"{}"`. Any present value must be a string.
    pub fn from_arguments(arguments: Option<&Value>) -> Result<Self, ArgumentError> {
        let empty = Map::new();
        let arguments = match arguments {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(map)) => map,
            Some(other) => return Err(ArgumentError::NotAnObject(json_kind(other))),
        };

        let expression =
            string_argument(arguments, "expression")?.ok_or(ArgumentError::Missing("expression"))?;
        let data = string_argument(arguments, "data")?.unwrap_or_else(default_object);
        let bindings = string_argument(arguments, "bindings")?.unwrap_or_else(default_object);

        Ok(Self {
            data,
            expression,
            bindings,
        })
    }
}

fn string_argument(
    arguments: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<String>, ArgumentError> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ArgumentError::NotAString {
            name,
            found: json_kind(other),
        }),
    }
}

/// Parses a JSON input, treating the empty string as `{}`.
pub fn parse_json_input(text: &str) -> Result<Value, JsonInputError> {
    let text = if text.is_empty() { EMPTY_OBJECT } else { text };
    Ok(serde_json::from_str(text)?)
}

/// Parses the bindings input into a variable map.
///
/// Only a JSON syntax error fails. Objects bind their entries, arrays and
/// strings bind each element or character under its index, and scalars bind
/// nothing.
pub fn parse_bindings(text: &str) -> Result<Map<String, Value>, JsonInputError> {
    Ok(into_bindings(parse_json_input(text)?))
}

fn into_bindings(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), item))
            .collect(),
        Value::String(s) => s
            .chars()
            .enumerate()
            .map(|(i, c)| (i.to_string(), Value::String(c.to_string())))
            .collect(),
        Value::Null | Value::Bool(_) | Value::Number(_) => Map::new(),
    }
}
