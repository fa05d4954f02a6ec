//! [`ExpressionEngine`] backed by the `jsonata-rs` crate.
//!
//! `jsonata-rs` allocates everything in a bump arena tied to a single `JsonAta`
//! instance, so a compiled expression only keeps the source text. Compilation
//! validates it once and each evaluation parses it again into a fresh arena on
//! the blocking pool.

use std::collections::HashMap;

use async_trait::async_trait;
use bumpalo::Bump;
use jsonata_rs::{JsonAta, Value as Evaluated};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::engine::{CompiledExpression, ExpressionEngine};
use crate::error::EngineError;

/// Token reported when an error points past the end of the expression.
pub const END_TOKEN: &str = "(end)";

/// Largest integer an IEEE double represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

lazy_static! {
    // e.g. "S0101 @ 5: String literal must be terminated by a matching quote"
    static ref ERROR_TEXT: Regex = Regex::new(
        r"(?s)^(?P<code>[A-Z]\d{4})\b\s*(?:@\s*(?:(?P<at>\d+)\s*)?)?:?\s*(?:(?P<lead>\d+)\s*:\s*)?(?P<message>.*)$"
    )
    .unwrap();
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonataEngine;

impl JsonataEngine {
    pub fn new() -> Self {
        Self
    }
}

impl ExpressionEngine for JsonataEngine {
    type Compiled = JsonataExpression;

    fn compile(&self, expression: &str) -> Result<JsonataExpression, EngineError> {
        if expression.trim().is_empty() {
            return Err(EngineError::record(
                "S0207",
                "Unexpected end of expression",
                0,
                END_TOKEN,
            ));
        }

        let arena = Bump::new();
        JsonAta::new(expression, &arena).map_err(|err| thrown_from(&err, expression))?;

        debug!(len = expression.len(), "compiled JSONata expression");
        Ok(JsonataExpression {
            source: expression.to_owned(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct JsonataExpression {
    source: String,
}

impl JsonataExpression {
    pub fn source(&self) -> &str {
        &self.source
    }
}

#[async_trait]
impl CompiledExpression for JsonataExpression {
    async fn evaluate(
        &self,
        data: Value,
        bindings: Map<String, Value>,
    ) -> Result<Option<Value>, EngineError> {
        let source = self.source.clone();

        tokio::task::spawn_blocking(move || evaluate_blocking(&source, &data, &bindings))
            .await
            .map_err(|err| {
                warn!("JSONata evaluation task failed: {}", err);
                EngineError::message(format!("evaluation aborted: {}", err))
            })?
    }
}

fn evaluate_blocking(
    source: &str,
    data: &Value,
    bindings: &Map<String, Value>,
) -> Result<Option<Value>, EngineError> {
    let arena = Bump::new();
    let jsonata = JsonAta::new(source, &arena).map_err(|err| thrown_from(&err, source))?;

    let input = data.to_string();
    let bindings: HashMap<&str, &Value> = bindings.iter().map(|(k, v)| (k.as_str(), v)).collect();

    let result = jsonata
        .evaluate(Some(input.as_str()), Some(&bindings))
        .map_err(|err| thrown_from(&err, source))?;

    // Functions have no JSON form.
    if result.is_undefined() || result.is_function() {
        return Ok(None);
    }
    if let Some(n) = out_of_range(result) {
        return Err(thrown_from(&jsonata_rs::Error::D1001NumberOfOutRange(n), source));
    }

    let serialized = result.serialize(false);
    let value: Value = serde_json::from_str(&serialized).map_err(|err| {
        EngineError::message(format!("result cannot be represented as JSON: {}", err))
    })?;
    Ok(Some(normalize_numbers(value)))
}

/// The first non-finite number in a result. Serializing would turn it into `null`.
fn out_of_range<'a>(value: &'a Evaluated<'a>) -> Option<f64> {
    match value {
        Evaluated::Number(n) if !n.is_finite() => Some(*n),
        _ if value.is_array() => value.members().find_map(out_of_range),
        _ if value.is_object() => value.entries().find_map(|(_, v)| out_of_range(v)),
        _ => None,
    }
}

/// Converts a `jsonata-rs` error into a thrown value.
///
/// The error text carries the error code and, for most errors, the character
/// position. Both are lifted into the record shape together with the lexeme at
/// that position. Text without a position keeps only the message.
fn thrown_from(err: &jsonata_rs::Error, expression: &str) -> EngineError {
    let text = err.to_string();

    let Some(caps) = ERROR_TEXT.captures(&text) else {
        return EngineError::message(err.to_string());
    };

    let code = &caps["code"];
    let message = caps["message"].trim();
    let position = caps
        .name("at")
        .or_else(|| caps.name("lead"))
        .and_then(|m| m.as_str().parse::<usize>().ok());

    match position {
        Some(position) => {
            EngineError::record(code, message, position, token_at(expression, position))
        }
        None => EngineError(serde_json::json!({ "code": code, "message": message })),
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// The lexeme starting at `position`, or [`END_TOKEN`] past the end.
fn token_at(expression: &str, position: usize) -> String {
    let mut rest = expression
        .chars()
        .skip(position)
        .skip_while(|c| c.is_whitespace())
        .peekable();

    match rest.peek().copied() {
        None => END_TOKEN.to_string(),
        Some(c) if is_name_char(c) => rest.take_while(|c| is_name_char(*c)).collect(),
        Some(c) => c.to_string(),
    }
}

/// Rewrites integral floats as integers so `15.0` serializes as `15`.
fn normalize_numbers(value: Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
                Value::Number(Number::from(f as i64))
            }
            _ => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_numbers).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_numbers(v)))
                .collect(),
        ),
        other => other,
    }
}
