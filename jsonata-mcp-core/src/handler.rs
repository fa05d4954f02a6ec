//! The evaluate handler.
//!
//! The pipeline stops at the first failure:
//!
//! ```text
//! compile(expression) → parse(data) → parse(bindings) → evaluate → format
//! ```
//!
//! Whatever happens, the caller gets a [`ToolResponse`] with exactly one text item.

use serde_json::Value;
use tracing::debug;

use crate::classify::classify;
use crate::engine::{CompiledExpression, ExpressionEngine};
use crate::error::{EvaluateError, EvaluateResult};
use crate::request::{EvaluateRequest, parse_bindings, parse_json_input};
use crate::response::ToolResponse;

/// Text returned when the expression yields null or nothing at all.
pub const NULL_OR_UNDEFINED: &str = "null or undefined";

/// Runs an evaluate request and formats the outcome. Never fails.
pub async fn evaluate<E: ExpressionEngine>(engine: &E, request: &EvaluateRequest) -> ToolResponse {
    let text = match run(engine, request).await {
        Ok(result) => format_result(result),
        Err(err) => {
            debug!(category = err.category(), "evaluate failed: {}", err);
            err.to_string()
        }
    };
    ToolResponse::text(text)
}

/// Runs the pipeline without formatting, surfacing the first failure.
pub async fn run<E: ExpressionEngine>(
    engine: &E,
    request: &EvaluateRequest,
) -> EvaluateResult<Option<Value>> {
    let compiled = engine
        .compile(&request.expression)
        .map_err(|err| EvaluateError::Expression(classify(&err)))?;

    let data = parse_json_input(&request.data).map_err(EvaluateError::Data)?;
    let bindings = parse_bindings(&request.bindings).map_err(EvaluateError::Bindings)?;

    compiled
        .evaluate(data, bindings)
        .await
        .map_err(|err| EvaluateError::Evaluation(classify(&err)))
}

/// Null and undefined are deliberately folded into the same text.
pub fn format_result(result: Option<Value>) -> String {
    match result {
        None | Some(Value::Null) => NULL_OR_UNDEFINED.to_string(),
        Some(value) => value.to_string(),
    }
}
