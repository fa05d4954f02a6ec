//! The expression-engine seam.
//!
//! The handler only sees these two traits. [`crate::jsonata::JsonataEngine`] is the
//! production implementation.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::EngineError;

/// Compiles expression text into something that can be evaluated.
pub trait ExpressionEngine: Send + Sync {
    type Compiled: CompiledExpression;

    fn compile(&self, expression: &str) -> Result<Self::Compiled, EngineError>;
}

/// A compiled expression, ready to run against a data document.
#[async_trait]
pub trait CompiledExpression: Send + Sync {
    /// Evaluates against `data` with `bindings` as the variable context.
    ///
    /// `Ok(None)` means the expression produced no value (undefined), which is
    /// distinct from `Ok(Some(Value::Null))` at this level.
    async fn evaluate(
        &self,
        data: Value,
        bindings: Map<String, Value>,
    ) -> Result<Option<Value>, EngineError>;
}
