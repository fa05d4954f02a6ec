use jsonata_mcp_core::{EvaluateRequest, ExpressionEngine, ToolResponse, evaluate};
use serde_json::{Value, json};
use tracing::info;

use crate::error::ToolError;
use crate::protocol::{CallToolParams, ToolDefinition};

pub const EVALUATE_TOOL: &str = "evaluate";

/// Definition of the `evaluate` tool as listed by `tools/list`.
pub fn evaluate_tool() -> ToolDefinition {
    ToolDefinition {
        name: EVALUATE_TOOL.to_string(),
        description: Some(
            "Evaluate a JSONata expression against JSON data with optional variable bindings"
                .to_string(),
        ),
        input_schema: evaluate_input_schema(),
    }
}

fn evaluate_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "data": { "type": "string", "default": "{}" },
            "expression": { "type": "string" },
            "bindings": { "type": "string", "default": "{}" }
        },
        "required": ["expression"],
        "additionalProperties": false,
        "$schema": "http://json-schema.org/draft-07/schema#"
    })
}

/// The tools this server exposes, bound to an expression engine.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry<E> {
    engine: E,
}

impl<E: ExpressionEngine> ToolRegistry<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn list(&self) -> Vec<ToolDefinition> {
        vec![evaluate_tool()]
    }

    pub async fn call(&self, params: CallToolParams) -> Result<ToolResponse, ToolError> {
        if params.name != EVALUATE_TOOL {
            return Err(ToolError::UnknownTool(params.name));
        }

        let request = EvaluateRequest::from_arguments(params.arguments.as_ref()).map_err(
            |source| ToolError::InvalidArguments {
                tool: params.name.clone(),
                source,
            },
        )?;

        info!(
            expression_len = request.expression.len(),
            data_len = request.data.len(),
            "calling tool {}",
            EVALUATE_TOOL
        );
        Ok(evaluate(&self.engine, &request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonata_mcp_core::{ArgumentError, JsonataEngine};

    #[test]
    fn test_evaluate_tool_schema() {
        let tool = evaluate_tool();

        assert_eq!(tool.name, "evaluate");
        assert_eq!(tool.input_schema["required"], json!(["expression"]));
        assert_eq!(tool.input_schema["properties"]["data"]["default"], "{}");
        assert_eq!(tool.input_schema["properties"]["bindings"]["default"], "{}");
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let registry = ToolRegistry::new(JsonataEngine::new());
        let params = CallToolParams {
            name: "transform".to_string(),
            arguments: None,
        };

        let err = registry.call(params).await.unwrap_err();

        assert_eq!(err, ToolError::UnknownTool("transform".to_string()));
    }

    #[tokio::test]
    async fn test_call_without_expression() {
        let registry = ToolRegistry::new(JsonataEngine::new());
        let params = CallToolParams {
            name: EVALUATE_TOOL.to_string(),
            arguments: Some(json!({"data": "{}"})),
        };

        let err = registry.call(params).await.unwrap_err();

        assert_eq!(
            err,
            ToolError::InvalidArguments {
                tool: EVALUATE_TOOL.to_string(),
                source: ArgumentError::Missing("expression"),
            }
        );
    }

    #[tokio::test]
    async fn test_call_evaluate() {
        let registry = ToolRegistry::new(JsonataEngine::new());
        let params = CallToolParams {
            name: EVALUATE_TOOL.to_string(),
            arguments: Some(json!({
                "data": r#"{"numbers":[1,2,3,4,5]}"#,
                "expression": "$sum(numbers)"
            })),
        };

        let response = registry.call(params).await.unwrap();

        assert_eq!(response, ToolResponse::text("15"));
    }
}
