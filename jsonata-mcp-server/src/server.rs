//! The MCP server loop.
//!
//! Messages are newline-delimited JSON-RPC 2.0 objects. They are handled one at a
//! time in arrival order, and each request gets exactly one response line.
//! Notifications get none.

use jsonata_mcp_core::{ExpressionEngine, JsonataEngine};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::protocol::{
    CallToolParams, InitializeParams, InitializeResult, JSONRPC_VERSION, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerCapabilities, methods,
    negotiate_protocol_version,
};
use crate::tools::ToolRegistry;

pub struct McpServer<E = JsonataEngine> {
    config: ServerConfig,
    tools: ToolRegistry<E>,
}

impl McpServer<JsonataEngine> {
    pub fn with_config(config: ServerConfig) -> Self {
        Self::new(config, JsonataEngine::new())
    }
}

impl<E: ExpressionEngine> McpServer<E> {
    pub fn new(config: ServerConfig, engine: E) -> Self {
        Self {
            config,
            tools: ToolRegistry::new(engine),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serves on the process's stdin and stdout until stdin closes.
    pub async fn serve_stdio(&self) -> ServerResult<()> {
        info!(
            "Starting {} {} on stdio",
            self.config.name, self.config.version
        );
        self.run(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Reads messages from `reader` and writes responses to `writer` until EOF.
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> ServerResult<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(&line).await {
                let mut payload = serde_json::to_vec(&response)?;
                payload.push(b'\n');
                writer.write_all(&payload).await?;
                writer.flush().await?;
            }
        }

        info!("Input closed, shutting down");
        Ok(())
    }

    /// Handles one raw message. Returns `None` when no reply is due.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping unparseable message: {}", e);
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::parse_error(e),
                ));
            }
        };

        let id = message.get("id").cloned().unwrap_or(Value::Null);

        let Some(object) = message.as_object() else {
            return Some(JsonRpcResponse::failure(
                Value::Null,
                JsonRpcError::invalid_request("expected a JSON object (batches are not supported)"),
            ));
        };

        if !object.contains_key("method") {
            if object.contains_key("result") || object.contains_key("error") {
                debug!("Ignoring response message for id {}", id);
                return None;
            }
            return Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::invalid_request("missing method"),
            ));
        }

        let request: JsonRpcRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id,
                    JsonRpcError::invalid_request(e),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::failure(
                id,
                JsonRpcError::invalid_request(format!(
                    "unsupported jsonrpc version {}",
                    request.jsonrpc
                )),
            ));
        }

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };

        debug!(method = %request.method, id = %id, "Handling request");
        let outcome = match request.method.as_str() {
            methods::INITIALIZE => self.initialize(request.params),
            methods::PING => Ok(json!({})),
            methods::TOOLS_LIST => to_result(&ListToolsResult {
                tools: self.tools.list(),
            }),
            methods::TOOLS_CALL => self.call_tool(request.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => {
                debug!(code = error.code, "Request failed: {}", error.message);
                JsonRpcResponse::failure(id, error)
            }
        })
    }

    fn handle_notification(&self, method: &str) {
        match method {
            methods::INITIALIZED => info!("Client initialized"),
            methods::CANCELLED => debug!("Ignoring cancellation; requests run to completion"),
            other => debug!("Ignoring notification {}", other),
        }
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = match params {
            Some(params) => decode_params(params)?,
            None => InitializeParams::default(),
        };

        if let Some(client) = &params.client_info {
            info!("Initializing session for {} {}", client.name, client.version);
        }

        to_result(&InitializeResult {
            protocol_version: negotiate_protocol_version(params.protocol_version.as_deref())
                .to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: self.config.server_info(),
            instructions: self.config.instructions.clone(),
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: CallToolParams = match params {
            Some(params) => decode_params(params)?,
            None => return Err(JsonRpcError::invalid_params("missing params")),
        };

        let response = self.tools.call(params).await?;
        to_result(&response)
    }
}

fn decode_params<T: DeserializeOwned>(params: Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(params).map_err(JsonRpcError::invalid_params)
}

fn to_result<T: Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(JsonRpcError::internal_error)
}
