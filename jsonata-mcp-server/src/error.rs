use std::{io, path::PathBuf};

use jsonata_mcp_core::ArgumentError;
use thiserror::Error;

use crate::protocol::JsonRpcError;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to load config from {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

/// Failures of a `tools/call` request that are reported as protocol errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Tool {0} not found")]
    UnknownTool(String),

    #[error("Invalid arguments for tool {tool}: {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: ArgumentError,
    },
}

impl From<ToolError> for JsonRpcError {
    fn from(err: ToolError) -> Self {
        JsonRpcError::invalid_params(err)
    }
}
