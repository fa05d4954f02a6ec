use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

use crate::error::{ServerError, ServerResult};
use crate::protocol::Implementation;

/// Server configuration
///
/// Every field has a default, so a config file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server name reported in `initialize`
    #[serde(default = "default_name")]
    pub name: String,

    /// Server version reported in `initialize`
    #[serde(default = "default_version")]
    pub version: String,

    /// Optional usage hint sent to clients in `initialize`
    #[serde(default)]
    pub instructions: Option<String>,
}

fn default_name() -> String {
    "JSONata".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            instructions: None,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: &Path) -> ServerResult<Self> {
        let file = File::open(path).map_err(|e| ServerError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| ServerError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn server_info(&self) -> Implementation {
        Implementation {
            name: self.name.clone(),
            version: self.version.clone(),
        }
    }
}
