//! # jsonata-mcp-core
//!
//! Evaluates a JSONata expression against a JSON document with optional variable
//! bindings. The result comes back as a single text content item.
//!
//! The query language itself comes from the `jsonata-rs` crate behind the
//! [`ExpressionEngine`] seam. This crate adds the following:
//!
//! - coercion of the three string inputs ([`request`])
//! - classification of engine failures ([`classify`])
//! - the ordered evaluate pipeline and its response envelope ([`handler`], [`response`])
//!
//! ```no_run
//! use jsonata_mcp_core::{EvaluateRequest, JsonataEngine, evaluate};
//!
//! # async fn demo() {
//! let request = EvaluateRequest::new("$sum(numbers)").with_data(r#"{"numbers":[1,2,3]}"#);
//! let response = evaluate(&JsonataEngine::new(), &request).await;
//! assert_eq!(response.first_text(), Some("6"));
//! # }
//! ```

pub mod classify;
pub mod engine;
pub mod error;
pub mod handler;
pub mod jsonata;
pub mod request;
pub mod response;

pub use classify::{Classified, ErrorRecord, classify};
pub use engine::{CompiledExpression, ExpressionEngine};
pub use error::{ArgumentError, EngineError, EvaluateError, EvaluateResult, JsonInputError};
pub use handler::{NULL_OR_UNDEFINED, evaluate};
pub use jsonata::JsonataEngine;
pub use request::EvaluateRequest;
pub use response::{ContentItem, ToolResponse};
