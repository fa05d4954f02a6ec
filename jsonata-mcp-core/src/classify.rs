//! Classification of values thrown by the expression engine.
//!
//! A thrown value is decoded against the structured [`ErrorRecord`] shape. If it fits,
//! only the record fields are kept. Otherwise the raw value passes through untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EngineError, write_json};

/// Structured error reported by the expression engine.
///
/// `position` is a character offset into the expression text and `token` the
/// offending lexeme at that offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub position: u64,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Outcome of decoding a thrown value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Classified {
    Structured(ErrorRecord),
    Opaque(Value),
}

impl fmt::Display for Classified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_json(f, self)
    }
}

pub fn classify(thrown: &EngineError) -> Classified {
    match serde_json::from_value::<ErrorRecord>(thrown.payload().clone()) {
        Ok(record) => Classified::Structured(record),
        Err(_) => Classified::Opaque(thrown.payload().clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_record_shape_is_structured() {
        let thrown = EngineError(json!({
            "message": "Unexpected end of expression",
            "position": 0,
            "token": "(end)",
            "stack": "dropped",
        }));

        let classified = classify(&thrown);

        assert!(matches!(classified, Classified::Structured(_)));
        assert_eq!(
            classified.to_string(),
            r#"{"message":"Unexpected end of expression","position":0,"token":"(end)"}"#
        );
    }

    #[test]
    fn test_record_keeps_value_and_code() {
        let thrown = EngineError(json!({
            "code": "T2001",
            "message": "The left side of the + operator must evaluate to a number",
            "value": "string",
            "position": 9,
            "token": "+",
        }));

        let Classified::Structured(record) = classify(&thrown) else {
            panic!("expected a structured record");
        };
        assert_eq!(record.value, Some(json!("string")));
        assert_eq!(record.code.as_deref(), Some("T2001"));
        assert_eq!(record.position, 9);
    }

    #[test]
    fn test_missing_position_is_opaque() {
        let thrown = EngineError::message("stack overflow");

        let classified = classify(&thrown);

        assert_eq!(classified, Classified::Opaque(json!({"message": "stack overflow"})));
        assert_eq!(classified.to_string(), r#"{"message":"stack overflow"}"#);
    }

    #[test]
    fn test_non_object_is_opaque() {
        let classified = classify(&EngineError(json!("boom")));

        assert_eq!(classified.to_string(), r#""boom""#);
    }
}
