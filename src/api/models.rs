use serde::Serialize;
use serde_json::Value;

use crate::error::{ErrorKind, PipelineError};

/// Pulls `message` out of a request body. Absent or non-string is "".
pub fn message_from(body: &Value) -> &str {
    body.get("message").and_then(Value::as_str).unwrap_or("")
}

/// `{"response": ...}`, optionally with `status` and `error_kind`.
#[derive(Debug, Serialize, PartialEq)]
pub struct ChatResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ChatResponse {
    pub fn from_result(result: Result<String, PipelineError>, structured: bool) -> Self {
        match result {
            Ok(response) => ChatResponse {
                response,
                status: structured.then_some("ok"),
                error_kind: None,
            },
            Err(e) => ChatResponse {
                response: e.to_string(),
                status: structured.then_some("error"),
                error_kind: structured.then(|| e.kind()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_extraction() {
        assert_eq!(message_from(&json!({"message": "hi"})), "hi");
        assert_eq!(message_from(&json!({"message": 42})), "");
        assert_eq!(message_from(&json!({"other": "x"})), "");
        assert_eq!(message_from(&json!(["message"])), "");
    }

    #[test]
    fn test_legacy_shape() {
        let body = serde_json::to_value(ChatResponse::from_result(
            Err(PipelineError::NoResults),
            false,
        ))
        .unwrap();
        assert_eq!(body, json!({"response": "No Google search results found."}));
    }

    #[test]
    fn test_structured_shape() {
        let body = serde_json::to_value(ChatResponse::from_result(
            Err(PipelineError::OutOfScope),
            true,
        ))
        .unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["error_kind"], "out_of_scope");

        let ok = serde_json::to_value(ChatResponse::from_result(Ok("x".to_string()), true)).unwrap();
        assert_eq!(ok, json!({"response": "x", "status": "ok"}));
    }
}
