//! Request types for the VR/VA benefit engine API.

use serde::{Deserialize, Serialize};

/// Request body for the `/ask` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// Free-text question about the benefit policy.
    pub question: String,
}

impl AskRequest {
    /// The trimmed question, or `None` when blank.
    pub fn question(&self) -> Option<&str> {
        Some(self.question.trim()).filter(|q| !q.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ask_request() {
        let request: AskRequest =
            serde_json::from_str(r#"{"question": " Quem recebe VR? "}"#).unwrap();
        assert_eq!(request.question(), Some("Quem recebe VR?"));
    }

    #[test]
    fn test_blank_question() {
        let request = AskRequest {
            question: "   ".to_string(),
        };
        assert_eq!(request.question(), None);
    }

    #[test]
    fn test_missing_question_field_fails() {
        let result: Result<AskRequest, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }
}
