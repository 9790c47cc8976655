use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Conversation history; only the last message is used as the prompt.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompletionRequest {
    #[validate(length(min = 1, message = "messages must contain at least one message"))]
    pub messages: Vec<Message>,
}

impl CompletionRequest {
    /// Content of the last message.
    pub fn prompt(&self) -> Option<&str> {
        self.messages.last().map(|m| m.content.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub role: String,
    pub message: String,
}

impl Reply {
    pub fn assistant(message: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CompletionResponse {
    Success { response: Vec<Reply> },
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_is_last_message_content() {
        let request: CompletionRequest = serde_json::from_value(json!({
            "messages": [
                { "role": "system", "content": "Be brief." },
                { "role": "user", "content": "Hello" }
            ]
        }))
        .unwrap();

        assert_eq!(request.prompt(), Some("Hello"));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn empty_conversation_fails_validation() {
        let request = CompletionRequest { messages: vec![] };
        assert!(request.validate().is_err());
        assert_eq!(request.prompt(), None);
    }

    #[test]
    fn success_envelope_shape() {
        let body = serde_json::to_value(CompletionResponse::Success {
            response: vec![Reply::assistant("Hi")],
        })
        .unwrap();

        assert_eq!(
            body,
            json!({ "status": "success", "response": [{ "role": "assistant", "message": "Hi" }] })
        );
    }
}
