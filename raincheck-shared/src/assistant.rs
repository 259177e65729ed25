/// "RainCheck AI" chat assistant
///
/// A small conversational helper for productivity questions and
/// brainstorming. Unlike the suggestion flow, replies are free-form Markdown
/// text, not structured JSON. The caller keeps the conversation history and
/// sends it along with each new message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::suggest::{GeminiClient, SuggestError};

/// System prompt establishing the assistant persona
pub const ASSISTANT_PROMPT: &str = "You are a helpful AI assistant named \"RainCheck AI\". \
     Your goal is to help users with their tasks, productivity, and brainstorming.\n\n\
     Keep your responses concise and helpful. Use Markdown for formatting where appropriate.";

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The end user
    User,
    /// The assistant
    Model,
}

/// One turn of the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatMessage {
    /// Who wrote the message
    pub role: ChatRole,

    /// Message text
    pub text: String,
}

/// Service capable of answering a chat message in context
#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Produces a reply to `message`, given the prior conversation
    async fn reply(
        &self,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, SuggestError>;
}

/// Builds the `generateContent` request body for an assistant turn
///
/// History turns become model-API contents in order, the new message is
/// appended as a final user turn, and the persona rides along as the system
/// instruction.
fn build_request(history: &[ChatMessage], message: &str) -> serde_json::Value {
    let mut contents: Vec<serde_json::Value> = history
        .iter()
        .map(|turn| {
            serde_json::json!({
                "role": match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                },
                "parts": [{ "text": turn.text }],
            })
        })
        .collect();

    contents.push(serde_json::json!({
        "role": "user",
        "parts": [{ "text": message }],
    }));

    serde_json::json!({
        "systemInstruction": { "parts": [{ "text": ASSISTANT_PROMPT }] },
        "contents": contents,
    })
}

#[async_trait]
impl AssistantService for GeminiClient {
    async fn reply(
        &self,
        history: &[ChatMessage],
        message: &str,
    ) -> Result<String, SuggestError> {
        debug!(history_len = history.len(), "Requesting assistant reply");

        let request = build_request(history, message);
        self.generate_text(&request).await
    }
}

/// Assistant returning a fixed reply, for tests and demos
pub struct StaticAssistantService {
    reply: String,
}

impl StaticAssistantService {
    /// Creates an assistant that always returns the given reply
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Default for StaticAssistantService {
    fn default() -> Self {
        Self::new("Try breaking the task into smaller steps.")
    }
}

#[async_trait]
impl AssistantService for StaticAssistantService {
    async fn reply(
        &self,
        _history: &[ChatMessage],
        _message: &str,
    ) -> Result<String, SuggestError> {
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_role_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ChatRole::User).unwrap(), "user");
        assert_eq!(serde_json::to_value(ChatRole::Model).unwrap(), "model");
    }

    #[test]
    fn test_chat_message_rejects_unknown_fields() {
        let result = serde_json::from_value::<ChatMessage>(serde_json::json!({
            "role": "user",
            "text": "hi",
            "attachment": "x"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_build_request_appends_message_as_user_turn() {
        let history = vec![
            ChatMessage {
                role: ChatRole::User,
                text: "How do I plan my week?".to_string(),
            },
            ChatMessage {
                role: ChatRole::Model,
                text: "Start with the three most important tasks.".to_string(),
            },
        ];

        let request = build_request(&history, "What about deadlines?");
        let contents = request["contents"].as_array().unwrap();

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "What about deadlines?");
    }

    #[test]
    fn test_build_request_carries_persona_prompt() {
        let request = build_request(&[], "hello");

        assert_eq!(
            request["systemInstruction"]["parts"][0]["text"],
            ASSISTANT_PROMPT
        );
        assert!(ASSISTANT_PROMPT.contains("RainCheck AI"));
    }

    #[tokio::test]
    async fn test_static_assistant_returns_fixed_reply() {
        let assistant = StaticAssistantService::new("Use a timer.");
        let reply = assistant.reply(&[], "any tips?").await.unwrap();
        assert_eq!(reply, "Use a timer.");
    }
}
