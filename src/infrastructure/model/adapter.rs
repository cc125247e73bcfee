//! Message adapters - convert chat messages to backend wire formats

use crate::domain::types::ChatMessage;
use serde_json::{Value, json};

/// Adapter for converting messages to different API formats
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert messages to the chat-completions format
    /// Returns: [{"role": "...", "content": "..."}]
    pub fn to_openai_format(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content.clone()
                })
            })
            .collect()
    }

    /// Convert messages to the Ollama `/api/chat` format.
    /// Messages are forwarded as given, blank ones included.
    pub fn to_ollama_format(messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content.clone()
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_format_preserves_order_and_roles() {
        let messages = vec![
            ChatMessage::system("stay concise"),
            ChatMessage::user("hi"),
            ChatMessage::assistant(""),
        ];
        let wire = MessageAdapter::to_openai_format(&messages);
        let roles: Vec<_> = wire.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert_eq!(wire[1], json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn ollama_format_keeps_blank_messages() {
        let messages = vec![ChatMessage::user("practice plan"), ChatMessage::assistant("  ")];
        let wire = MessageAdapter::to_ollama_format(&messages);
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0]["content"], "practice plan");
        assert_eq!(wire[1], json!({"role": "assistant", "content": "  "}));
    }
}
