//! Core data models shared by the responder, the moderator, and the RAG
//! pipeline.
//!
//! None of these types outlive a single request: message sequences are built
//! fresh, sent to the completion service, and dropped.

use serde::{Deserialize, Serialize};

/// Role tag of a single message segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged segment of a conversation sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A persona's reply, as returned to HTTP callers.
///
/// `name` carries the persona identifier (e.g. `"mateo"`), not the display
/// name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaResponse {
    pub name: String,
    pub message: String,
}

/// A piece of page text produced by the splitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in the source text, contiguous from 0.
    pub index: usize,
    pub text: String,
}

/// A chunk returned from the vector index with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub index: usize,
    pub text: String,
    pub score: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let msg = ChatMessage::system("hola");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "hola");
    }

    #[test]
    fn test_persona_response_shape() {
        let resp = PersonaResponse {
            name: "lucia".to_string(),
            message: "Vaya, qué sorpresa.".to_string(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "lucia", "message": "Vaya, qué sorpresa."})
        );
    }
}
