//! Completion service contract: wire types and the service seam.

mod openai;
pub mod prompt;

pub use openai::OpenAiClient;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::CompletionError;

/// A chat-completion request: a single user message at fixed temperature.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// The message list; always exactly one user message here.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f32,
}

impl ChatRequest {
    /// A single-user-message request with plain text content.
    pub fn text(model: impl Into<String>, content: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: MessageContent::Text(content.into()),
            }],
            temperature,
        }
    }

    /// A single-user-message request with multimodal content parts.
    pub fn parts(model: impl Into<String>, parts: Vec<ContentPart>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: MessageContent::Parts(parts),
            }],
            temperature,
        }
    }
}

/// One chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Message role; the driver only sends "user".
    pub role: String,
    /// String or multimodal content.
    pub content: MessageContent,
}

/// Message content: a plain string or a list of typed parts.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content.
    Text(String),
    /// Multimodal content parts.
    Parts(Vec<ContentPart>),
}

/// One multimodal content part.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// A text fragment.
    Text {
        /// The fragment itself.
        text: String,
    },
    /// A reference to an externally hosted image.
    ImageUrl {
        /// The image reference.
        image_url: ImageUrl,
    },
}

/// An image reference inside a content part.
#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    /// Where the image lives.
    pub url: String,
}

/// The subset of the completion response the driver reads.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Response choices; only the first is used.
    pub choices: Vec<Choice>,
}

/// One response choice.
#[derive(Debug, Deserialize)]
pub struct Choice {
    /// The generated message.
    pub message: ResponseMessage,
}

/// The generated message of a choice.
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    /// Generated text content.
    pub content: String,
}

/// A text-or-multimodal completion capability.
///
/// The driver and pipeline are generic over this trait and run against
/// deterministic stand-ins in tests.
pub trait CompletionService {
    /// Send the request and return the first choice's message content.
    fn complete(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<String, CompletionError>> + Send;
}
