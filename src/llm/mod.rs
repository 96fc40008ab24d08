//! LLM provider abstraction layer.
//!
//! The orchestrator talks to a vision-capable chat model through the
//! [`LlmProvider`] trait; [`OpenAIProvider`] is the HTTP implementation.

mod openai;
mod provider;
mod types;

pub use openai::{OpenAIProvider, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{
    CompletionResponse, ContentPart, FinishReason, ImageDetail, Message, MessageRole, TokenUsage,
};
