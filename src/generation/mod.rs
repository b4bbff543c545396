// Text generation
// Hosted chat-completion models that turn a rendered prompt into an answer

pub mod gemini;

use async_trait::async_trait;

use crate::Result;

pub use gemini::GeminiClient;

/// A model that completes a single prompt
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
