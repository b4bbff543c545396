// Retrieval-augmented answering
// Retrieves chunks, renders the prompt, calls the chat model and attributes sources

pub mod attribution;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::Result;
use crate::documents::DocumentChunk;
use crate::generation::ChatModel;
use crate::memory::{ConversationMemory, ConversationTurn, SessionId};
use crate::prompt::{PromptTemplate, format_context};

pub use attribution::{KeywordClassifier, QueryClassifier, SourceAttribution};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Finds the chunks most relevant to a query, best first
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<DocumentChunk>>;
}

/// Model output plus the chunks it was given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAnswer {
    pub text: String,
    pub context: Vec<DocumentChunk>,
}

pub struct AnswerGenerator {
    retriever: Arc<dyn Retriever>,
    model: Arc<dyn ChatModel>,
    template: PromptTemplate,
    top_k: usize,
}

impl AnswerGenerator {
    #[inline]
    pub fn new(retriever: Arc<dyn Retriever>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            retriever,
            model,
            template: PromptTemplate::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    #[inline]
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    #[inline]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    #[inline]
    pub async fn generate(
        &self,
        message: &str,
        history: &[ConversationTurn],
    ) -> Result<GeneratedAnswer> {
        let context = self.retriever.retrieve(message, self.top_k).await?;
        debug!("Retrieved {} chunks for the prompt", context.len());

        let prompt = self
            .template
            .render(&format_context(&context), history, message);
        let text = self.model.complete(&prompt).await?;

        Ok(GeneratedAnswer { text, context })
    }
}

/// One chat turn end to end: history, generation, attribution, memory
pub struct Assistant {
    generator: AnswerGenerator,
    attribution: SourceAttribution,
    memory: Arc<ConversationMemory>,
    history_window: usize,
}

impl Assistant {
    #[inline]
    pub fn new(generator: AnswerGenerator, attribution: SourceAttribution) -> Self {
        Self {
            generator,
            attribution,
            memory: Arc::new(ConversationMemory::new()),
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    #[inline]
    pub fn with_memory(mut self, memory: Arc<ConversationMemory>) -> Self {
        self.memory = memory;
        self
    }

    #[inline]
    pub fn with_history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window;
        self
    }

    #[inline]
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Answer `message` in the context of `session` and remember the turn
    #[inline]
    pub async fn chat(&self, session: &SessionId, message: &str) -> Result<String> {
        let history = self.memory.recent(session, self.history_window).await;
        let answer = self.generator.generate(message, &history).await?;

        let text = self.attribution.apply(message, answer.text, &answer.context);

        self.memory
            .append(session, ConversationTurn::new(message, text.as_str()))
            .await;

        info!(
            "Answered message in session {} ({} context chunks)",
            session,
            answer.context.len()
        );
        Ok(text)
    }
}
