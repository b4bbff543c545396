// Prompt template
// Persona and formatting rules sent to the chat model on every turn


use crate::documents::DocumentChunk;
use crate::memory::ConversationTurn;
use crate::{AssistantError, Result};

pub const CONTEXT_PLACEHOLDER: &str = "{context}";
pub const HISTORY_PLACEHOLDER: &str = "{chat_history}";
pub const INPUT_PLACEHOLDER: &str = "{input}";

const DEFAULT_TEMPLATE: &str = include_str!("foodbot.txt");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    #[inline]
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    /// A custom template. It must at least contain `{input}`.
    #[inline]
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(INPUT_PLACEHOLDER) {
            return Err(AssistantError::Config(format!(
                "Prompt template must contain {}",
                INPUT_PLACEHOLDER
            )));
        }
        Ok(Self { template })
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Fill the placeholders in a single pass, so placeholder-like text inside
    /// the inserted values is left alone.
    #[inline]
    pub fn render(&self, context: &str, history: &[ConversationTurn], input: &str) -> String {
        let history = format_history(history);
        let values = [
            (CONTEXT_PLACEHOLDER, context),
            (HISTORY_PLACEHOLDER, history.as_str()),
            (INPUT_PLACEHOLDER, input),
        ];

        let mut rendered = String::with_capacity(
            self.template.len() + context.len() + history.len() + input.len(),
        );
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            let (before, candidate) = rest.split_at(start);
            rendered.push_str(before);

            let matched = values.iter().find_map(|(placeholder, value)| {
                candidate
                    .strip_prefix(placeholder)
                    .map(|after| (*value, after))
            });

            if let Some((value, after)) = matched {
                rendered.push_str(value);
                rest = after;
            } else {
                rendered.push('{');
                rest = candidate.strip_prefix('{').unwrap_or_default();
            }
        }

        rendered.push_str(rest);
        rendered
    }
}

/// Chunk texts separated by blank lines
#[inline]
pub fn format_context(chunks: &[DocumentChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[inline]
pub fn format_history(turns: &[ConversationTurn]) -> String {
    if turns.is_empty() {
        return "(no earlier messages)".to_string();
    }

    turns
        .iter()
        .map(|turn| format!("User: {}\nFoodBot: {}", turn.input, turn.output))
        .collect::<Vec<_>>()
        .join("\n\n")
}
