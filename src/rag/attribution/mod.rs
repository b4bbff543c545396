
use itertools::Itertools;

use crate::documents::DocumentChunk;

pub const DEFAULT_RECIPE_KEYWORDS: [&str; 13] = [
    "recipe",
    "ingredients",
    "steps",
    "method",
    "how to cook",
    "how do i make",
    "instructions",
    "preheat",
    "bake",
    "fry",
    "boil",
    "serve",
    "servings",
];

pub const SOURCE_PREFIX: &str = "\n\n**Source:** ";

/// Decides whether a message asks for the kind of answer that should cite sources
pub trait QueryClassifier: Send + Sync {
    fn wants_sources(&self, message: &str) -> bool;
}

/// Case-insensitive substring match against a keyword list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl Default for KeywordClassifier {
    #[inline]
    fn default() -> Self {
        Self::new(DEFAULT_RECIPE_KEYWORDS)
    }
}

impl KeywordClassifier {
    #[inline]
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|keyword| keyword.as_ref().trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
        }
    }

    #[inline]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl QueryClassifier for KeywordClassifier {
    #[inline]
    fn wants_sources(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| message.contains(keyword.as_str()))
    }
}

/// Appends a source line to answers that drew on the user's documents
pub struct SourceAttribution {
    classifier: Box<dyn QueryClassifier>,
}

impl std::fmt::Debug for SourceAttribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceAttribution").finish_non_exhaustive()
    }
}

impl Default for SourceAttribution {
    #[inline]
    fn default() -> Self {
        Self::new(KeywordClassifier::default())
    }
}

impl SourceAttribution {
    #[inline]
    pub fn new(classifier: impl QueryClassifier + 'static) -> Self {
        Self {
            classifier: Box::new(classifier),
        }
    }

    /// Unique non-empty source names, alphabetically
    #[inline]
    pub fn sources(context: &[DocumentChunk]) -> Vec<&str> {
        context
            .iter()
            .map(DocumentChunk::source_name)
            .filter(|name| !name.is_empty())
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// `answer`, followed by a source line when the message asked for it and
    /// the context names at least one source
    #[inline]
    pub fn apply(&self, message: &str, answer: String, context: &[DocumentChunk]) -> String {
        if !self.classifier.wants_sources(message) {
            return answer;
        }

        let sources = Self::sources(context);
        if sources.is_empty() {
            return answer;
        }

        format!("{}{}{}", answer, SOURCE_PREFIX, sources.join(", "))
    }
}
