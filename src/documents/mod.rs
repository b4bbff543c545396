// Document ingestion
// Turns uploaded files into chunks ready for embedding

pub mod pdf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::embeddings::chunking::{ChunkingConfig, TextSplitter};
use crate::{AssistantError, Result};

pub use pdf::{extract_pages, is_pdf, pdftotext_available};

pub const PDF_SOURCE_TYPE: &str = "pdf";

/// Where a chunk came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source_type: String,
    /// Base name of the source file
    pub source_name: String,
    /// Zero-based page index, if the source has pages
    pub page: Option<u32>,
    /// Zero-based, sequential within one ingestion run
    pub chunk_id: u32,
}

/// A bounded piece of a source document, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    #[inline]
    pub fn source_name(&self) -> &str {
        &self.metadata.source_name
    }
}

/// Makes a PDF on disk searchable. Returns the number of chunks indexed.
#[async_trait]
pub trait PdfIndexer: Send + Sync {
    async fn index_pdf(&self, path: &Path) -> Result<usize>;
}

/// Extract, split and tag every page of the PDF at `path`
#[inline]
pub async fn pdf_to_documents(
    path: &Path,
    config: &ChunkingConfig,
) -> Result<Vec<DocumentChunk>> {
    let source_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            AssistantError::Ingestion(format!("'{}' has no file name", path.display()))
        })?;

    info!("Ingesting {}", path.display());

    let pages = extract_pages(path).await?;
    let chunks = chunk_pages(&pages, &source_name, config);

    info!(
        "Split {} into {} chunks across {} pages",
        source_name,
        chunks.len(),
        pages.len()
    );

    Ok(chunks)
}

/// Split each page on its own so that no chunk spans two pages.
/// Chunk ids continue across pages.
#[inline]
pub fn chunk_pages<S: AsRef<str>>(
    pages: &[S],
    source_name: &str,
    config: &ChunkingConfig,
) -> Vec<DocumentChunk> {
    let splitter = TextSplitter::new(config);
    let mut chunks = Vec::new();
    let mut next_id: u32 = 0;

    for (page_index, page) in pages.iter().enumerate() {
        let page_chunks = splitter.split_text(page.as_ref());
        debug!("Page {} produced {} chunks", page_index, page_chunks.len());

        for text in page_chunks {
            chunks.push(DocumentChunk {
                text,
                metadata: ChunkMetadata {
                    source_type: PDF_SOURCE_TYPE.to_string(),
                    source_name: source_name.to_string(),
                    page: u32::try_from(page_index).ok(),
                    chunk_id: next_id,
                },
            });
            next_id = next_id.saturating_add(1);
        }
    }

    chunks
}
