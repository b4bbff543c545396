
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::database::lancedb::{RetrievedChunk, StoredRecord, vector_store::VectorStore};
use crate::documents::{DocumentChunk, PdfIndexer, pdf_to_documents};
use crate::embeddings::{Embedder, chunking::ChunkingConfig};
use crate::rag::Retriever;
use crate::{AssistantError, Result};

/// Vector store paired with the embedder that fills it
#[derive(Clone)]
pub struct VectorIndex {
    store: VectorStore,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("store", &self.store)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl VectorIndex {
    #[inline]
    pub fn new(store: VectorStore, embedder: Arc<dyn Embedder>, batch_size: usize) -> Result<Self> {
        if embedder.dimension() != store.dimension() {
            return Err(AssistantError::DimensionMismatch {
                index: store.index_name().to_string(),
                existing: store.dimension(),
                requested: embedder.dimension(),
            });
        }

        Ok(Self {
            store,
            embedder,
            batch_size: batch_size.max(1),
        })
    }

    /// Open the index named in `config`, creating it if needed
    #[inline]
    pub async fn open(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let store = VectorStore::open(
            &config.vector_store_uri(),
            &config.vector_store.index_name,
            embedder.dimension(),
        )
        .await?;

        Self::new(store, embedder, config.vector_store.upsert_batch_size)
    }

    #[inline]
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Embed and store `chunks` batch by batch. Returns the number of stored records.
    #[inline]
    pub async fn upsert_chunks(&self, chunks: &[DocumentChunk]) -> Result<usize> {
        let total = chunks.len();
        let mut uploaded = 0;

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;

            if vectors.len() != batch.len() {
                return Err(AssistantError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }

            let records: Vec<StoredRecord> = batch
                .iter()
                .cloned()
                .zip(vectors)
                .map(|(chunk, vector)| StoredRecord::new(chunk, vector))
                .collect();

            uploaded += self.store.add_records(&records).await?;
            info!("Uploaded {}/{} chunks", uploaded, total);
        }

        Ok(uploaded)
    }

    /// The `k` chunks closest to `text`
    #[inline]
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let vector = self.embedder.embed(text).await?;
        let hits = self.store.search(&vector, k).await?;

        debug!(
            "Query matched {} chunks (best distance {:?})",
            hits.len(),
            hits.first().map(|hit| hit.distance)
        );

        Ok(hits)
    }
}

#[async_trait]
impl Retriever for VectorIndex {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<DocumentChunk>> {
        let hits = self.query(query, k).await?;
        Ok(hits.into_iter().map(|hit| hit.chunk).collect())
    }
}

/// Ingests PDFs and upserts their chunks into a `VectorIndex`
#[derive(Debug, Clone)]
pub struct PdfPipeline {
    index: VectorIndex,
    chunking: ChunkingConfig,
}

impl PdfPipeline {
    #[inline]
    pub fn new(index: VectorIndex, chunking: ChunkingConfig) -> Self {
        Self { index, chunking }
    }

    #[inline]
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}

#[async_trait]
impl PdfIndexer for PdfPipeline {
    async fn index_pdf(&self, path: &Path) -> Result<usize> {
        let chunks = pdf_to_documents(path, &self.chunking).await?;
        let stored = self.index.upsert_chunks(&chunks).await?;

        // Re-uploading a file indexes it again; nothing is deduplicated
        info!("Indexed {} chunks from {}", stored, path.display());
        Ok(stored)
    }
}
