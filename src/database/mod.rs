// Database module
// Persistent vector storage for document chunks, and the index that embeds into it

pub mod index;
pub mod lancedb;

pub use self::index::{PdfPipeline, VectorIndex};
pub use self::lancedb::{RetrievedChunk, StoredRecord, vector_store::VectorStore};
