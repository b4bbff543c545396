// LanceDB vector database module
// Handles vector storage and similarity search for document chunks


pub mod vector_store;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::documents::DocumentChunk;

/// One row of the vector table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Random UUID, unique per stored row
    pub id: String,
    pub vector: Vec<f32>,
    pub chunk: DocumentChunk,
    /// RFC 3339 timestamp of when the row was written
    pub created_at: String,
}

impl StoredRecord {
    #[inline]
    pub fn new(chunk: DocumentChunk, vector: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            vector,
            chunk,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// A search hit. Lower distance means more similar.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub chunk: DocumentChunk,
    /// Cosine distance to the query vector
    pub distance: f32,
}

impl RetrievedChunk {
    #[inline]
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}
