#[cfg(test)]
mod tests;

use super::{RetrievedChunk, StoredRecord};
use crate::documents::{ChunkMetadata, DocumentChunk};
use crate::{AssistantError, Result};
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection, DistanceType, Table,
    query::{ExecutableQuery, QueryBase},
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

const VECTOR_COLUMN: &str = "vector";
const DISTANCE_COLUMN: &str = "_distance";

/// Persistent vector table backed by LanceDB
#[derive(Clone)]
pub struct VectorStore {
    connection: Connection,
    table: Table,
    index_name: String,
    dimension: usize,
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("index_name", &self.index_name)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl VectorStore {
    /// Connect to the database at `uri` and open the table `index_name`,
    /// creating it if it does not exist yet.
    ///
    /// Opening an existing table is idempotent. Its vector width must match
    /// `dimension`, otherwise `DimensionMismatch` is returned.
    #[inline]
    pub async fn open(uri: &str, index_name: &str, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(AssistantError::Config(
                "Vector dimension must be greater than 0".to_string(),
            ));
        }
        list_width(dimension)?;

        if !uri.contains("://") {
            debug!("Ensuring vector database directory exists: {}", uri);
            std::fs::create_dir_all(Path::new(uri)).map_err(|e| {
                AssistantError::Database(format!(
                    "Failed to create vector database directory: {}",
                    e
                ))
            })?;
        }

        let connection = lancedb::connect(uri)
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to connect to LanceDB: {}", e)))?;

        let table = Self::ensure_table(&connection, index_name, dimension).await?;

        info!(
            "Vector store '{}' ready at {} ({} dimensions)",
            index_name, uri, dimension
        );

        Ok(Self {
            connection,
            table,
            index_name: index_name.to_string(),
            dimension,
        })
    }

    async fn ensure_table(
        connection: &Connection,
        index_name: &str,
        dimension: usize,
    ) -> Result<Table> {
        if Self::table_exists(connection, index_name).await? {
            debug!("Table {} already exists, checking vector dimension", index_name);
            return Self::open_existing(connection, index_name, dimension).await;
        }

        info!(
            "Creating table {} with {} dimensions",
            index_name, dimension
        );

        match connection
            .create_empty_table(index_name, record_schema(dimension))
            .execute()
            .await
        {
            Ok(table) => Ok(table),
            Err(e) => {
                // Another opener may have created it in the meantime
                if Self::table_exists(connection, index_name).await? {
                    warn!("Table {} appeared while creating it: {}", index_name, e);
                    Self::open_existing(connection, index_name, dimension).await
                } else {
                    Err(AssistantError::Database(format!(
                        "Failed to create table {}: {}",
                        index_name, e
                    )))
                }
            }
        }
    }

    async fn table_exists(connection: &Connection, index_name: &str) -> Result<bool> {
        let table_names = connection
            .table_names()
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to list tables: {}", e)))?;

        Ok(table_names.iter().any(|name| name == index_name))
    }

    async fn open_existing(
        connection: &Connection,
        index_name: &str,
        dimension: usize,
    ) -> Result<Table> {
        let table = connection
            .open_table(index_name)
            .execute()
            .await
            .map_err(|e| {
                AssistantError::Database(format!("Failed to open table {}: {}", index_name, e))
            })?;

        let schema = table
            .schema()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to get table schema: {}", e)))?;

        let existing = vector_dimension(&schema).ok_or_else(|| {
            AssistantError::Database(format!(
                "Table {} has no fixed-size vector column",
                index_name
            ))
        })?;

        if existing != dimension {
            return Err(AssistantError::DimensionMismatch {
                index: index_name.to_string(),
                existing,
                requested: dimension,
            });
        }

        Ok(table)
    }

    #[inline]
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Append records to the table
    #[inline]
    pub async fn add_records(&self, records: &[StoredRecord]) -> Result<usize> {
        if records.is_empty() {
            debug!("No records to store");
            return Ok(0);
        }

        if let Some(bad) = records.iter().find(|r| r.vector.len() != self.dimension) {
            return Err(AssistantError::DimensionMismatch {
                index: self.index_name.clone(),
                existing: self.dimension,
                requested: bad.vector.len(),
            });
        }

        let count = records.len();
        debug!("Storing batch of {} records", count);

        let record_batch = self.create_record_batch(records)?;
        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);

        self.table
            .add(reader)
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to insert records: {}", e)))?;

        debug!("Stored {} records in {}", count, self.index_name);
        Ok(count)
    }

    fn create_record_batch(&self, records: &[StoredRecord]) -> Result<RecordBatch> {
        let len = records.len();

        let mut ids = Vec::with_capacity(len);
        let mut flat_values = Vec::with_capacity(len * self.dimension);
        let mut texts = Vec::with_capacity(len);
        let mut source_types = Vec::with_capacity(len);
        let mut source_names = Vec::with_capacity(len);
        let mut pages = Vec::with_capacity(len);
        let mut chunk_ids = Vec::with_capacity(len);
        let mut created_ats = Vec::with_capacity(len);

        for record in records {
            ids.push(record.id.as_str());
            flat_values.extend_from_slice(&record.vector);
            texts.push(record.chunk.text.as_str());
            source_types.push(record.chunk.metadata.source_type.as_str());
            source_names.push(record.chunk.metadata.source_name.as_str());
            pages.push(record.chunk.metadata.page);
            chunk_ids.push(record.chunk.metadata.chunk_id);
            created_ats.push(record.created_at.as_str());
        }

        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array = FixedSizeListArray::try_new(
            field,
            list_width(self.dimension)?,
            Arc::new(Float32Array::from(flat_values)),
            None,
        )
        .map_err(|e| AssistantError::Database(format!("Failed to create vector array: {}", e)))?;

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(texts)),
            Arc::new(StringArray::from(source_types)),
            Arc::new(StringArray::from(source_names)),
            Arc::new(UInt32Array::from(pages)),
            Arc::new(UInt32Array::from(chunk_ids)),
            Arc::new(StringArray::from(created_ats)),
        ];

        RecordBatch::try_new(record_schema(self.dimension), arrays).map_err(|e| {
            AssistantError::Database(format!("Failed to create record batch: {}", e))
        })
    }

    /// Nearest neighbours of `query_vector` by cosine distance, closest first
    #[inline]
    pub async fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<RetrievedChunk>> {
        if query_vector.len() != self.dimension {
            return Err(AssistantError::DimensionMismatch {
                index: self.index_name.clone(),
                existing: self.dimension,
                requested: query_vector.len(),
            });
        }

        if k == 0 || self.count().await? == 0 {
            return Ok(Vec::new());
        }

        debug!("Searching {} for {} nearest chunks", self.index_name, k);

        let results = self
            .table
            .vector_search(query_vector)
            .map_err(|e| {
                AssistantError::Database(format!("Failed to create vector search: {}", e))
            })?
            .column(VECTOR_COLUMN)
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to execute search: {}", e)))?;

        let mut hits = parse_search_results_stream(results).await?;
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);

        debug!("Search returned {} chunks", hits.len());
        Ok(hits)
    }

    /// Number of stored records
    #[inline]
    pub async fn count(&self) -> Result<usize> {
        self.table
            .count_rows(None)
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to count rows: {}", e)))
    }

    /// Names of all tables in the connected database
    #[inline]
    pub async fn table_names(&self) -> Result<Vec<String>> {
        self.connection
            .table_names()
            .execute()
            .await
            .map_err(|e| AssistantError::Database(format!("Failed to list tables: {}", e)))
    }
}

fn list_width(dimension: usize) -> Result<i32> {
    i32::try_from(dimension).map_err(|_| {
        AssistantError::Config(format!("Vector dimension {} is too large", dimension))
    })
}

/// Schema of the vector table for vectors of `dimension` floats
#[inline]
pub fn record_schema(dimension: usize) -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new(
            VECTOR_COLUMN,
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, false)),
                i32::try_from(dimension).unwrap_or(i32::MAX),
            ),
            false,
        ),
        Field::new("text", DataType::Utf8, false),
        Field::new("source_type", DataType::Utf8, false),
        Field::new("source_name", DataType::Utf8, false),
        Field::new("page", DataType::UInt32, true),
        Field::new("chunk_id", DataType::UInt32, false),
        Field::new("created_at", DataType::Utf8, false),
    ]))
}

/// Width of the vector column, if the schema has one
fn vector_dimension(schema: &Schema) -> Option<usize> {
    schema
        .fields()
        .iter()
        .find(|field| field.name() == VECTOR_COLUMN)
        .and_then(|field| match field.data_type() {
            DataType::FixedSizeList(_, size) => usize::try_from(*size).ok(),
            _ => None,
        })
}

async fn parse_search_results_stream(
    mut results: lancedb::arrow::SendableRecordBatchStream,
) -> Result<Vec<RetrievedChunk>> {
    let mut hits = Vec::new();

    while let Some(batch) = results
        .try_next()
        .await
        .map_err(|e| AssistantError::Database(format!("Failed to read result stream: {}", e)))?
    {
        hits.extend(parse_search_batch(&batch)?);
    }

    Ok(hits)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| AssistantError::Database(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| AssistantError::Database(format!("Invalid {} column type", name)))
}

fn u32_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a UInt32Array> {
    batch
        .column_by_name(name)
        .ok_or_else(|| AssistantError::Database(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| AssistantError::Database(format!("Invalid {} column type", name)))
}

fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<RetrievedChunk>> {
    let texts = string_column(batch, "text")?;
    let source_types = string_column(batch, "source_type")?;
    let source_names = string_column(batch, "source_name")?;
    let pages = u32_column(batch, "page")?;
    let chunk_ids = u32_column(batch, "chunk_id")?;

    let distances = batch
        .column_by_name(DISTANCE_COLUMN)
        .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

    let hits = (0..batch.num_rows())
        .map(|row| RetrievedChunk {
            chunk: DocumentChunk {
                text: texts.value(row).to_string(),
                metadata: ChunkMetadata {
                    source_type: source_types.value(row).to_string(),
                    source_name: source_names.value(row).to_string(),
                    page: (!pages.is_null(row)).then(|| pages.value(row)),
                    chunk_id: chunk_ids.value(row),
                },
            },
            distance: distances
                .filter(|d| !d.is_null(row))
                .map_or(0.0, |d| d.value(row)),
        })
        .collect();

    Ok(hits)
}
