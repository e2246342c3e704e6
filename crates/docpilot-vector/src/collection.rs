use arrow_array::types::Float32Type;
use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};
use std::sync::Arc;
use tracing::debug;

use docpilot_core::traits::VectorCollection;
use docpilot_core::types::{ChunkMetadata, StoredMatch};
use docpilot_core::{Error, Result};

use crate::schema::build_chunk_schema;
use crate::table::store_err;

/// One Lance table of chunks, searched by cosine distance and upserted by `id`.
#[derive(Clone)]
pub struct LanceCollection {
    table: Table,
    name: String,
    dim: usize,
}

impl LanceCollection {
    pub(crate) fn new(table: Table, name: &str, dim: usize) -> Self {
        Self { table, name: name.to_string(), dim }
    }

    fn to_record_batch(
        &self,
        ids: &[String],
        vectors: &[Vec<f32>],
        metadata: &[ChunkMetadata],
        contents: &[String],
    ) -> Result<RecordBatch> {
        let dim = i32::try_from(self.dim).map_err(|_| Error::InvalidConfig(format!("vector dimension {} is too large", self.dim)))?;
        let sources: Vec<&str> = metadata.iter().map(|m| m.source.as_str()).collect();
        let headings: Vec<&str> = metadata.iter().map(|m| m.heading.as_str()).collect();
        let vectors = vectors.iter().map(|v| Some(v.iter().copied().map(Some).collect::<Vec<_>>()));
        RecordBatch::try_new(build_chunk_schema(dim), vec![
            Arc::new(StringArray::from(ids.to_vec())),
            Arc::new(StringArray::from(sources)),
            Arc::new(StringArray::from(headings)),
            Arc::new(StringArray::from(contents.to_vec())),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors, dim)),
        ])
        .map_err(store_err)
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| store_err(format!("missing {name} column")))
}

#[async_trait]
impl VectorCollection for LanceCollection {
    fn name(&self) -> &str { &self.name }

    async fn add(
        &self,
        ids: &[String],
        vectors: &[Vec<f32>],
        metadata: &[ChunkMetadata],
        contents: &[String],
    ) -> Result<()> {
        let n = ids.len();
        if vectors.len() != n || metadata.len() != n || contents.len() != n {
            return Err(Error::MalformedInput(format!(
                "misaligned add: {} ids, {} vectors, {} metadata, {} contents",
                n,
                vectors.len(),
                metadata.len(),
                contents.len()
            )));
        }
        if n == 0 {
            return Ok(());
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dim) {
            return Err(Error::MalformedInput(format!(
                "vector dimension {} does not match collection dimension {}",
                bad.len(),
                self.dim
            )));
        }

        let batch = self.to_record_batch(ids, vectors, metadata, contents)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        if self.count().await? == 0 {
            self.table.add(reader).execute().await.map_err(store_err)?;
        } else {
            // Upsert: re-ingesting an unchanged corpus rewrites rows in place.
            let mut mi = self.table.merge_insert(&["id"]);
            mi.when_matched_update_all(None).when_not_matched_insert_all();
            mi.execute(reader).await.map_err(store_err)?;
        }
        debug!(rows = n, collection = %self.name, "wrote rows");
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<StoredMatch>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        if vector.len() != self.dim {
            return Err(Error::MalformedInput(format!(
                "query vector dimension {} does not match collection dimension {}",
                vector.len(),
                self.dim
            )));
        }
        let mut stream = self
            .table
            .vector_search(vector.to_vec())
            .map_err(store_err)?
            .distance_type(DistanceType::Cosine)
            .limit(k)
            .execute()
            .await
            .map_err(store_err)?;

        let mut matches = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(store_err)? {
            let sources = string_column(&batch, "source")?;
            let headings = string_column(&batch, "heading")?;
            let contents = string_column(&batch, "content")?;
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>());
            for i in 0..batch.num_rows() {
                matches.push(StoredMatch {
                    content: contents.value(i).to_string(),
                    metadata: ChunkMetadata {
                        source: sources.value(i).to_string(),
                        heading: headings.value(i).to_string(),
                    },
                    distance: distances.map_or(f32::NAN, |d| d.value(i)),
                });
            }
        }
        // Stable: equal distances keep the order the store produced.
        matches.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(k);
        Ok(matches)
    }

    async fn count(&self) -> Result<usize> {
        self.table.count_rows(None).await.map_err(store_err)
    }
}
