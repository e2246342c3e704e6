//! LanceDB connection and collection housekeeping.
//!
//! A collection is one Lance table under the store directory. Tables are created
//! empty with the store's fixed vector dimension so that an existing collection
//! can be opened before anything has been written to it.

use arrow_array::RecordBatchIterator;
use async_trait::async_trait;
use lancedb::{connect, Connection};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use docpilot_core::traits::IndexStore;
use docpilot_core::{Error, Result};

use crate::collection::LanceCollection;
use crate::schema::build_chunk_schema;

pub(crate) fn store_err(e: impl std::fmt::Display) -> Error {
    Error::Transport(format!("index store: {e}"))
}

pub async fn open_db(uri: &str) -> Result<Connection> {
    connect(uri).execute().await.map_err(store_err)
}

pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<arrow_schema::Schema>) -> Result<()> {
    if table_exists(conn, name).await? {
        return Ok(());
    }
    // create empty table with 0 rows
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema.clone());
    conn.create_table(name, Box::new(iter)).execute().await.map_err(store_err)?;
    Ok(())
}

async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await.map_err(store_err)?;
    Ok(names.iter().any(|n| n == name))
}

fn check_dim(dim: usize) -> Result<()> {
    if dim == 0 {
        return Err(Error::InvalidConfig("vector dimension must be positive".to_string()));
    }
    Ok(())
}

/// Filesystem-backed vector store holding one table per collection.
pub struct LanceStore {
    db: Connection,
    path: PathBuf,
    dim: usize,
}

impl LanceStore {
    /// Open the store at `path`, creating the directory if needed.
    pub async fn open(path: &Path, dim: usize) -> Result<Self> {
        check_dim(dim)?;
        std::fs::create_dir_all(path)?;
        Self::connect(path, dim).await
    }

    /// Open a store that ingestion already created. Leaves the filesystem
    /// untouched when `path` does not exist.
    pub async fn open_existing(path: &Path, dim: usize) -> Result<Self> {
        check_dim(dim)?;
        if !path.is_dir() {
            return Err(Error::NotFound(format!("no index store at {}", path.display())));
        }
        Self::connect(path, dim).await
    }

    async fn connect(path: &Path, dim: usize) -> Result<Self> {
        let db = open_db(&path.to_string_lossy()).await?;
        Ok(Self { db, path: path.to_path_buf(), dim })
    }

    async fn open_collection(&self, name: &str) -> Result<LanceCollection> {
        let table = self.db.open_table(name).execute().await.map_err(store_err)?;
        Ok(LanceCollection::new(table, name, self.dim))
    }
}

#[async_trait]
impl IndexStore for LanceStore {
    type Collection = LanceCollection;

    async fn get_or_create_collection(&self, name: &str) -> Result<LanceCollection> {
        if !table_exists(&self.db, name).await? {
            let dim = i32::try_from(self.dim)
                .map_err(|_| Error::InvalidConfig(format!("vector dimension {} is too large", self.dim)))?;
            ensure_table(&self.db, name, build_chunk_schema(dim)).await?;
            info!("Created collection '{}' at {}", name, self.path.display());
        }
        self.open_collection(name).await
    }

    async fn get_existing_collection(&self, name: &str) -> Result<LanceCollection> {
        if !table_exists(&self.db, name).await? {
            return Err(Error::NotFound(format!(
                "collection '{}' does not exist at {}",
                name,
                self.path.display()
            )));
        }
        self.open_collection(name).await
    }
}
