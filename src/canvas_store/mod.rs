//! Canvas storage.
//!
//! A canvas is a block of generated long-form content shown to the admin in
//! a side panel. Canvases are created once and never mutated.

mod memory;
mod sqlite;

pub use memory::InMemoryCanvasStore;
pub use sqlite::SqliteCanvasStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;

/// A persisted generated artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Canvas {
    pub id: Uuid,
    pub content: String,
    pub prompt: String,
    pub owner_id: String,
    /// RFC 3339 creation time
    pub created_at: String,
}

/// Fields supplied when creating a canvas.
#[derive(Debug, Clone)]
pub struct NewCanvas<'a> {
    pub content: &'a str,
    pub prompt: &'a str,
    pub owner_id: &'a str,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("corrupt canvas row: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait CanvasStore: Send + Sync {
    /// Whether canvases survive a restart.
    fn is_persistent(&self) -> bool;

    async fn create_canvas(&self, canvas: NewCanvas<'_>) -> Result<Canvas, StoreError>;

    async fn get_canvas(&self, id: Uuid) -> Result<Option<Canvas>, StoreError>;

    /// Canvases of one owner, newest first.
    async fn list_canvases(&self, owner_id: &str, limit: usize) -> Result<Vec<Canvas>, StoreError>;
}

pub type SharedCanvasStore = Arc<dyn CanvasStore>;

pub(crate) fn now_string() -> String {
    Utc::now().to_rfc3339()
}

pub(crate) fn build_canvas(canvas: NewCanvas<'_>) -> Canvas {
    Canvas {
        id: Uuid::new_v4(),
        content: canvas.content.to_string(),
        prompt: canvas.prompt.to_string(),
        owner_id: canvas.owner_id.to_string(),
        created_at: now_string(),
    }
}

/// Open the configured backend: SQLite when `DATABASE_PATH` is set, memory otherwise.
pub fn create_canvas_store(config: &Config) -> Result<SharedCanvasStore, StoreError> {
    let store: SharedCanvasStore = match &config.database_path {
        Some(path) => {
            tracing::info!("Canvas store: sqlite at {}", path.display());
            Arc::new(SqliteCanvasStore::open(path)?)
        }
        None => Arc::new(InMemoryCanvasStore::new()),
    };
    if !store.is_persistent() {
        tracing::warn!("DATABASE_PATH not set, canvases are kept in memory only");
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn backend_follows_database_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new("key".to_string(), "secret".to_string());
        assert!(!create_canvas_store(&config).unwrap().is_persistent());

        config.database_path = Some(dir.path().join("data").join("canvases.db"));
        let store = create_canvas_store(&config).unwrap();
        assert!(store.is_persistent());
        assert!(store.list_canvases("admin-1", 10).await.unwrap().is_empty());
    }
}
