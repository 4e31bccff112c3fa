//! In-memory canvas store (non-persistent).

use super::{build_canvas, Canvas, CanvasStore, NewCanvas, StoreError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryCanvasStore {
    // Insertion order doubles as creation order.
    canvases: Arc<RwLock<Vec<Canvas>>>,
}

impl InMemoryCanvasStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CanvasStore for InMemoryCanvasStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn create_canvas(&self, canvas: NewCanvas<'_>) -> Result<Canvas, StoreError> {
        let canvas = build_canvas(canvas);
        self.canvases.write().await.push(canvas.clone());
        Ok(canvas)
    }

    async fn get_canvas(&self, id: Uuid) -> Result<Option<Canvas>, StoreError> {
        Ok(self
            .canvases
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn list_canvases(&self, owner_id: &str, limit: usize) -> Result<Vec<Canvas>, StoreError> {
        Ok(self
            .canvases
            .read()
            .await
            .iter()
            .rev()
            .filter(|c| c.owner_id == owner_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
