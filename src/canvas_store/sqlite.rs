//! SQLite-backed canvas store.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{build_canvas, Canvas, CanvasStore, NewCanvas, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS canvases (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    content TEXT NOT NULL,
    prompt TEXT NOT NULL,
    owner_id TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_canvases_owner ON canvases(owner_id, seq);
";

#[derive(Clone)]
pub struct SqliteCanvasStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCanvasStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create {}: {}", parent.display(), e);
            }
        }
        Self::from_connection(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking closure against the connection off the async runtime.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Corrupt("connection mutex poisoned".to_string()))?;
            f(&guard)
        })
        .await?
    }
}

fn row_to_canvas(row: &Row<'_>) -> rusqlite::Result<(String, String, String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn into_canvas(
    (id, content, prompt, owner_id, created_at): (String, String, String, String, String),
) -> Result<Canvas, StoreError> {
    let id = Uuid::parse_str(&id).map_err(|e| StoreError::Corrupt(format!("id {}: {}", id, e)))?;
    Ok(Canvas {
        id,
        content,
        prompt,
        owner_id,
        created_at,
    })
}

#[async_trait]
impl CanvasStore for SqliteCanvasStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn create_canvas(&self, canvas: NewCanvas<'_>) -> Result<Canvas, StoreError> {
        let canvas = build_canvas(canvas);
        let row = canvas.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO canvases (id, content, prompt, owner_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    row.id.to_string(),
                    row.content,
                    row.prompt,
                    row.owner_id,
                    row.created_at
                ],
            )?;
            Ok(())
        })
        .await?;
        Ok(canvas)
    }

    async fn get_canvas(&self, id: Uuid) -> Result<Option<Canvas>, StoreError> {
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, content, prompt, owner_id, created_at FROM canvases WHERE id = ?1",
                params![id.to_string()],
                row_to_canvas,
            )
            .optional()?
            .map(into_canvas)
            .transpose()
        })
        .await
    }

    async fn list_canvases(&self, owner_id: &str, limit: usize) -> Result<Vec<Canvas>, StoreError> {
        let owner_id = owner_id.to_string();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, prompt, owner_id, created_at FROM canvases
                 WHERE owner_id = ?1 ORDER BY seq DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![owner_id, limit], row_to_canvas)?;
            let canvases = rows
                .map(|row| into_canvas(row?))
                .collect::<Result<Vec<_>, StoreError>>()?;
            Ok(canvases)
        })
        .await
    }
}
