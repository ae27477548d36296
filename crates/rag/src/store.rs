//! Vector store boundary and the SQLite-backed default adapter.
//!
//! The orchestrator depends on the [`VectorStore`] trait only; the
//! nearest-neighbor search itself is a black box. The shipped adapter keeps
//! chunks in SQLite with a `domain` partition column and computes similarity
//! in Rust. Writes happen during ingestion only; query time is read-only.

use crate::types::{Chunk, DocumentMeta, Hit};
use askdocs_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// Per-partition nearest-neighbor search.
///
/// Returned hits are sorted by ascending distance (lower is better) and
/// capped at `k`.
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    async fn search(&self, domain: &str, query_embedding: &[f32], k: usize)
        -> AppResult<Vec<Hit>>;
}

/// Per-domain document and chunk counts.
#[derive(Debug, Clone)]
pub struct PartitionStats {
    pub domain: String,
    pub documents: u32,
    pub chunks: u32,
}

/// SQLite-backed vector store with one logical partition per domain.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Open (or create) the store at the given path.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Retrieval(format!("Failed to create index directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Retrieval(format!("Failed to open SQLite index: {}", e)))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                domain TEXT NOT NULL,
                chunk_count INTEGER NOT NULL,
                size_bytes INTEGER NOT NULL,
                ingested_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                domain TEXT NOT NULL,
                position INTEGER NOT NULL,
                text TEXT NOT NULL,
                embedding BLOB NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chunks_domain ON chunks(domain);
            CREATE INDEX IF NOT EXISTS idx_documents_domain ON documents(domain);
            "#,
        )
        .map_err(|e| AppError::Retrieval(format!("Failed to create tables: {}", e)))?;

        tracing::debug!("Opened SQLite vector store at {:?}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Insert or replace a document's metadata. Ingestion-side only.
    pub fn upsert_document(&self, doc: &DocumentMeta) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO documents (id, filename, domain, chunk_count, size_bytes, ingested_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                doc.id,
                doc.filename,
                doc.domain,
                doc.chunk_count as i64,
                doc.size_bytes as i64,
                doc.ingested_at.to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::Retrieval(format!("Failed to insert document: {}", e)))?;

        Ok(())
    }

    /// Insert or replace a chunk with its embedding. Ingestion-side only.
    pub fn upsert_chunk(&self, chunk: &Chunk) -> AppResult<()> {
        let embedding = chunk
            .embedding
            .as_ref()
            .ok_or_else(|| AppError::Retrieval("Chunk missing embedding".to_string()))?;
        let embedding_bytes = embedding_to_bytes(embedding);

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO chunks (id, filename, domain, position, text, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                chunk.id,
                chunk.filename,
                chunk.domain,
                chunk.position as i64,
                chunk.text,
                embedding_bytes,
            ],
        )
        .map_err(|e| AppError::Retrieval(format!("Failed to insert chunk: {}", e)))?;

        Ok(())
    }

    /// Per-domain statistics across the whole store.
    pub fn partition_stats(&self) -> AppResult<Vec<PartitionStats>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT d.domain, COUNT(DISTINCT d.id),
                        (SELECT COUNT(*) FROM chunks c WHERE c.domain = d.domain)
                 FROM documents d GROUP BY d.domain ORDER BY d.domain",
            )
            .map_err(|e| AppError::Retrieval(format!("Failed to prepare stats query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(PartitionStats {
                    domain: row.get(0)?,
                    documents: row.get::<_, i64>(1)? as u32,
                    chunks: row.get::<_, i64>(2)? as u32,
                })
            })
            .map_err(|e| AppError::Retrieval(format!("Failed to query stats: {}", e)))?;

        let mut stats = Vec::new();
        for row in rows {
            stats.push(
                row.map_err(|e| AppError::Retrieval(format!("Failed to read stats row: {}", e)))?,
            );
        }
        Ok(stats)
    }

    /// Delete all documents and chunks.
    pub fn reset(&self) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM chunks", [])
            .map_err(|e| AppError::Retrieval(format!("Failed to delete chunks: {}", e)))?;
        conn.execute("DELETE FROM documents", [])
            .map_err(|e| AppError::Retrieval(format!("Failed to delete documents: {}", e)))?;

        tracing::info!("Reset vector store");
        Ok(())
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Retrieval("Vector store lock poisoned".to_string()))
    }

    fn search_sync(&self, domain: &str, query_embedding: &[f32], k: usize) -> AppResult<Vec<Hit>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, filename, position, text, embedding FROM chunks WHERE domain = ?1")
            .map_err(|e| AppError::Retrieval(format!("Failed to prepare search: {}", e)))?;

        let rows = stmt
            .query_map(params![domain], |row| {
                let embedding_bytes: Vec<u8> = row.get(4)?;
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(3)?,
                    embedding_bytes,
                ))
            })
            .map_err(|e| AppError::Retrieval(format!("Failed to query chunks: {}", e)))?;

        let mut hits = Vec::new();
        for row in rows {
            let (chunk_id, filename, text, embedding_bytes) =
                row.map_err(|e| AppError::Retrieval(format!("Failed to read chunk row: {}", e)))?;
            let embedding = bytes_to_embedding(&embedding_bytes)?;

            // Lower-is-better distance, per the orchestrator's convention
            let score = 1.0 - cosine_similarity(query_embedding, &embedding);

            hits.push(Hit {
                chunk_id,
                filename,
                domain: domain.to_string(),
                text,
                score,
            });
        }

        hits.sort_by(|a, b| a.score.total_cmp(&b.score));
        hits.truncate(k);

        tracing::debug!(
            "Partition '{}' returned {} hits (requested top-{})",
            domain,
            hits.len(),
            k
        );

        Ok(hits)
    }
}

#[async_trait::async_trait]
impl VectorStore for SqliteVectorStore {
    async fn search(
        &self,
        domain: &str,
        query_embedding: &[f32],
        k: usize,
    ) -> AppResult<Vec<Hit>> {
        self.search_sync(domain, query_embedding, k)
    }
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Retrieval(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        embedding.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(embedding)
}

/// Calculate cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::NamedTempFile;

    fn chunk(id: &str, domain: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            id: id.to_string(),
            filename: format!("{}.txt", id),
            domain: domain.to_string(),
            position: 0,
            text: format!("text of {}", id),
            embedding: Some(embedding),
        }
    }

    #[tokio::test]
    async fn test_search_is_partitioned_by_domain() {
        let temp = NamedTempFile::new().unwrap();
        let store = SqliteVectorStore::open(temp.path()).unwrap();

        store
            .upsert_chunk(&chunk("fin1", "finance", vec![1.0, 0.0, 0.0]))
            .unwrap();
        store
            .upsert_chunk(&chunk("hr1", "hr", vec![1.0, 0.0, 0.0]))
            .unwrap();

        let hits = store.search("finance", &[1.0, 0.0, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk_id, "fin1");
        assert_eq!(hits[0].domain, "finance");
    }

    #[tokio::test]
    async fn test_search_distance_ordering() {
        let temp = NamedTempFile::new().unwrap();
        let store = SqliteVectorStore::open(temp.path()).unwrap();

        store
            .upsert_chunk(&chunk("close", "general", vec![1.0, 0.0, 0.0]))
            .unwrap();
        store
            .upsert_chunk(&chunk("far", "general", vec![0.0, 1.0, 0.0]))
            .unwrap();

        let hits = store.search("general", &[1.0, 0.1, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk_id, "close");
        assert!(hits[0].score < hits[1].score);
        // Identical-direction vector has distance near 0
        assert!(hits[0].score < 0.1);
    }

    #[tokio::test]
    async fn test_search_empty_partition() {
        let temp = NamedTempFile::new().unwrap();
        let store = SqliteVectorStore::open(temp.path()).unwrap();

        let hits = store.search("hr", &[1.0, 0.0], 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_truncates_to_k() {
        let temp = NamedTempFile::new().unwrap();
        let store = SqliteVectorStore::open(temp.path()).unwrap();

        for i in 0..10 {
            store
                .upsert_chunk(&chunk(&format!("c{}", i), "general", vec![1.0, i as f32]))
                .unwrap();
        }

        let hits = store.search("general", &[1.0, 0.0], 3).await.unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_partition_stats() {
        let temp = NamedTempFile::new().unwrap();
        let store = SqliteVectorStore::open(temp.path()).unwrap();

        store
            .upsert_document(&DocumentMeta {
                id: "doc1".to_string(),
                filename: "report.txt".to_string(),
                domain: "finance".to_string(),
                chunk_count: 2,
                size_bytes: 100,
                ingested_at: Utc::now(),
            })
            .unwrap();
        store
            .upsert_chunk(&chunk("c1", "finance", vec![1.0]))
            .unwrap();
        store
            .upsert_chunk(&chunk("c2", "finance", vec![0.5]))
            .unwrap();

        let stats = store.partition_stats().unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].domain, "finance");
        assert_eq!(stats[0].documents, 1);
        assert_eq!(stats[0].chunks, 2);
    }

    #[test]
    fn test_embedding_codec_roundtrip() {
        let original = vec![0.25, -1.5, 3.75];
        let bytes = embedding_to_bytes(&original);
        let decoded = bytes_to_embedding(&bytes).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0, 0.0]) - 1.0).abs() < 0.001);
        assert!((cosine_similarity(&a, &[0.0, 1.0, 0.0])).abs() < 0.001);
    }
}
