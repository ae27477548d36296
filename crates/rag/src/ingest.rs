//! Document ingestion: chunk, embed, and index plain-text sources.

use crate::embed::Vectorizer;
use crate::store::SqliteVectorStore;
use crate::types::{Chunk, DocumentMeta};
use askdocs_core::{AppError, AppResult};
use chrono::Utc;
use std::path::Path;
use walkdir::WalkDir;

/// File extensions accepted for ingestion.
const SUPPORTED_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub documents: u32,
    pub chunks: u32,
    pub skipped: Vec<String>,
}

/// Split text into character-based chunks with overlap.
///
/// Boundaries fall on char positions, never inside a multi-byte sequence.
/// `overlap` must be smaller than `chunk_size`; the last chunk may be short.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Ingest one file into the given domain partition.
pub async fn ingest_file(
    store: &SqliteVectorStore,
    vectorizer: &dyn Vectorizer,
    path: &Path,
    domain: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> AppResult<IngestReport> {
    if !is_supported(path) {
        return Err(AppError::Config(format!(
            "Unsupported file type: {} (supported: {})",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        )));
    }

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::Config(format!("Invalid filename: {}", path.display())))?
        .to_string();

    let text = std::fs::read_to_string(path)?;
    let size_bytes = text.len() as u64;
    let pieces = chunk_text(&text, chunk_size, chunk_overlap);

    tracing::info!(
        "Ingesting '{}' into domain '{}' ({} chunks)",
        filename,
        domain,
        pieces.len()
    );

    let doc_id = uuid::Uuid::new_v4().to_string();

    for (position, piece) in pieces.iter().enumerate() {
        let embedding = vectorizer.embed(piece).await?;
        store.upsert_chunk(&Chunk {
            id: format!("{}:{}", doc_id, position),
            filename: filename.clone(),
            domain: domain.to_string(),
            position: position as u32,
            text: piece.clone(),
            embedding: Some(embedding),
        })?;
    }

    store.upsert_document(&DocumentMeta {
        id: doc_id,
        filename,
        domain: domain.to_string(),
        chunk_count: pieces.len() as u32,
        size_bytes,
        ingested_at: Utc::now(),
    })?;

    Ok(IngestReport {
        documents: 1,
        chunks: pieces.len() as u32,
        skipped: Vec::new(),
    })
}

/// Ingest a directory laid out as `<root>/<domain>/<files>`.
///
/// Each first-level subdirectory names the domain its files land in.
/// Unsupported files are skipped and listed in the report.
pub async fn ingest_dir(
    store: &SqliteVectorStore,
    vectorizer: &dyn Vectorizer,
    root: &Path,
    chunk_size: usize,
    chunk_overlap: usize,
) -> AppResult<IngestReport> {
    if !root.is_dir() {
        return Err(AppError::Config(format!(
            "Not a directory: {}",
            root.display()
        )));
    }

    let mut report = IngestReport::default();

    for entry in WalkDir::new(root).min_depth(2).into_iter() {
        let entry =
            entry.map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if !is_supported(path) {
            tracing::debug!("Skipping unsupported file {:?}", path);
            report.skipped.push(path.display().to_string());
            continue;
        }

        // The first path component under the root names the domain
        let domain = path
            .strip_prefix(root)
            .ok()
            .and_then(|rel| rel.components().next())
            .and_then(|c| c.as_os_str().to_str())
            .ok_or_else(|| {
                AppError::Config(format!("Cannot derive domain for {}", path.display()))
            })?
            .to_string();

        let file_report =
            ingest_file(store, vectorizer, path, &domain, chunk_size, chunk_overlap).await?;
        report.documents += file_report.documents;
        report.chunks += file_report.chunks;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::TrigramVectorizer;
    use tempfile::TempDir;

    #[test]
    fn test_chunk_text_respects_size_and_overlap() {
        let text = "a".repeat(250);
        let chunks = chunk_text(&text, 100, 20);

        assert_eq!(chunks[0].chars().count(), 100);
        assert_eq!(chunks[1].chars().count(), 100);
        // Steps of 80: 0..100, 80..180, 160..250
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].chars().count(), 90);
    }

    #[test]
    fn test_chunk_text_short_input_single_chunk() {
        let chunks = chunk_text("short text", 100, 20);
        assert_eq!(chunks, vec!["short text".to_string()]);
    }

    #[test]
    fn test_chunk_text_empty() {
        assert!(chunk_text("", 100, 20).is_empty());
    }

    #[test]
    fn test_chunk_text_multibyte_boundaries() {
        let text = "é".repeat(150);
        let chunks = chunk_text(&text, 100, 10);
        assert_eq!(chunks[0].chars().count(), 100);
        assert!(chunks.iter().all(|c| c.chars().all(|ch| ch == 'é')));
    }

    #[tokio::test]
    async fn test_ingest_file_indexes_chunks() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("report.txt");
        std::fs::write(&file_path, "quarterly revenue grew ten percent ".repeat(40)).unwrap();

        let store = SqliteVectorStore::open(&dir.path().join("index.sqlite")).unwrap();
        let vectorizer = TrigramVectorizer::new(64);

        let report = ingest_file(&store, &vectorizer, &file_path, "finance", 200, 20)
            .await
            .unwrap();

        assert_eq!(report.documents, 1);
        assert!(report.chunks > 1);

        let stats = store.partition_stats().unwrap();
        assert_eq!(stats[0].domain, "finance");
        assert_eq!(stats[0].chunks, report.chunks);
    }

    #[tokio::test]
    async fn test_ingest_file_rejects_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("report.pdf");
        std::fs::write(&file_path, "binaryish").unwrap();

        let store = SqliteVectorStore::open(&dir.path().join("index.sqlite")).unwrap();
        let vectorizer = TrigramVectorizer::new(64);

        let result = ingest_file(&store, &vectorizer, &file_path, "finance", 200, 20).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_ingest_dir_per_domain_layout() {
        let dir = TempDir::new().unwrap();
        let uploads = dir.path().join("uploads");
        std::fs::create_dir_all(uploads.join("finance")).unwrap();
        std::fs::create_dir_all(uploads.join("hr")).unwrap();
        std::fs::write(uploads.join("finance/budget.txt"), "annual budget details").unwrap();
        std::fs::write(uploads.join("hr/policy.md"), "leave policy details").unwrap();
        std::fs::write(uploads.join("hr/scan.pdf"), "skipped").unwrap();

        let store = SqliteVectorStore::open(&dir.path().join("index.sqlite")).unwrap();
        let vectorizer = TrigramVectorizer::new(64);

        let report = ingest_dir(&store, &vectorizer, &uploads, 200, 20).await.unwrap();

        assert_eq!(report.documents, 2);
        assert_eq!(report.skipped.len(), 1);

        let stats = store.partition_stats().unwrap();
        let domains: Vec<&str> = stats.iter().map(|s| s.domain.as_str()).collect();
        assert_eq!(domains, vec!["finance", "hr"]);
    }
}
