//! Ingest command handler.
//!
//! Chunks, embeds, and indexes plain-text documents into the workspace's
//! vector store.

use askdocs_core::{config::AppConfig, AppError, AppResult};
use askdocs_rag::{
    get_index_path, ingest_dir, ingest_file, load_config, SqliteVectorStore, TrigramVectorizer,
};
use clap::Args;
use std::path::PathBuf;

/// Ingest documents into the vector index
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files to ingest (requires --domain), or a directory with --all
    pub paths: Vec<PathBuf>,

    /// Domain partition for the given files
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Treat the single given path as a directory of per-domain
    /// subdirectories (<dir>/<domain>/<files>)
    #[arg(long)]
    pub all: bool,

    /// Clear the existing index before ingesting
    #[arg(long)]
    pub reset: bool,
}

impl IngestCommand {
    /// Execute the ingest command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        if self.paths.is_empty() && !self.reset {
            return Err(AppError::Config("No paths given to ingest".to_string()));
        }

        let rag_config = load_config(&config.workspace)?;
        let store = SqliteVectorStore::open(&get_index_path(&config.workspace))?;
        let vectorizer = TrigramVectorizer::new(rag_config.embedding_dim);

        if self.reset {
            store.reset()?;
        }

        if self.paths.is_empty() {
            println!("Index cleared.");
            return Ok(());
        }

        let mut documents = 0;
        let mut chunks = 0;
        let mut skipped = Vec::new();

        if self.all {
            if self.paths.len() != 1 {
                return Err(AppError::Config(
                    "--all takes exactly one directory".to_string(),
                ));
            }

            let report = ingest_dir(
                &store,
                &vectorizer,
                &self.paths[0],
                rag_config.chunk_size,
                rag_config.chunk_overlap,
            )
            .await?;
            documents += report.documents;
            chunks += report.chunks;
            skipped.extend(report.skipped);
        } else {
            let domain = self.domain.as_deref().ok_or_else(|| {
                AppError::Config("--domain is required when ingesting files".to_string())
            })?;

            if !rag_config.known_domains().contains(domain) {
                tracing::warn!(
                    "Domain '{}' is not in the configured domain table; \
                     queries will only reach it via an explicit hint",
                    domain
                );
            }

            for path in &self.paths {
                let report = ingest_file(
                    &store,
                    &vectorizer,
                    path,
                    domain,
                    rag_config.chunk_size,
                    rag_config.chunk_overlap,
                )
                .await?;
                documents += report.documents;
                chunks += report.chunks;
            }
        }

        println!("Ingested {} document(s), {} chunk(s)", documents, chunks);
        for path in &skipped {
            println!("Skipped unsupported file: {}", path);
        }

        Ok(())
    }
}
