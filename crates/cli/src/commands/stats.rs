//! Stats command handler.

use askdocs_core::{config::AppConfig, AppResult};
use askdocs_rag::{get_index_path, SqliteVectorStore};
use clap::Args;

/// Show per-domain index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    /// Execute the stats command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let index_path = get_index_path(&config.workspace);
        if !index_path.exists() {
            println!("No index found. Run 'askdocs ingest' first.");
            return Ok(());
        }

        let store = SqliteVectorStore::open(&index_path)?;
        let stats = store.partition_stats()?;

        if self.json {
            let entries: Vec<serde_json::Value> = stats
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "domain": s.domain,
                        "documents": s.documents,
                        "chunks": s.chunks,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries).unwrap_or_default());
        } else if stats.is_empty() {
            println!("Index is empty.");
        } else {
            println!("{:<16} {:>10} {:>10}", "DOMAIN", "DOCUMENTS", "CHUNKS");
            for s in &stats {
                println!("{:<16} {:>10} {:>10}", s.domain, s.documents, s.chunks);
            }
        }

        Ok(())
    }
}
