//! Ask command handler.
//!
//! Runs the retrieval pipeline against the workspace index and prints the
//! structured answer.

use askdocs_core::{config::AppConfig, AppError, AppResult};
use askdocs_llm::create_client;
use askdocs_rag::{
    get_index_path, load_config, DuckDuckGoClient, RagPipeline, SqliteVectorStore,
    TrigramVectorizer,
};
use clap::Args;
use std::sync::Arc;

/// Ask a question over the indexed documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Restrict retrieval to one domain partition
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Output the full answer as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let rag_config = load_config(&config.workspace)?;

        let store = SqliteVectorStore::open(&get_index_path(&config.workspace))?;
        let vectorizer = TrigramVectorizer::new(rag_config.embedding_dim);

        let api_key = config.resolve_api_key();
        let llm = create_client(&config.provider, None, api_key.as_deref())
            .map_err(AppError::Config)?;

        let pipeline = RagPipeline::new(
            rag_config,
            config.model.clone(),
            Arc::new(store),
            Arc::new(vectorizer),
            llm,
            Arc::new(DuckDuckGoClient::new()),
        );

        let answer = pipeline.answer(&self.question, self.domain.as_deref()).await;

        if self.json {
            let json = serde_json::to_string_pretty(&answer)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", answer.answer);
            println!();
            println!("Confidence: {:.2}", answer.confidence);

            if !answer.citations.is_empty() {
                println!("Sources:");
                for citation in &answer.citations {
                    println!(
                        "  - {} [{}] (score {:.3})",
                        citation.filename, citation.domain, citation.score
                    );
                }
            }

            if !answer.reasoning_summary.is_empty() {
                println!("Reasoning: {}", answer.reasoning_summary);
            }
        }

        Ok(())
    }
}
