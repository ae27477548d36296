//! Retrieval configuration management.
//!
//! The domain→keyword table and all orchestrator tuning knobs live in one
//! explicit configuration object, loaded from
//! `<workspace>/.askdocs/config.yaml` when present and constructed from
//! defaults otherwise. Nothing here is process-global: the registry and
//! pipeline receive the config at construction.

use askdocs_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One domain partition and the query keywords that select it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Partition name (e.g., "finance", "hr")
    pub name: String,

    /// Keywords that mark a query as targeting this domain
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// External enrichment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Whether the enrichment gate may call out to web search at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Timeout per external lookup, in seconds
    #[serde(default = "default_enrichment_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on lookups per query (bounded fan-out)
    #[serde(default = "default_max_lookups")]
    pub max_lookups: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_enrichment_timeout_secs(),
            max_lookups: default_max_lookups(),
        }
    }
}

/// Completion-call settings used by the answer composer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Sampling temperature (low for factual answers)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in the generated answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Timeout for the completion call, in seconds
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_completion_timeout_secs(),
        }
    }
}

/// Full retrieval-orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Domain partitions with their keyword tables
    #[serde(default = "default_domains")]
    pub domains: Vec<DomainConfig>,

    /// Hits requested per domain partition
    #[serde(default = "default_per_domain_k")]
    pub per_domain_k: usize,

    /// Size of the merged evidence list
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Confidence below which the enrichment gate fires
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Weight of the missing-domain penalty in the confidence formula (0..1)
    #[serde(default = "default_coverage_penalty")]
    pub coverage_penalty: f32,

    /// Embedding vector dimension
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// Ingestion chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between adjacent chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    #[serde(default)]
    pub completion: CompletionConfig,
}

fn default_true() -> bool {
    true
}

fn default_enrichment_timeout_secs() -> u64 {
    10
}

fn default_max_lookups() -> usize {
    3
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_completion_timeout_secs() -> u64 {
    60
}

fn default_per_domain_k() -> usize {
    3
}

fn default_top_k() -> usize {
    5
}

fn default_confidence_threshold() -> f32 {
    0.45
}

fn default_coverage_penalty() -> f32 {
    0.5
}

fn default_embedding_dim() -> usize {
    384
}

fn default_chunk_size() -> usize {
    1200
}

fn default_chunk_overlap() -> usize {
    150
}

fn default_domains() -> Vec<DomainConfig> {
    let table: [(&str, &[&str]); 4] = [
        (
            "finance",
            &["finance", "financial", "revenue", "budget", "cost", "profit"],
        ),
        (
            "hr",
            &["hr", "human resources", "leave", "policy", "employee", "hiring"],
        ),
        (
            "sustainability",
            &["sustainability", "emissions", "carbon", "environment", "esg"],
        ),
        ("general", &[]),
    ];

    table
        .iter()
        .map(|(name, keywords)| DomainConfig {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        })
        .collect()
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            domains: default_domains(),
            per_domain_k: default_per_domain_k(),
            top_k: default_top_k(),
            confidence_threshold: default_confidence_threshold(),
            coverage_penalty: default_coverage_penalty(),
            embedding_dim: default_embedding_dim(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            enrichment: EnrichmentConfig::default(),
            completion: CompletionConfig::default(),
        }
    }
}

impl RagConfig {
    /// All configured domain names.
    pub fn known_domains(&self) -> BTreeSet<String> {
        self.domains.iter().map(|d| d.name.clone()).collect()
    }
}

/// Load retrieval configuration for a workspace.
///
/// Falls back to defaults when no config file exists.
pub fn load_config(workspace: &Path) -> AppResult<RagConfig> {
    let config_path = get_config_path(workspace);

    if config_path.exists() {
        let content = fs::read_to_string(&config_path).map_err(|e| {
            AppError::Config(format!("Failed to read config at {:?}: {}", config_path, e))
        })?;

        let config: RagConfig = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse config at {:?}: {}", config_path, e))
        })?;

        tracing::debug!("Loaded retrieval config from {:?}", config_path);
        Ok(config)
    } else {
        tracing::debug!("No retrieval config at {:?}, using defaults", config_path);
        Ok(RagConfig::default())
    }
}

/// Save retrieval configuration for a workspace.
pub fn save_config(workspace: &Path, config: &RagConfig) -> AppResult<()> {
    let config_path = get_config_path(workspace);

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))?;
    }

    let yaml = serde_yaml::to_string(config)
        .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(&config_path, yaml).map_err(|e| {
        AppError::Config(format!("Failed to write config to {:?}: {}", config_path, e))
    })?;

    tracing::debug!("Saved retrieval config to {:?}", config_path);
    Ok(())
}

/// Path to the retrieval config file.
pub fn get_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".askdocs").join("config.yaml")
}

/// Path to the SQLite vector index.
pub fn get_index_path(workspace: &Path) -> PathBuf {
    workspace.join(".askdocs").join("index.sqlite")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_domains() {
        let config = RagConfig::default();
        let domains = config.known_domains();

        assert_eq!(domains.len(), 4);
        assert!(domains.contains("finance"));
        assert!(domains.contains("hr"));
        assert!(domains.contains("sustainability"));
        assert!(domains.contains("general"));
    }

    #[test]
    fn test_load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let config = load_config(temp.path()).unwrap();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.chunk_size, 1200);
        assert!(config.enrichment.enabled);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let mut config = RagConfig::default();
        config.top_k = 8;
        config.confidence_threshold = 0.6;

        save_config(temp.path(), &config).unwrap();
        let loaded = load_config(temp.path()).unwrap();

        assert_eq!(loaded.top_k, 8);
        assert_eq!(loaded.confidence_threshold, 0.6);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".askdocs");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.yaml"), "top_k: 7\n").unwrap();

        let config = load_config(temp.path()).unwrap();
        assert_eq!(config.top_k, 7);
        assert_eq!(config.per_domain_k, 3);
        assert_eq!(config.domains.len(), 4);
    }
}
