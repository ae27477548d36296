//! Application-level configuration for askdocs.
//!
//! This handles the settings shared by every command: the workspace path,
//! the active LLM provider/model, and API key resolution. Retrieval-specific
//! settings (domain table, thresholds, timeouts) live in `askdocs-rag`'s own
//! config and are loaded from the workspace.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .askdocs/)
    pub workspace: PathBuf,

    /// LLM provider (e.g., "ollama", "openai", "mock")
    pub provider: String,

    /// Model identifier for completions
    pub model: String,

    /// API key for the LLM provider, if required
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `ASKDOCS_WORKSPACE`: Override workspace path
    /// - `ASKDOCS_PROVIDER`: LLM provider
    /// - `ASKDOCS_MODEL`: Model identifier
    /// - `ASKDOCS_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("ASKDOCS_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        if let Ok(provider) = std::env::var("ASKDOCS_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("ASKDOCS_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("ASKDOCS_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables.
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve the API key, falling back to the provider's conventional
    /// environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        if self.api_key.is_some() {
            return self.api_key.clone();
        }

        match self.provider.as_str() {
            "openai" => std::env::var("OPENAI_API_KEY").ok(),
            _ => None,
        }
    }

    /// Get the `.askdocs` state directory for this workspace.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(".askdocs")
    }

    /// Ensure the `.askdocs` state directory exists.
    pub fn ensure_state_dir(&self) -> AppResult<()> {
        let dir = self.state_dir();
        std::fs::create_dir_all(&dir)
            .map_err(|e| AppError::Config(format!("Failed to create {:?}: {}", dir, e)))?;
        Ok(())
    }
}
