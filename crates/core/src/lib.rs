//! askdocs Core Library
//!
//! Foundational utilities shared by the askdocs workspace:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Application-level configuration

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};
