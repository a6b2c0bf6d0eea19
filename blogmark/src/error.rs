use std::io;

use thiserror::Error;

/// Top-level error type for the blogmark crate.
#[derive(Debug, Error)]
pub enum BlogmarkError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),

  #[error("TOML error: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("OGP service error: {0}")]
  Fetch(#[from] blogmark_ogp::FetchError),
}

/// Result alias used across the binary.
pub type Result<T> = std::result::Result<T, BlogmarkError>;
