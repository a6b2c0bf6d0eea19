//! Errors raised inside the rendering pipeline.
//!
//! None of these escape [`MarkdownProcessor::render`]; they select the
//! fallback renderer instead.
//!
//! [`MarkdownProcessor::render`]: crate::MarkdownProcessor::render

use crate::{syntax::SyntaxError, utils::UtilError};

/// Result type for pipeline stages.
pub type MarkdownResult<T> = Result<T, MarkdownError>;

#[derive(Debug, thiserror::Error)]
pub enum MarkdownError {
  #[error("Input is not valid UTF-8: {0}")]
  InvalidUtf8(#[from] std::str::Utf8Error),

  #[error("Document nesting depth exceeds the limit of {limit}")]
  NestingTooDeep { limit: usize },

  #[error("Failed to render HTML: {0}")]
  Render(#[from] std::fmt::Error),

  #[error("Document has no body element")]
  MissingBody,

  #[error(transparent)]
  Dom(#[from] UtilError),

  #[error(transparent)]
  Syntax(#[from] SyntaxError),

  #[error("Processing stage panicked: {0}")]
  Panicked(String),
}
