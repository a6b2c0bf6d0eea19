//! Types for the blogmark-markdown public API.
use serde::{Deserialize, Serialize};

/// A heading found while rendering, in document order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Heading {
  /// Anchor ID, unique within the document.
  pub id:    String,
  /// Heading level (1-6).
  pub level: u8,
  /// Plain heading text, trimmed.
  pub text:  String,
}

/// Result of rendering one Markdown document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderOutput {
  /// Rendered HTML fragment.
  pub html: String,

  /// Extracted headings (for a table of contents).
  pub headings: Vec<Heading>,

  /// Text of the first level-1 heading, if any.
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub title: Option<String>,
}
