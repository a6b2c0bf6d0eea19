//! Blog entries as delivered by the headless CMS.
use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One article record. Only `content` is rendered; the rest is carried along
/// so a JSON render can be merged back into the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogEntry {
  pub title:      String,
  pub slug:       String,
  /// Markdown source.
  pub content:    String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub excerpt:    Option<String>,
  #[serde(default)]
  pub tags:       Vec<String>,
  pub created_at: String,
  pub updated_at: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub thumbnail:  Option<String>,
}

impl BlogEntry {
  /// Read an entry from a JSON file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or is not a valid entry.
  pub fn from_file(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_entry_deserialize() {
    let entry: BlogEntry = serde_json::from_str(
      r##"{
        "title": "Hello",
        "slug": "hello",
        "content": "# Hello",
        "tags": ["rust"],
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-02T00:00:00Z"
      }"##,
    )
    .expect("valid entry");
    assert_eq!(entry.slug, "hello");
    assert_eq!(entry.tags, ["rust"]);
    assert_eq!(entry.excerpt, None);
    assert_eq!(entry.thumbnail, None);
  }

  #[test]
  fn test_entry_requires_content() {
    let result = serde_json::from_str::<BlogEntry>(
      r#"{"title": "x", "slug": "x", "createdAt": "", "updatedAt": ""}"#,
    );
    assert!(result.is_err());
  }
}
