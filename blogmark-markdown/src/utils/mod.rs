use std::{
  collections::{HashMap, HashSet},
  sync::LazyLock,
};

pub mod codeblock;
pub mod dom;
pub mod entities;

use regex::Regex;

/// Error type for utility operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
  #[error("Invalid CSS selector: {0}")]
  InvalidSelector(&'static str),

  #[error("Failed to serialize HTML: {0}")]
  Serialize(#[from] std::io::Error),
}

/// Result type for utility operations.
pub type UtilResult<T> = Result<T, UtilError>;

static SLUG_STRIP_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"[^\w\s-]").unwrap_or_else(|e| {
    log::error!("Failed to compile SLUG_STRIP_RE regex: {e}");
    never_matching_regex()
  })
});

static SLUG_WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\s+").unwrap_or_else(|e| {
    log::error!("Failed to compile SLUG_WHITESPACE_RE regex: {e}");
    never_matching_regex()
  })
});

static SLUG_DASHES_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"-{2,}").unwrap_or_else(|e| {
    log::error!("Failed to compile SLUG_DASHES_RE regex: {e}");
    never_matching_regex()
  })
});

/// Slugify a string for use as an anchor ID.
///
/// Lowercases, drops everything that is not a word character, whitespace or
/// a dash, turns whitespace runs into single dashes, collapses repeated dashes
/// and trims dashes from both ends. Word characters use Unicode semantics, so
/// CJK headings keep their script.
#[must_use]
pub fn slugify(text: &str) -> String {
  let lowered = text.to_lowercase();
  let stripped = SLUG_STRIP_RE.replace_all(&lowered, "");
  let dashed = SLUG_WHITESPACE_RE.replace_all(&stripped, "-");
  let collapsed = SLUG_DASHES_RE.replace_all(&dashed, "-");
  collapsed.trim_matches('-').to_string()
}

/// Slug used when a heading has no sluggable text at all.
pub const EMPTY_SLUG: &str = "heading";

/// Hands out unique anchor IDs within a single document.
///
/// The first request for a slug gets it unchanged, later requests get `-1`,
/// `-2` and so on. Suffixed candidates that are already taken (for instance by
/// a heading literally titled "Test 1") are skipped.
#[derive(Debug, Default, Clone)]
pub struct SlugRegistry {
  taken:       HashSet<String>,
  occurrences: HashMap<String, usize>,
}

impl SlugRegistry {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Reserve a unique ID derived from `slug`.
  pub fn assign(&mut self, slug: &str) -> String {
    let base = if slug.is_empty() { EMPTY_SLUG } else { slug };

    if self.taken.insert(base.to_string()) {
      return base.to_string();
    }

    let counter = self.occurrences.entry(base.to_string()).or_insert(0);
    loop {
      *counter += 1;
      let candidate = format!("{base}-{counter}");
      if self.taken.insert(candidate.clone()) {
        return candidate;
      }
    }
  }

  /// Number of IDs handed out so far.
  #[must_use]
  pub fn len(&self) -> usize {
    self.taken.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.taken.is_empty()
  }
}

/// Create a regex that never matches anything.
///
/// This is used as a fallback pattern when a regex fails to compile.
/// It will never match any input, which is safer than using a trivial regex
/// like `^$` which would match empty strings.
#[must_use]
pub fn never_matching_regex() -> Regex {
  // Use a pattern that will never match anything because it asserts something
  // impossible.
  #[allow(
    clippy::expect_used,
    reason = "This pattern is guaranteed to be valid"
  )]
  Regex::new(r"[^\s\S]").expect("regex pattern [^\\s\\S] should always compile")
}
