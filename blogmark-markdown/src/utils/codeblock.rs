//! Code fence metadata.
//!
//! A fence such as ```` ```rust title="src/main.rs" {1,4-6} ```` carries a
//! language token followed by a free-form meta string. The meta string is what
//! we parse here: an optional title and a set of line ranges to emphasize.
use std::{ops::RangeInclusive, sync::LazyLock};

use regex::Regex;

use super::never_matching_regex;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?:^|\s)title=(?:"([^"]*)"|'([^']*)'|(\S+))"#).unwrap_or_else(
    |e| {
      log::error!("Failed to compile TITLE_RE regex: {e}");
      never_matching_regex()
    },
  )
});

static LINE_RANGES_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\{([\d\s,-]*)\}").unwrap_or_else(|e| {
    log::error!("Failed to compile LINE_RANGES_RE regex: {e}");
    never_matching_regex()
  })
});

/// Parsed meta string of a fenced code block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeMeta {
  /// Caption shown above the block, usually a file name.
  pub title:             Option<String>,
  /// 1-based, inclusive line ranges to emphasize.
  pub highlighted_lines: Vec<RangeInclusive<usize>>,
}

impl CodeMeta {
  /// Parse a meta string. Unknown tokens are ignored.
  #[must_use]
  pub fn parse(meta: &str) -> Self {
    let title = TITLE_RE.captures(meta).and_then(|caps| {
      caps
        .get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
    });

    let highlighted_lines = LINE_RANGES_RE
      .captures(meta)
      .map(|caps| parse_line_ranges(&caps[1]))
      .unwrap_or_default();

    Self {
      title,
      highlighted_lines,
    }
  }

  /// Whether the 1-based `line` should be emphasized.
  #[must_use]
  pub fn is_highlighted(&self, line: usize) -> bool {
    self
      .highlighted_lines
      .iter()
      .any(|range| range.contains(&line))
  }
}

/// Parse `1,3-5, 8` into ranges. Malformed or zero-based entries are dropped.
#[must_use]
pub fn parse_line_ranges(ranges: &str) -> Vec<RangeInclusive<usize>> {
  ranges
    .split(',')
    .filter_map(|part| {
      let part = part.trim();
      let (start, end) = match part.split_once('-') {
        Some((start, end)) => {
          (start.trim().parse().ok()?, end.trim().parse().ok()?)
        },
        None => {
          let line = part.parse().ok()?;
          (line, line)
        },
      };
      (start >= 1 && start <= end).then_some(start..=end)
    })
    .collect()
}
