//! Type definitions for the Markdown processor.
//!
//! Contains all the core types used by the processor, including:
//! - Configuration options (`MarkdownOptions`)
//! - The main processor struct (`MarkdownProcessor`)
//! - Per-render theme resolution (`ThemeConfig`)
//! - The AST transformation trait
//!
//! # Examples
//!
//! ```
//! use blogmark_markdown::{MarkdownOptions, MarkdownProcessor};
//!
//! let options = MarkdownOptions {
//!   gfm: true,
//!   highlight_code: true,
//!   ..Default::default()
//! };
//!
//! let processor = MarkdownProcessor::new(options);
//! ```

use std::sync::Arc;

use comrak::nodes::AstNode;

use crate::syntax::{DEFAULT_THEME, SyntaxManager};

/// Default limit for [`MarkdownOptions::max_nesting_depth`].
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Options for configuring the Markdown processor.
#[derive(Debug, Clone)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct MarkdownOptions {
  /// Enable GitHub Flavored Markdown (GFM) extensions.
  pub gfm: bool,

  /// Enable syntax highlighting for code blocks.
  pub highlight_code: bool,

  /// Optional: Custom syntax highlighting theme name.
  pub highlight_theme: Option<String>,

  /// Turn paragraphs holding nothing but a bare URL into link-card
  /// placeholders.
  pub link_cards: bool,

  /// Deepest allowed AST nesting. Deeper documents render through the
  /// fallback renderer.
  pub max_nesting_depth: usize,
}

impl MarkdownOptions {
  /// Enable all available features based on compile-time feature flags.
  #[must_use]
  pub const fn with_all_features() -> Self {
    Self {
      gfm:               cfg!(feature = "gfm"),
      highlight_code:    cfg!(feature = "syntect"),
      highlight_theme:   None,
      link_cards:        true,
      max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
    }
  }

  /// Create options with runtime feature overrides.
  #[must_use]
  pub const fn with_features(
    gfm: bool,
    highlight_code: bool,
    link_cards: bool,
  ) -> Self {
    Self {
      gfm,
      highlight_code,
      highlight_theme: None,
      link_cards,
      max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
    }
  }
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    Self::with_all_features()
  }
}

/// Theme selection for one render call.
///
/// Resolved from the options at the start of every render and threaded
/// through the highlighting stage, so concurrent renders never share theme
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
  /// Name of a theme the highlighter knows.
  pub name:       String,
  /// Theme background as `#rrggbb`, if the theme defines one.
  pub background: Option<String>,
}

impl ThemeConfig {
  /// Resolve the configured theme against a highlighter. Unknown names fall
  /// back to [`DEFAULT_THEME`].
  #[must_use]
  pub fn resolve(options: &MarkdownOptions, manager: &SyntaxManager) -> Self {
    let name = manager.resolve_theme(options.highlight_theme.as_deref());
    let background = manager.background(Some(&name));
    Self { name, background }
  }
}

impl Default for ThemeConfig {
  fn default() -> Self {
    Self {
      name:       DEFAULT_THEME.to_string(),
      background: None,
    }
  }
}

/// Main Markdown processor.
///
/// Can be cheaply cloned since it uses `Arc` internally for the syntax manager.
#[derive(Debug, Clone)]
pub struct MarkdownProcessor {
  pub(crate) options:        MarkdownOptions,
  pub(crate) syntax_manager: Option<Arc<SyntaxManager>>,
}

/// Trait for AST transformations run between parsing and HTML rendering.
pub trait AstTransformer {
  fn transform<'a>(&self, node: &'a AstNode<'a>);
}

/// Builder for constructing `MarkdownOptions` with method chaining.
#[derive(Debug, Clone)]
pub struct MarkdownOptionsBuilder {
  options: MarkdownOptions,
}

impl MarkdownOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self {
      options: MarkdownOptions::default(),
    }
  }

  /// Enable or disable GitHub Flavored Markdown.
  #[must_use]
  pub const fn gfm(mut self, enabled: bool) -> Self {
    self.options.gfm = enabled;
    self
  }

  /// Enable or disable syntax highlighting.
  #[must_use]
  pub const fn highlight_code(mut self, enabled: bool) -> Self {
    self.options.highlight_code = enabled;
    self
  }

  /// Set the syntax highlighting theme.
  #[must_use]
  pub fn highlight_theme<S: Into<String>>(mut self, theme: Option<S>) -> Self {
    self.options.highlight_theme = theme.map(Into::into);
    self
  }

  /// Enable or disable link-card placeholders for bare URLs.
  #[must_use]
  pub const fn link_cards(mut self, enabled: bool) -> Self {
    self.options.link_cards = enabled;
    self
  }

  /// Set the deepest allowed AST nesting.
  #[must_use]
  pub const fn max_nesting_depth(mut self, depth: usize) -> Self {
    self.options.max_nesting_depth = depth;
    self
  }

  /// Build the final `MarkdownOptions`.
  #[must_use]
  pub fn build(self) -> MarkdownOptions {
    self.options
  }
}

impl Default for MarkdownOptionsBuilder {
  fn default() -> Self {
    Self::new()
  }
}
