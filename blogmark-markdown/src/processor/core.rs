//! Core implementation of the Markdown processor.
//!
//! This module contains the main implementation of `MarkdownProcessor`: the
//! rendering pipeline and configuration management.
//!
//! A render runs these stages, in order:
//!
//! 1. comrak parse (GFM extensions when enabled)
//! 2. nesting depth guard
//! 3. link-card marker transform on the AST
//! 4. comrak HTML rendering, keeping full fence info strings
//! 5. DOM parse, then link-card materialization, syntax highlighting, code
//!    block wrappers and heading anchors
//! 6. serialization
//!
//! Any failure along the way renders the document through the fallback
//! renderer instead.
use std::sync::Arc;

use comrak::{
  Arena,
  nodes::{AstNode, NodeValue},
  options::Options,
  parse_document,
};
use log::{error, trace};

use super::{
  codeblock::enrich_code_blocks,
  headings::assign_heading_ids,
  highlight::highlight_code_blocks,
  link_card::{LinkCardTransformer, materialize_link_cards},
  process::{process_with_fallback, render_fallback},
  types::{AstTransformer, MarkdownOptions, MarkdownProcessor, ThemeConfig},
};
use crate::{
  error::{MarkdownError, MarkdownResult},
  syntax::{SyntaxManager, create_default_manager},
  types::{Heading, RenderOutput},
  utils::dom,
};

impl MarkdownProcessor {
  /// Create a new `MarkdownProcessor` with the given options.
  ///
  /// If highlighting is requested but no backend is available, highlighting
  /// is disabled with a log message.
  #[must_use]
  pub fn new(options: MarkdownOptions) -> Self {
    let syntax_manager =
      match create_default_manager(options.highlight_theme.as_deref()) {
        Ok(manager) => Some(Arc::new(manager)),
        Err(e) => {
          if options.highlight_code {
            log::warn!("Syntax highlighting disabled: {e}");
          }
          None
        },
      };

    Self {
      options,
      syntax_manager,
    }
  }

  /// Create a processor around an existing syntax manager.
  #[must_use]
  pub fn with_syntax_manager(
    options: MarkdownOptions,
    manager: Arc<SyntaxManager>,
  ) -> Self {
    Self {
      options,
      syntax_manager: Some(manager),
    }
  }

  /// Access processor options.
  #[must_use]
  pub const fn options(&self) -> &MarkdownOptions {
    &self.options
  }

  /// The syntax manager, if a highlighting backend is available.
  #[must_use]
  pub fn syntax_manager(&self) -> Option<&SyntaxManager> {
    self.syntax_manager.as_deref()
  }

  /// Check if a specific feature is enabled.
  #[must_use]
  pub const fn has_feature(&self, feature: ProcessorFeature) -> bool {
    match feature {
      ProcessorFeature::Gfm => self.options.gfm,
      ProcessorFeature::SyntaxHighlighting => {
        self.options.highlight_code && self.syntax_manager.is_some()
      },
      ProcessorFeature::LinkCards => self.options.link_cards,
    }
  }

  /// Theme selection for a single render.
  #[must_use]
  pub fn theme_config(&self) -> ThemeConfig {
    self
      .syntax_manager
      .as_deref()
      .map(|manager| ThemeConfig::resolve(&self.options, manager))
      .unwrap_or_default()
  }

  /// Render Markdown to HTML.
  ///
  /// Never fails: any error or panic inside the pipeline yields the escaped
  /// fallback rendering of `markdown` instead.
  #[must_use]
  pub fn render(&self, markdown: &str) -> RenderOutput {
    process_with_fallback(markdown, |markdown| self.try_render(markdown))
  }

  /// Render raw bytes. Input that is not valid UTF-8 goes straight to the
  /// fallback renderer (decoded lossily).
  #[must_use]
  pub fn render_bytes(&self, bytes: &[u8]) -> RenderOutput {
    match std::str::from_utf8(bytes).map_err(MarkdownError::from) {
      Ok(markdown) => self.render(markdown),
      Err(e) => {
        error!("{e}, using fallback renderer");
        render_fallback(&String::from_utf8_lossy(bytes))
      },
    }
  }

  /// Headings of a document, as [`render`](Self::render) would report them.
  #[must_use]
  pub fn extract_headings(&self, markdown: &str) -> Vec<Heading> {
    self.render(markdown).headings
  }

  /// Run the pipeline, surfacing the first error instead of falling back.
  ///
  /// # Errors
  ///
  /// Returns an error if the document nests deeper than
  /// [`MarkdownOptions::max_nesting_depth`], or if HTML rendering or
  /// serialization fails.
  pub fn try_render(&self, markdown: &str) -> MarkdownResult<RenderOutput> {
    let theme = self.theme_config();
    let html = self.convert_to_html(markdown)?;

    let document = dom::parse_document(&html);
    if self.options.link_cards {
      materialize_link_cards(&document)?;
    }
    let highlighter = self
      .syntax_manager
      .as_deref()
      .filter(|_| self.options.highlight_code);
    if let Some(manager) = highlighter {
      highlight_code_blocks(&document, manager, &theme)?;
    }
    enrich_code_blocks(&document, self.syntax_manager.as_deref())?;
    let headings = assign_heading_ids(&document)?;

    let body = dom::body(&document).ok_or(MarkdownError::MissingBody)?;
    let html = dom::serialize_children(&body)?;

    let title = headings
      .iter()
      .find(|heading| heading.level == 1)
      .map(|heading| heading.text.clone());

    Ok(RenderOutput {
      html,
      headings,
      title,
    })
  }

  /// Parse and render Markdown to HTML with comrak.
  fn convert_to_html(&self, content: &str) -> MarkdownResult<String> {
    let arena = Arena::new();
    let options = self.comrak_options();
    let root = parse_document(&arena, content, &options);

    check_nesting_depth(root, self.options.max_nesting_depth)?;

    if self.options.link_cards {
      LinkCardTransformer.transform(root);
    }

    let mut html_output = String::new();
    comrak::format_html(root, &options, &mut html_output)?;
    trace!("comrak produced {} bytes of HTML", html_output.len());
    Ok(html_output)
  }

  /// Build comrak options from processor settings.
  fn comrak_options(&self) -> Options<'_> {
    let mut options = Options::default();
    if self.options.gfm {
      options.extension.table = true;
      options.extension.footnotes = true;
      options.extension.strikethrough = true;
      options.extension.tasklist = true;
      options.extension.autolink = true;
    }
    // Content comes from our own CMS.
    options.render.r#unsafe = true;
    // Keeps fence meta (title, line ranges) as `data-meta`.
    options.render.full_info_string = true;
    options
  }
}

/// Fail if any node of the AST is nested deeper than `limit`.
///
/// # Errors
///
/// Returns [`MarkdownError::NestingTooDeep`] for the first node found past the
/// limit.
pub fn check_nesting_depth<'a>(
  root: &'a AstNode<'a>,
  limit: usize,
) -> MarkdownResult<()> {
  let mut stack = vec![(root, 0_usize)];
  while let Some((node, depth)) = stack.pop() {
    if depth > limit {
      return Err(MarkdownError::NestingTooDeep { limit });
    }
    stack.extend(node.children().map(|child| (child, depth + 1)));
  }
  Ok(())
}

/// Extract all inline text from a heading node.
pub fn extract_inline_text<'a>(node: &'a AstNode<'a>) -> String {
  let mut text = String::new();
  for child in node.children() {
    match &child.data.borrow().value {
      NodeValue::Text(t) => text.push_str(t),
      NodeValue::Code(t) => text.push_str(&t.literal),
      NodeValue::Link(..)
      | NodeValue::Emph
      | NodeValue::Strong
      | NodeValue::Strikethrough => {
        text.push_str(&extract_inline_text(child));
      },
      _ => {},
    }
  }
  text
}

/// Features that can be queried on a processor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorFeature {
  /// GitHub Flavored Markdown support
  Gfm,
  /// Syntax highlighting for code blocks
  SyntaxHighlighting,
  /// Link-card placeholders for bare URLs
  LinkCards,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse_depth(markdown: &str, limit: usize) -> MarkdownResult<()> {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &Options::default());
    check_nesting_depth(root, limit)
  }

  #[test]
  fn test_nesting_depth() {
    // document > paragraph > text
    assert!(parse_depth("plain", 2).is_ok());
    assert!(matches!(
      parse_depth("> > > deep", 3),
      Err(MarkdownError::NestingTooDeep { limit: 3 })
    ));
  }

  #[test]
  fn test_extract_inline_text() {
    let arena = Arena::new();
    let root = parse_document(
      &arena,
      "# Hello `code` **bold** [link](https://x.example)",
      &Options::default(),
    );
    let heading = root.first_child().expect("heading");
    assert_eq!(extract_inline_text(heading), "Hello code bold link");
  }

  #[test]
  fn test_has_feature() {
    let processor = MarkdownProcessor::new(MarkdownOptions::with_features(
      true, false, false,
    ));
    assert!(processor.has_feature(ProcessorFeature::Gfm));
    assert!(!processor.has_feature(ProcessorFeature::SyntaxHighlighting));
    assert!(!processor.has_feature(ProcessorFeature::LinkCards));
  }
}
