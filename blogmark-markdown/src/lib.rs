//! # blogmark-markdown
//!
//! The Markdown pipeline behind blogmark: CMS-authored Markdown in, enriched
//! HTML out. On top of GitHub Flavored Markdown it
//!
//! - gives every heading a unique, stable anchor ID and reports the headings
//!   for a table of contents,
//! - highlights fenced code line by line and wraps each block in a
//!   copy-ready container carrying the raw code and file name,
//! - replaces bare pasted URLs with link-card placeholders for later OGP
//!   hydration.
//!
//! Rendering never fails. If anything goes wrong the document is shown as
//! escaped plain text instead.
//!
//! ## Quick Start
//!
//! ```rust
//! use blogmark_markdown::{MarkdownOptions, MarkdownProcessor};
//!
//! let processor = MarkdownProcessor::new(MarkdownOptions::default());
//! let result = processor.render("# Hello World\n\nThis is **bold** text.");
//!
//! assert!(result.html.contains(r#"<h1 id="hello-world">"#));
//! assert_eq!(result.headings[0].id, "hello-world");
//! assert_eq!(result.title.as_deref(), Some("Hello World"));
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use blogmark_markdown::{MarkdownOptionsBuilder, MarkdownProcessor};
//!
//! let options = MarkdownOptionsBuilder::new()
//!   .highlight_theme(Some("Dracula"))
//!   .max_nesting_depth(32)
//!   .build();
//!
//! let processor = MarkdownProcessor::new(options);
//! ```

mod error;
pub mod processor;
pub mod syntax;
mod types;
pub mod utils;

pub use crate::{
  error::{MarkdownError, MarkdownResult},
  processor::{
    AstTransformer,
    LinkCardPlaceholder,
    MarkdownOptions,
    MarkdownOptionsBuilder,
    MarkdownProcessor,
    ThemeConfig,
    link_card_placeholders,
    process_with_fallback,
    process_with_recovery,
  },
  types::{Heading, RenderOutput},
};
