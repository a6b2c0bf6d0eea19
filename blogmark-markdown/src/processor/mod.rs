//! Markdown processing module with modular organization.
//!
//! # Architecture
//!
//! The processor module is organized into focused submodules:
//!
//! - [`core`]: Main processor implementation and processing pipeline
//! - [`process`]: Error recovery and the fallback renderer
//! - [`types`]: Core type definitions and configuration structures
//! - [`link_card`]: Bare-URL markers and link-card placeholders
//! - [`highlight`]: Line-based syntax highlighting of code blocks
//! - [`codeblock`]: Copy-ready wrappers around highlighted code
//! - [`headings`]: Heading anchors and table-of-contents extraction
pub mod codeblock;
pub mod core;
pub mod headings;
pub mod highlight;
pub mod link_card;
pub mod process;
pub mod types;

// Re-export commonly used types from submodules
pub use core::{ProcessorFeature, check_nesting_depth, extract_inline_text};

pub use link_card::{
  LinkCardPlaceholder,
  LinkCardTransformer,
  link_card_placeholder,
  link_card_placeholders,
  materialize_link_cards,
  parse_link_card_marker,
};
pub use process::{
  FALLBACK_CLASS,
  guard_node,
  process_with_fallback,
  process_with_recovery,
  render_fallback,
};
pub use types::{
  AstTransformer,
  MarkdownOptions,
  MarkdownOptionsBuilder,
  MarkdownProcessor,
  ThemeConfig,
};
