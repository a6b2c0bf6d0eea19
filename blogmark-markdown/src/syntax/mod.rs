//! Provides a trait-based architecture for syntax highlighting that allows
//! backends to be plugged in. The bundled backend is **Syntect**, using
//! Sublime Text syntax definitions with two-face added for extended syntax
//! definitions and themes.
//!
//! Backends tokenize code line by line; turning tokens into markup is left to
//! the caller so that each line can be decorated (and fail) on its own.

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{SyntaxError, SyntaxResult};
pub use types::{
  DEFAULT_THEME,
  HighlightedLine,
  PLAIN_TEXT,
  SyntaxConfig,
  SyntaxHighlighter,
  SyntaxManager,
  Token,
  TokenStyle,
};

// Syntect backend implementation
#[cfg(feature = "syntect")] mod syntect;
#[cfg(feature = "syntect")] pub use syntect::*;

/// Create the default syntax manager based on available features.
///
/// `theme` becomes the manager's default theme; `None` selects
/// [`DEFAULT_THEME`].
///
/// # Errors
///
/// Returns [`SyntaxError::NoBackendAvailable`] when the crate was built
/// without the `syntect` feature.
pub fn create_default_manager(
  theme: Option<&str>,
) -> SyntaxResult<SyntaxManager> {
  #[cfg(feature = "syntect")]
  {
    create_syntect_manager(theme)
  }

  #[cfg(not(feature = "syntect"))]
  {
    let _ = theme;
    Err(SyntaxError::NoBackendAvailable)
  }
}
