//! Core types and traits for syntax highlighting.

use std::collections::HashMap;

use super::error::{SyntaxError, SyntaxResult};

/// Theme used when nothing else is configured or a configured theme is
/// unknown.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Language name used for code without a (known) language tag.
pub const PLAIN_TEXT: &str = "plaintext";

/// Visual style of one highlighted token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStyle {
  /// Foreground colour as `#rrggbb`.
  pub foreground: Option<String>,
  pub bold:       bool,
  pub italic:     bool,
  pub underline:  bool,
}

impl TokenStyle {
  /// Inline CSS for this style, or `None` when it adds nothing.
  #[must_use]
  pub fn css(&self) -> Option<String> {
    let mut css = Vec::new();
    if let Some(color) = &self.foreground {
      css.push(format!("color:{color}"));
    }
    if self.bold {
      css.push("font-weight:bold".to_string());
    }
    if self.italic {
      css.push("font-style:italic".to_string());
    }
    if self.underline {
      css.push("text-decoration:underline".to_string());
    }
    (!css.is_empty()).then(|| css.join(";"))
  }
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub text:  String,
  pub style: TokenStyle,
}

/// One source line split into styled tokens, without its line terminator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightedLine {
  pub tokens: Vec<Token>,
}

impl HighlightedLine {
  /// A line with a single unstyled token.
  #[must_use]
  pub fn plain(text: &str) -> Self {
    let text = strip_line_ending(text);
    let tokens = if text.is_empty() {
      Vec::new()
    } else {
      vec![Token {
        text:  text.to_string(),
        style: TokenStyle::default(),
      }]
    };
    Self { tokens }
  }

  /// The line's text with styling removed.
  #[must_use]
  pub fn text(&self) -> String {
    self.tokens.iter().map(|token| token.text.as_str()).collect()
  }

  /// Whether the line has no text at all.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.tokens.iter().all(|token| token.text.is_empty())
  }
}

/// Strip a trailing `\n` or `\r\n`.
#[must_use]
pub fn strip_line_ending(text: &str) -> &str {
  let text = text.strip_suffix('\n').unwrap_or(text);
  text.strip_suffix('\r').unwrap_or(text)
}

/// Trait for syntax highlighting backends.
///
/// Allows different syntax highlighting implementations to be used
/// interchangeably. Implementations handle language detection, theme
/// management, and line-by-line tokenization.
pub trait SyntaxHighlighter: Send + Sync {
  /// Get the name of this highlighter backend
  fn name(&self) -> &'static str;

  /// Get a list of supported languages
  fn supported_languages(&self) -> Vec<String>;

  /// Get a list of available themes
  fn available_themes(&self) -> Vec<String>;

  /// Check if a language is supported
  fn supports_language(&self, language: &str) -> bool {
    self
      .supported_languages()
      .iter()
      .any(|lang| lang.eq_ignore_ascii_case(language))
  }

  /// Check if a theme is available
  fn has_theme(&self, theme: &str) -> bool {
    self.available_themes().iter().any(|t| t == theme)
  }

  /// Tokenize `code` line by line.
  ///
  /// Returns exactly one entry per source line. A line the backend fails to
  /// tokenize is returned as [`HighlightedLine::plain`] rather than failing
  /// the whole block.
  fn highlight_lines(
    &self,
    code: &str,
    language: &str,
    theme: Option<&str>,
  ) -> SyntaxResult<Vec<HighlightedLine>>;

  /// Background colour (`#rrggbb`) of a theme, if it defines one.
  fn background(&self, theme: Option<&str>) -> Option<String>;

  /// Detect language from a file extension
  fn language_from_extension(&self, extension: &str) -> Option<String>;

  /// Detect language from a filename
  fn language_from_filename(&self, filename: &str) -> Option<String> {
    std::path::Path::new(filename)
      .extension()
      .and_then(|ext| ext.to_str())
      .and_then(|ext| self.language_from_extension(ext))
  }
}

/// Configuration for syntax highlighting
#[derive(Debug, Clone)]
pub struct SyntaxConfig {
  /// Default theme to use when none is specified
  pub default_theme: Option<String>,

  /// Language aliases for mapping common names to supported languages
  pub language_aliases: HashMap<String, String>,

  /// Whether to fall back to plain text for unsupported languages
  pub fallback_to_plain: bool,
}

impl Default for SyntaxConfig {
  fn default() -> Self {
    let language_aliases = [
      ("js", "javascript"),
      ("jsx", "javascript"),
      ("mjs", "javascript"),
      ("ts", "typescript"),
      ("py", "python"),
      ("rb", "ruby"),
      ("rs", "rust"),
      ("sh", "bash"),
      ("shell", "bash"),
      ("zsh", "bash"),
      ("yml", "yaml"),
      ("md", "markdown"),
      ("text", PLAIN_TEXT),
      ("txt", PLAIN_TEXT),
      ("plain", PLAIN_TEXT),
    ]
    .into_iter()
    .map(|(alias, language)| (alias.to_string(), language.to_string()))
    .collect();

    Self {
      default_theme: Some(DEFAULT_THEME.to_string()),
      language_aliases,
      fallback_to_plain: true,
    }
  }
}

/// High-level syntax highlighting manager.
///
/// Manages a syntax highlighting backend and provides a convenient
/// interface for highlighting code with configuration options.
pub struct SyntaxManager {
  highlighter: Box<dyn SyntaxHighlighter>,
  config:      SyntaxConfig,
}

impl std::fmt::Debug for SyntaxManager {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SyntaxManager")
      .field("highlighter", &self.highlighter.name())
      .field("config", &self.config)
      .finish()
  }
}

impl SyntaxManager {
  /// Create a new syntax manager with the given highlighter and config
  #[must_use]
  pub fn new(
    highlighter: Box<dyn SyntaxHighlighter>,
    config: SyntaxConfig,
  ) -> Self {
    Self {
      highlighter,
      config,
    }
  }

  /// Create a new syntax manager with the default configuration
  #[must_use]
  pub fn with_highlighter(highlighter: Box<dyn SyntaxHighlighter>) -> Self {
    Self::new(highlighter, SyntaxConfig::default())
  }

  /// Get the underlying highlighter
  #[must_use]
  pub fn highlighter(&self) -> &dyn SyntaxHighlighter {
    self.highlighter.as_ref()
  }

  /// Get the configuration
  #[must_use]
  pub const fn config(&self) -> &SyntaxConfig {
    &self.config
  }

  /// Resolve a language name using aliases
  #[must_use]
  pub fn resolve_language(&self, language: &str) -> String {
    let lowered = language.to_lowercase();
    self
      .config
      .language_aliases
      .get(&lowered)
      .cloned()
      .unwrap_or(lowered)
  }

  /// Resolve a theme name, falling back to the configured default and then
  /// to [`DEFAULT_THEME`] when the name is unknown to the backend.
  #[must_use]
  pub fn resolve_theme(&self, theme: Option<&str>) -> String {
    let requested = theme.or(self.config.default_theme.as_deref());
    match requested {
      Some(name) if self.highlighter.has_theme(name) => name.to_string(),
      Some(name) => {
        log::warn!("Unknown highlight theme '{name}', using {DEFAULT_THEME}");
        DEFAULT_THEME.to_string()
      },
      None => DEFAULT_THEME.to_string(),
    }
  }

  /// Tokenize code with alias resolution and plain-text fallback.
  pub fn highlight_lines(
    &self,
    code: &str,
    language: &str,
    theme: Option<&str>,
  ) -> SyntaxResult<Vec<HighlightedLine>> {
    let resolved_language = self.resolve_language(language);
    let theme = theme.or(self.config.default_theme.as_deref());

    if resolved_language != PLAIN_TEXT
      && self.highlighter.supports_language(&resolved_language)
    {
      return self
        .highlighter
        .highlight_lines(code, &resolved_language, theme);
    }

    if resolved_language == PLAIN_TEXT || self.config.fallback_to_plain {
      log::trace!("Rendering '{resolved_language}' code as plain text");
      return Ok(code.lines().map(HighlightedLine::plain).collect());
    }

    Err(SyntaxError::UnsupportedLanguage(resolved_language))
  }

  /// Background colour of the given (or default) theme.
  #[must_use]
  pub fn background(&self, theme: Option<&str>) -> Option<String> {
    self
      .highlighter
      .background(theme.or(self.config.default_theme.as_deref()))
  }

  /// Language name for a file name, used for file-type icons.
  #[must_use]
  pub fn language_from_filename(&self, filename: &str) -> Option<String> {
    self.highlighter.language_from_filename(filename)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct UppercaseHighlighter;

  impl SyntaxHighlighter for UppercaseHighlighter {
    fn name(&self) -> &'static str {
      "Uppercase"
    }

    fn supported_languages(&self) -> Vec<String> {
      vec!["shout".to_string()]
    }

    fn available_themes(&self) -> Vec<String> {
      vec![DEFAULT_THEME.to_string(), "Loud".to_string()]
    }

    fn highlight_lines(
      &self,
      code: &str,
      _language: &str,
      _theme: Option<&str>,
    ) -> SyntaxResult<Vec<HighlightedLine>> {
      Ok(
        code
          .lines()
          .map(|line| HighlightedLine::plain(&line.to_uppercase()))
          .collect(),
      )
    }

    fn background(&self, _theme: Option<&str>) -> Option<String> {
      Some("#000000".to_string())
    }

    fn language_from_extension(&self, extension: &str) -> Option<String> {
      (extension == "loud").then(|| "shout".to_string())
    }
  }

  fn manager() -> SyntaxManager {
    let mut config = SyntaxConfig::default();
    config
      .language_aliases
      .insert("yell".to_string(), "shout".to_string());
    SyntaxManager::new(Box::new(UppercaseHighlighter), config)
  }

  #[test]
  fn test_syntax_config_default() {
    let config = SyntaxConfig::default();
    assert!(config.fallback_to_plain);
    assert_eq!(config.language_aliases["js"], "javascript");
    assert_eq!(config.default_theme.as_deref(), Some(DEFAULT_THEME));
  }

  #[test]
  fn test_alias_resolution() {
    let manager = manager();
    let lines = manager
      .highlight_lines("hi\nthere", "YELL", None)
      .expect("highlighting succeeds");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text(), "HI");
  }

  #[test]
  fn test_unknown_language_falls_back_to_plain() {
    let manager = manager();
    let lines = manager
      .highlight_lines("hi", "cobol", None)
      .expect("highlighting succeeds");
    assert_eq!(lines[0].text(), "hi");
  }

  #[test]
  fn test_unknown_language_without_fallback() {
    let mut config = SyntaxConfig::default();
    config.fallback_to_plain = false;
    let manager = SyntaxManager::new(Box::new(UppercaseHighlighter), config);
    assert!(matches!(
      manager.highlight_lines("hi", "cobol", None),
      Err(SyntaxError::UnsupportedLanguage(lang)) if lang == "cobol"
    ));
  }

  #[test]
  fn test_resolve_theme() {
    let manager = manager();
    assert_eq!(manager.resolve_theme(Some("Loud")), "Loud");
    assert_eq!(manager.resolve_theme(Some("Nope")), DEFAULT_THEME);
    assert_eq!(manager.resolve_theme(None), DEFAULT_THEME);
  }

  #[test]
  fn test_highlighted_line_helpers() {
    assert!(HighlightedLine::plain("\n").is_empty());
    assert!(HighlightedLine::plain("").tokens.is_empty());
    assert_eq!(HighlightedLine::plain("x\r\n").text(), "x");
    assert!(!HighlightedLine::plain("  ").is_empty());
  }

  #[test]
  fn test_token_style_css() {
    assert_eq!(TokenStyle::default().css(), None);
    let style = TokenStyle {
      foreground: Some("#ff0000".to_string()),
      bold:       true,
      italic:     false,
      underline:  true,
    };
    assert_eq!(
      style.css().as_deref(),
      Some("color:#ff0000;font-weight:bold;text-decoration:underline")
    );
  }

  #[test]
  fn test_language_from_filename() {
    let manager = manager();
    assert_eq!(
      manager.language_from_filename("notes.loud").as_deref(),
      Some("shout")
    );
    assert_eq!(manager.language_from_filename("Makefile"), None);
  }
}
