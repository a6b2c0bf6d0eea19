//! Syntect-based syntax highlighting backend enhanced with two-face.
//!
//! This module provides a syntax highlighter using the Syntect library,
//! which uses Sublime Text's syntax definitions (TextMate grammars),
//! significantly enhanced with the two-face crate for extended
//! syntax definitions and themes.

use std::sync::OnceLock;

use log::warn;
use syntect::{
  easy::HighlightLines,
  highlighting::{Color, FontStyle, Style, Theme},
  parsing::SyntaxSet,
  util::LinesWithEndings,
};
use two_face::{
  re_exports::syntect::highlighting::ThemeSet,
  theme::{EmbeddedLazyThemeSet, EmbeddedThemeName},
};

use super::{
  error::{SyntaxError, SyntaxResult},
  types::{
    DEFAULT_THEME,
    HighlightedLine,
    SyntaxConfig,
    SyntaxHighlighter,
    SyntaxManager,
    Token,
    TokenStyle,
    strip_line_ending,
  },
};

/// Two-face themes exposed by name.
const EMBEDDED_THEMES: &[(&str, EmbeddedThemeName)] = &[
  ("Base16OceanDark", EmbeddedThemeName::Base16OceanDark),
  ("Base16OceanLight", EmbeddedThemeName::Base16OceanLight),
  ("ColdarkCold", EmbeddedThemeName::ColdarkCold),
  ("ColdarkDark", EmbeddedThemeName::ColdarkDark),
  ("Dracula", EmbeddedThemeName::Dracula),
  ("Github", EmbeddedThemeName::Github),
  ("GruvboxDark", EmbeddedThemeName::GruvboxDark),
  ("GruvboxLight", EmbeddedThemeName::GruvboxLight),
  ("InspiredGithub", EmbeddedThemeName::InspiredGithub),
  ("MonokaiExtended", EmbeddedThemeName::MonokaiExtended),
  ("Nord", EmbeddedThemeName::Nord),
  ("OneHalfDark", EmbeddedThemeName::OneHalfDark),
  ("OneHalfLight", EmbeddedThemeName::OneHalfLight),
  ("SolarizedDark", EmbeddedThemeName::SolarizedDark),
  ("SolarizedLight", EmbeddedThemeName::SolarizedLight),
  ("TwoDark", EmbeddedThemeName::TwoDark),
  ("VisualStudioDarkPlus", EmbeddedThemeName::VisualStudioDarkPlus),
  ("Zenburn", EmbeddedThemeName::Zenburn),
];

/// Syntect-based syntax highlighter
pub struct SyntectHighlighter {
  theme_name: String,
}

impl SyntectHighlighter {
  /// Create a new Syntect highlighter with the specified default theme.
  #[must_use]
  pub fn new(theme_name: Option<String>) -> Self {
    Self {
      theme_name: theme_name.unwrap_or_else(|| DEFAULT_THEME.to_string()),
    }
  }

  fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
  }

  fn theme_set() -> &'static EmbeddedLazyThemeSet {
    static THEME_SET: OnceLock<EmbeddedLazyThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(two_face::theme::extra)
  }

  fn default_theme_set() -> &'static ThemeSet {
    static DEFAULT_THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    DEFAULT_THEME_SET.get_or_init(ThemeSet::load_defaults)
  }

  /// Look a theme up by exact name, syntect's bundled themes first.
  fn theme_by_name(name: &str) -> SyntaxResult<&'static Theme> {
    if let Some(theme) = Self::default_theme_set().themes.get(name) {
      return Ok(theme);
    }

    EMBEDDED_THEMES
      .iter()
      .find(|(embedded, _)| *embedded == name)
      .map(|(_, embedded)| Self::theme_set().get(*embedded))
      .ok_or_else(|| SyntaxError::ThemeNotFound(name.to_string()))
  }

  /// Get the theme by name, falling back to the highlighter default.
  fn get_theme(&self, theme_name: Option<&str>) -> &'static Theme {
    let name = theme_name.unwrap_or(&self.theme_name);
    Self::theme_by_name(name).unwrap_or_else(|e| {
      warn!("{e}, falling back to {DEFAULT_THEME}");
      Self::default_theme_set()
        .themes
        .get(DEFAULT_THEME)
        .unwrap_or_else(|| {
          Self::theme_set().get(EmbeddedThemeName::InspiredGithub)
        })
    })
  }
}

impl Default for SyntectHighlighter {
  fn default() -> Self {
    Self::new(None)
  }
}

fn hex(color: Color) -> String {
  format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn token_style(style: Style) -> TokenStyle {
  TokenStyle {
    foreground: Some(hex(style.foreground)),
    bold:       style.font_style.contains(FontStyle::BOLD),
    italic:     style.font_style.contains(FontStyle::ITALIC),
    underline:  style.font_style.contains(FontStyle::UNDERLINE),
  }
}

fn line_from_ranges(ranges: &[(Style, &str)]) -> HighlightedLine {
  let tokens = ranges
    .iter()
    .filter_map(|(style, text)| {
      let text = strip_line_ending(text);
      (!text.is_empty()).then(|| {
        Token {
          text:  text.to_string(),
          style: token_style(*style),
        }
      })
    })
    .collect();
  HighlightedLine { tokens }
}

impl SyntaxHighlighter for SyntectHighlighter {
  fn name(&self) -> &'static str {
    "Syntect"
  }

  fn supported_languages(&self) -> Vec<String> {
    Self::syntax_set()
      .syntaxes()
      .iter()
      .flat_map(|syntax| {
        std::iter::once(syntax.name.to_lowercase())
          .chain(syntax.file_extensions.iter().map(|ext| ext.to_lowercase()))
      })
      .collect()
  }

  fn supports_language(&self, language: &str) -> bool {
    Self::syntax_set().find_syntax_by_token(language).is_some()
  }

  fn available_themes(&self) -> Vec<String> {
    let mut themes: Vec<String> =
      Self::default_theme_set().themes.keys().cloned().collect();
    themes.extend(EMBEDDED_THEMES.iter().map(|(name, _)| (*name).to_string()));
    themes.sort();
    themes.dedup();
    themes
  }

  fn highlight_lines(
    &self,
    code: &str,
    language: &str,
    theme: Option<&str>,
  ) -> SyntaxResult<Vec<HighlightedLine>> {
    let syntax_set = Self::syntax_set();
    let syntax = syntax_set
      .find_syntax_by_token(language)
      .unwrap_or_else(|| syntax_set.find_syntax_plain_text());

    let mut highlighter = HighlightLines::new(syntax, self.get_theme(theme));
    let mut lines = Vec::new();

    for (index, line) in LinesWithEndings::from(code).enumerate() {
      match highlighter.highlight_line(line, syntax_set) {
        Ok(ranges) => lines.push(line_from_ranges(&ranges)),
        Err(e) => {
          warn!(
            "Failed to highlight line {} as {language}: {e}",
            index + 1
          );
          lines.push(HighlightedLine::plain(line));
        },
      }
    }

    Ok(lines)
  }

  fn background(&self, theme: Option<&str>) -> Option<String> {
    self.get_theme(theme).settings.background.map(hex)
  }

  fn language_from_extension(&self, extension: &str) -> Option<String> {
    let syntax_set = Self::syntax_set();
    syntax_set
      .find_syntax_by_extension(extension)
      .map(|syntax| syntax.name.to_lowercase())
  }
}

/// Create a Syntect-based syntax manager using `theme` as the default.
pub fn create_syntect_manager(
  theme: Option<&str>,
) -> SyntaxResult<SyntaxManager> {
  let theme = theme.unwrap_or(DEFAULT_THEME);
  let highlighter = Box::new(SyntectHighlighter::new(Some(theme.to_string())));
  let config = SyntaxConfig {
    default_theme: Some(theme.to_string()),
    ..SyntaxConfig::default()
  };
  Ok(SyntaxManager::new(highlighter, config))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_syntect_highlighter() {
    let highlighter = SyntectHighlighter::default();
    assert_eq!(highlighter.name(), "Syntect");
    assert!(highlighter.supports_language("rust"));
    assert!(highlighter.supports_language("javascript"));
    assert!(highlighter.has_theme("InspiredGitHub"));
    assert!(highlighter.has_theme("Dracula"));
  }

  #[test]
  fn test_highlight_lines_keeps_line_count() {
    let highlighter = SyntectHighlighter::default();
    let code = "fn main() {\n\n    println!(\"hi\");\n}\n";
    let lines = highlighter
      .highlight_lines(code, "rust", None)
      .expect("rust highlights");
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0].text(), "fn main() {");
    assert!(lines[1].is_empty());
    assert_eq!(lines[2].text(), "    println!(\"hi\");");
    assert!(
      lines[0]
        .tokens
        .iter()
        .all(|token| token.style.foreground.is_some())
    );
  }

  #[test]
  fn test_unknown_theme_falls_back() {
    let highlighter = SyntectHighlighter::default();
    let lines = highlighter
      .highlight_lines("let x = 1;", "rust", Some("NoSuchTheme"))
      .expect("falls back to default theme");
    assert_eq!(lines[0].text(), "let x = 1;");
  }

  #[test]
  fn test_background_is_hex() {
    let highlighter = SyntectHighlighter::default();
    let background = highlighter.background(Some("Dracula"));
    assert!(background.is_some_and(|bg| bg.starts_with('#') && bg.len() == 7));
  }

  #[test]
  fn test_language_from_filename() {
    let highlighter = SyntectHighlighter::default();
    assert_eq!(
      highlighter.language_from_filename("src/main.rs").as_deref(),
      Some("rust")
    );
  }
}
