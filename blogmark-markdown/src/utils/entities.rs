//! A deliberately small HTML entity codec.
//!
//! Decoding only understands a fixed set of entities: the ones encoders
//! actually emit for URLs and plain text inside attributes. Everything else is
//! left verbatim so that a page with exotic markup never changes meaning under
//! us.
use std::{borrow::Cow, sync::LazyLock};

use regex::{Captures, Regex};

use super::never_matching_regex;

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"&(?:amp|lt|gt|quot|apos|nbsp|#39|#x27|#x2[fF]|#47);")
    .unwrap_or_else(|e| {
      log::error!("Failed to compile ENTITY_RE regex: {e}");
      never_matching_regex()
    })
});

/// Decode the fixed entity set (`&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`,
/// `&#39;`, `&#x27;`, `&#x2F;`, `&#47;`, `&nbsp;`).
///
/// Decoding is a single pass, so `&amp;lt;` becomes `&lt;` and not `<`.
#[must_use]
pub fn decode_entities(text: &str) -> Cow<'_, str> {
  if !text.contains('&') {
    return Cow::Borrowed(text);
  }

  ENTITY_RE.replace_all(text, |caps: &Captures| {
    match &caps[0] {
      "&amp;" => "&",
      "&lt;" => "<",
      "&gt;" => ">",
      "&quot;" => "\"",
      "&apos;" | "&#39;" | "&#x27;" => "'",
      "&nbsp;" => "\u{a0}",
      // &#x2F; &#x2f; &#47;
      _ => "/",
    }
  })
}

/// Escape `&`, `<`, `>`, `"` and `'`.
///
/// The output is safe both as element text and inside a quoted attribute.
#[must_use]
pub fn escape_html(text: &str) -> String {
  html_escape::encode_quoted_attribute(text).into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decode_fixed_set() {
    assert_eq!(
      decode_entities("a &amp; b &lt;c&gt; &quot;d&quot; &#39;e&#x27; &apos;"),
      "a & b <c> \"d\" 'e' '"
    );
    assert_eq!(decode_entities("a&#x2F;b&#47;c&#x2f;"), "a/b/c/");
  }

  #[test]
  fn test_decode_leaves_unknown_entities() {
    assert_eq!(decode_entities("&copy; &hellip; &#169;"), "&copy; &hellip; &#169;");
  }

  #[test]
  fn test_decode_is_single_pass() {
    assert_eq!(decode_entities("&amp;lt;"), "&lt;");
  }

  #[test]
  fn test_decode_borrows_when_nothing_to_do() {
    assert!(matches!(decode_entities("plain text"), Cow::Borrowed(_)));
  }

  #[test]
  fn test_image_url_query_string() {
    assert_eq!(
      decode_entities("https://cdn.example.com/a.jpg?w=1200&amp;h=630"),
      "https://cdn.example.com/a.jpg?w=1200&h=630"
    );
  }

  #[test]
  fn test_escape_then_decode_restores_input() {
    let input = r#"<script>alert("x & 'y'")</script>"#;
    let escaped = escape_html(input);
    assert!(!escaped.contains('<'));
    assert!(!escaped.contains('"'));
    assert!(!escaped.contains('\''));
    assert_eq!(decode_entities(&escaped), input);
  }
}
