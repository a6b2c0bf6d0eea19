//! Link-card markers.
//!
//! A paragraph consisting of nothing but a pasted URL is a request for a
//! preview card. While the document is still a Markdown AST such links are
//! replaced by a text marker, `$$LINKCARD:<url>$$`, which survives HTML
//! rendering untouched. Once the HTML is parsed into a DOM, every paragraph
//! holding exactly one marker is materialized into an empty placeholder
//! element:
//!
//! ```html
//! <div data-link-card="https://example.com"></div>
//! ```
//!
//! Markers anywhere else (inside code, mixed with other text, in attributes)
//! are left as written. Filling the placeholder with OGP data is left to
//! whoever hydrates the page.
use std::{ops::Range, sync::LazyLock};

use comrak::nodes::{AstNode, NodeValue};
use kuchikikiki::NodeRef;
use log::{debug, trace};
use regex::Regex;

use super::{core::extract_inline_text, types::AstTransformer};
use crate::{
  error::MarkdownResult,
  utils::{
    dom::{is_tag, new_element, select_all},
    entities::{decode_entities, escape_html},
    never_matching_regex,
  },
};

/// Opening delimiter of a link-card marker.
pub const LINK_CARD_MARKER_PREFIX: &str = "$$LINKCARD:";
/// Closing delimiter of a link-card marker.
pub const LINK_CARD_MARKER_SUFFIX: &str = "$$";

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"<div data-link-card="([^"]*)"></div>"#).unwrap_or_else(|e| {
    log::error!("Failed to compile PLACEHOLDER_RE regex: {e}");
    never_matching_regex()
  })
});

/// Build the marker text for `url`.
#[must_use]
pub fn link_card_marker(url: &str) -> String {
  format!("{LINK_CARD_MARKER_PREFIX}{url}{LINK_CARD_MARKER_SUFFIX}")
}

/// Placeholder element for `url`, escaped for the attribute context.
#[must_use]
pub fn link_card_placeholder(url: &str) -> String {
  format!(r#"<div data-link-card="{}"></div>"#, escape_html(url))
}

/// Replaces bare-URL paragraphs with link-card markers.
///
/// A link qualifies when it is the only child of its paragraph and its visible
/// text equals its destination, which is what both GFM autolinks and
/// `<https://...>` autolinks produce. `[text](url)` links are left alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkCardTransformer;

impl AstTransformer for LinkCardTransformer {
  fn transform<'a>(&self, node: &'a AstNode<'a>) {
    let candidates: Vec<(&'a AstNode<'a>, String)> = node
      .descendants()
      .filter(|n| matches!(n.data.borrow().value, NodeValue::Paragraph))
      .filter_map(bare_link)
      .collect();

    for (link, url) in candidates {
      trace!("Marking {url} as a link card");
      for child in link.children().collect::<Vec<_>>() {
        child.detach();
      }
      link.data.borrow_mut().value =
        NodeValue::Text(link_card_marker(&url).into());
    }
  }
}

/// The link of a paragraph whose only content is its own URL.
fn bare_link<'a>(
  paragraph: &'a AstNode<'a>,
) -> Option<(&'a AstNode<'a>, String)> {
  let mut children = paragraph.children();
  let link = children.next()?;
  if children.next().is_some() {
    return None;
  }

  let url = match &link.data.borrow().value {
    NodeValue::Link(link) => link.url.clone(),
    _ => return None,
  };

  (!url.is_empty() && extract_inline_text(link).trim() == url)
    .then_some((link, url))
}

/// URL carried by `text` when it is exactly one marker.
///
/// The URL runs up to the final `$$`, so URLs containing `$$` themselves
/// survive intact.
#[must_use]
pub fn parse_link_card_marker(text: &str) -> Option<&str> {
  let url = text
    .trim()
    .strip_prefix(LINK_CARD_MARKER_PREFIX)?
    .strip_suffix(LINK_CARD_MARKER_SUFFIX)?;
  (!url.is_empty() && !url.contains(char::is_whitespace)).then_some(url)
}

/// Replace every marker paragraph below `document` with a placeholder
/// element, returning how many were replaced.
///
/// Only a `p` whose single child is a marker text node qualifies, and never
/// one inside `pre` or `code`.
pub fn materialize_link_cards(document: &NodeRef) -> MarkdownResult<usize> {
  let mut materialized = 0;
  for paragraph in select_all(document, "p")? {
    let Some(url) = marker_paragraph_url(&paragraph) else {
      continue;
    };
    trace!("Materializing link card for {url}");
    paragraph.insert_before(new_element("div", &[(
      "data-link-card",
      url.as_str(),
    )]));
    paragraph.detach();
    materialized += 1;
  }

  debug!("Materialized {materialized} link card(s)");
  Ok(materialized)
}

fn marker_paragraph_url(paragraph: &NodeRef) -> Option<String> {
  if paragraph
    .ancestors()
    .any(|node| is_tag(&node, "pre") || is_tag(&node, "code"))
  {
    return None;
  }

  let mut children = paragraph.children();
  let child = children.next()?;
  if children.next().is_some() {
    return None;
  }
  let text = child.as_text()?.borrow();
  parse_link_card_marker(&text).map(str::to_string)
}

/// A link-card placeholder located in rendered HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCardPlaceholder {
  /// Position among all placeholders of the document, starting at 0.
  pub index: usize,
  /// Target URL, attribute escaping removed.
  pub url:   String,
  /// Byte range of the placeholder element in the HTML.
  pub range: Range<usize>,
}

/// Find all link-card placeholders in document order.
#[must_use]
pub fn link_card_placeholders(html: &str) -> Vec<LinkCardPlaceholder> {
  PLACEHOLDER_RE
    .captures_iter(html)
    .enumerate()
    .filter_map(|(index, caps)| {
      let whole = caps.get(0)?;
      Some(LinkCardPlaceholder {
        index,
        url: decode_entities(&caps[1]).into_owned(),
        range: whole.range(),
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::utils::dom::{body, parse_document, serialize_children};

  fn run(html: &str) -> String {
    let document = parse_document(html);
    materialize_link_cards(&document).expect("stage runs");
    serialize_children(&body(&document).expect("body")).expect("serializes")
  }

  #[test]
  fn test_materialize_paragraph_marker() {
    let html = "<h1>x</h1>\n<p>$$LINKCARD:https://example.com$$</p>\n";
    assert_eq!(
      run(html),
      "<h1>x</h1>\n<div data-link-card=\"https://example.com\"></div>\n"
    );
  }

  #[test]
  fn test_materialize_reescapes_url() {
    let html = "<p>$$LINKCARD:https://example.com/?a=1&amp;b=2$$</p>";
    let out = run(html);
    assert_eq!(
      out,
      r#"<div data-link-card="https://example.com/?a=1&amp;b=2"></div>"#
    );
    let placeholders = link_card_placeholders(&out);
    assert_eq!(placeholders.len(), 1);
    assert_eq!(placeholders[0].url, "https://example.com/?a=1&b=2");
  }

  #[test]
  fn test_url_containing_dollars() {
    let out = run("<p>$$LINKCARD:https://example.com/a$$b$$</p>");
    assert_eq!(
      out,
      r#"<div data-link-card="https://example.com/a$$b"></div>"#
    );
    assert_eq!(
      link_card_placeholders(&out)[0].url,
      "https://example.com/a$$b"
    );
  }

  #[test]
  fn test_marker_mixed_with_text_is_left_alone() {
    let html = "<p>see $$LINKCARD:https://a.example$$ here</p>";
    assert_eq!(run(html), html);
  }

  #[test]
  fn test_markers_in_code_are_left_alone() {
    for html in [
      "<p><code>$$LINKCARD:https://a.example$$</code></p>",
      "<pre><code>$$LINKCARD:https://a.example$$</code></pre>",
      "<div data-code-content=\"$$LINKCARD:https://a.example$$\"></div>",
    ] {
      assert_eq!(run(html), html);
    }
  }

  #[test]
  fn test_parse_link_card_marker() {
    assert_eq!(
      parse_link_card_marker("$$LINKCARD:https://a.example$$"),
      Some("https://a.example")
    );
    assert_eq!(parse_link_card_marker("$$LINKCARD:$$"), None);
    assert_eq!(parse_link_card_marker("$$LINKCARD:a b$$"), None);
    assert_eq!(parse_link_card_marker("Costs $$5 and $$10"), None);
  }

  #[test]
  fn test_placeholders_in_order() {
    let html = format!(
      "<p>a</p>{}<p>b</p>{}",
      link_card_placeholder("https://one.example"),
      link_card_placeholder("https://two.example")
    );
    let placeholders = link_card_placeholders(&html);
    let urls: Vec<&str> =
      placeholders.iter().map(|p| p.url.as_str()).collect();
    assert_eq!(urls, ["https://one.example", "https://two.example"]);
    assert_eq!(placeholders[1].index, 1);
    assert_eq!(
      &html[placeholders[0].range.clone()],
      link_card_placeholder("https://one.example")
    );
  }
}
