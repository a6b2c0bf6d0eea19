//! Open Graph metadata extraction.
//!
//! Third-party pages are frequently malformed, so this is pattern matching
//! rather than parsing: every `<meta ...>` tag is located with a regex and its
//! attributes are read in whatever order they appear, quoted with `"`, `'` or
//! not at all. Missing metadata degrades to fallbacks and is never an error.
use std::sync::LazyLock;

use blogmark_markdown::utils::{entities::decode_entities, never_matching_regex};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

static META_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
  // Quoted values may contain `>`.
  Regex::new(r#"(?i)<meta\b(?:[^>"']|"[^"]*"|'[^']*')*>"#).unwrap_or_else(
    |e| {
      log::error!("Failed to compile META_TAG_RE regex: {e}");
      never_matching_regex()
    },
  )
});

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#,
  )
  .unwrap_or_else(|e| {
    log::error!("Failed to compile ATTRIBUTE_RE regex: {e}");
    never_matching_regex()
  })
});

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").unwrap_or_else(|e| {
    log::error!("Failed to compile TITLE_RE regex: {e}");
    never_matching_regex()
  })
});

/// Preview data for one URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OgpData {
  /// `og:title`, else the page `<title>`, else the URL itself.
  pub title:       String,
  /// `og:description`, else `<meta name="description">`, else empty.
  #[serde(default)]
  pub description: String,
  /// Absolute image URL.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub site_name:   Option<String>,
  /// The URL the data was requested for.
  pub url:         String,
}

/// One `<meta>` tag reduced to the attributes that identify it.
#[derive(Debug, Default)]
struct MetaTag {
  property: Option<String>,
  name:     Option<String>,
  content:  Option<String>,
}

impl MetaTag {
  fn parse(tag: &str) -> Self {
    let mut meta = Self::default();
    for caps in ATTRIBUTE_RE.captures_iter(tag) {
      let value = caps
        .get(2)
        .or_else(|| caps.get(3))
        .or_else(|| caps.get(4))
        .map_or("", |m| m.as_str())
        .to_string();
      let slot = match caps[1].to_ascii_lowercase().as_str() {
        "property" => &mut meta.property,
        "name" => &mut meta.name,
        "content" => &mut meta.content,
        _ => continue,
      };
      // First occurrence wins, like in a browser.
      if slot.is_none() {
        *slot = Some(value);
      }
    }
    meta
  }

  fn is(&self, key: &str) -> bool {
    [&self.property, &self.name]
      .into_iter()
      .flatten()
      .any(|value| value.trim().eq_ignore_ascii_case(key))
  }
}

fn meta_tags(html: &str) -> Vec<MetaTag> {
  META_TAG_RE
    .find_iter(html)
    .map(|m| MetaTag::parse(m.as_str()))
    .collect()
}

/// Decoded, trimmed, non-empty `content` of the first tag matching `key`.
fn meta_content(tags: &[MetaTag], key: &str) -> Option<String> {
  tags
    .iter()
    .filter(|tag| tag.is(key))
    .find_map(|tag| tag.content.as_deref())
    .map(|content| decode_entities(content).trim().to_string())
    .filter(|content| !content.is_empty())
}

/// Text of the page `<title>`, if any.
#[must_use]
pub fn page_title(html: &str) -> Option<String> {
  TITLE_RE
    .captures(html)
    .map(|caps| decode_entities(caps[1].trim()).trim().to_string())
    .filter(|title| !title.is_empty())
}

/// Resolve `image` against the page it was found on. Values that cannot be
/// resolved are returned unchanged.
#[must_use]
pub fn absolute_image_url(page_url: &str, image: &str) -> String {
  Url::parse(page_url)
    .and_then(|base| base.join(image))
    .map_or_else(|_| image.to_string(), String::from)
}

/// Extract preview data from the HTML of `url`.
#[must_use]
pub fn extract_ogp(html: &str, url: &str) -> OgpData {
  let tags = meta_tags(html);

  let title = meta_content(&tags, "og:title")
    .or_else(|| page_title(html))
    .unwrap_or_else(|| url.to_string());
  let description = meta_content(&tags, "og:description")
    .or_else(|| meta_content(&tags, "description"))
    .unwrap_or_default();
  let image = meta_content(&tags, "og:image")
    .map(|image| absolute_image_url(url, &image));
  let site_name = meta_content(&tags, "og:site_name");

  OgpData {
    title,
    description,
    image,
    site_name,
    url: url.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const URL: &str = "https://blog.example.com/posts/hello";

  #[test]
  fn test_full_metadata() {
    let html = r#"<html><head>
      <meta property="og:title" content="Hello &amp; Welcome">
      <meta property="og:description" content="  A first post. ">
      <meta property="og:image" content="/img/cover.png?w=1&amp;h=2">
      <meta property="og:site_name" content="Example Blog">
      <title>Ignored</title>
    </head></html>"#;

    let data = extract_ogp(html, URL);
    assert_eq!(data.title, "Hello & Welcome");
    assert_eq!(data.description, "A first post.");
    assert_eq!(
      data.image.as_deref(),
      Some("https://blog.example.com/img/cover.png?w=1&h=2")
    );
    assert_eq!(data.site_name.as_deref(), Some("Example Blog"));
    assert_eq!(data.url, URL);
  }

  #[test]
  fn test_attribute_order_and_quoting() {
    let html = "<META CONTENT='Reversed' PROPERTY='og:title'/>\
                <meta content=\"Desc\" name=\"og:description\">\
                <meta property=og:site_name content=Unquoted>";
    let data = extract_ogp(html, URL);
    assert_eq!(data.title, "Reversed");
    assert_eq!(data.description, "Desc");
    assert_eq!(data.site_name.as_deref(), Some("Unquoted"));
  }

  #[test]
  fn test_greater_than_inside_quoted_values() {
    let html = r#"<meta property="og:title" content="Rust > Go?">
      <meta content='a -> b' property="og:description">
      <title>Page</title>"#;
    let data = extract_ogp(html, URL);
    assert_eq!(data.title, "Rust > Go?");
    assert_eq!(data.description, "a -> b");
  }

  #[test]
  fn test_title_only_page() {
    let data = extract_ogp("<title>Only Title</title>", URL);
    assert_eq!(data.title, "Only Title");
    assert_eq!(data.description, "");
    assert_eq!(data.image, None);
    assert_eq!(data.site_name, None);
  }

  #[test]
  fn test_description_fallback() {
    let html = r#"<meta name="description" content="Plain description">"#;
    assert_eq!(extract_ogp(html, URL).description, "Plain description");
  }

  #[test]
  fn test_no_metadata_uses_url() {
    let data = extract_ogp("<p>nothing here</p>", URL);
    assert_eq!(data.title, URL);
    assert_eq!(data.description, "");
  }

  #[test]
  fn test_empty_values_fall_through() {
    let html = r#"<meta property="og:title" content="  "><title>
      Real title
    </title>"#;
    assert_eq!(extract_ogp(html, URL).title, "Real title");
  }

  #[test]
  fn test_image_resolution() {
    assert_eq!(
      absolute_image_url(URL, "cover.png"),
      "https://blog.example.com/posts/cover.png"
    );
    assert_eq!(
      absolute_image_url(URL, "//cdn.example.net/a.png"),
      "https://cdn.example.net/a.png"
    );
    assert_eq!(
      absolute_image_url(URL, "https://other.example/b.png"),
      "https://other.example/b.png"
    );
    assert_eq!(absolute_image_url("not a url", "c.png"), "c.png");
  }

  #[test]
  fn test_serialization_shape() {
    let data = extract_ogp(
      r#"<meta property="og:site_name" content="Site"><title>T</title>"#,
      URL,
    );
    let json = serde_json::to_value(&data).expect("serializes");
    assert_eq!(json["siteName"], "Site");
    assert!(json.get("image").is_none());
    assert_eq!(json["description"], "");
  }
}
