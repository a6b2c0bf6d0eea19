#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
use blogmark_markdown::{Heading, MarkdownOptions, MarkdownProcessor};

fn ids(headings: &[Heading]) -> Vec<&str> {
  headings.iter().map(|h| h.id.as_str()).collect()
}

#[test]
fn test_duplicate_headings_get_suffixes() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let output = processor
    .render("# Test\n\n## Overview\n\n## Test\n\n### Overview\n\n## Test\n");

  assert_eq!(ids(&output.headings), [
    "test",
    "overview",
    "test-1",
    "overview-1",
    "test-2"
  ]);
  assert!(output.html.contains(r#"<h2 id="test-1">Test</h2>"#));
  assert!(output.html.contains(r#"<h3 id="overview-1">Overview</h3>"#));
}

#[test]
fn test_headings_in_document_order_with_levels() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let headings =
    processor.extract_headings("## Second level\n\n# Top\n\n###### Deep\n");

  let levels: Vec<u8> = headings.iter().map(|h| h.level).collect();
  assert_eq!(levels, [2, 1, 6]);
  assert_eq!(ids(&headings), ["second-level", "top", "deep"]);
}

#[test]
fn test_cjk_heading_keeps_characters() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let output = processor.render("## 日本語 の 見出し\n");

  assert_eq!(output.headings[0].id, "日本語-の-見出し");
  assert_eq!(output.headings[0].text, "日本語 の 見出し");
  assert!(output.html.contains(r#"<h2 id="日本語-の-見出し">"#));
}

#[test]
fn test_heading_text_flattens_inline_markup() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let output = processor.render("## Using `cargo` *fast*\n");

  assert_eq!(output.headings[0].text, "Using cargo fast");
  assert_eq!(output.headings[0].id, "using-cargo-fast");
}

#[test]
fn test_title_is_first_h1() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());

  let output = processor.render("## Intro\n\n# Real Title\n\n# Another\n");
  assert_eq!(output.title.as_deref(), Some("Real Title"));

  let output = processor.render("## Only sections\n");
  assert_eq!(output.title, None);
}

#[test]
fn test_symbol_only_headings() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let output = processor.render("## ???\n\n## !!!\n");
  assert_eq!(ids(&output.headings), ["heading", "heading-1"]);
}
