#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
use blogmark_markdown::{
  MarkdownOptions,
  MarkdownOptionsBuilder,
  MarkdownProcessor,
  link_card_placeholders,
};

fn render(markdown: &str) -> String {
  MarkdownProcessor::new(MarkdownOptions::default())
    .render(markdown)
    .html
}

#[test]
fn test_bare_url_paragraph_becomes_placeholder() {
  let html = render("Intro\n\nhttps://example.com\n\nOutro\n");
  assert_eq!(
    html,
    "<p>Intro</p>\n<div data-link-card=\"https://example.com\"></div>\n<p>Outro</p>\n"
  );
}

#[test]
fn test_angle_autolink_becomes_placeholder() {
  let html = render("<https://example.com/page>\n");
  assert!(html.contains(r#"<div data-link-card="https://example.com/page"></div>"#));
  assert!(!html.contains("<a "));
}

#[test]
fn test_labelled_link_is_not_a_card() {
  let html = render("[custom](https://example.com)\n");
  assert!(!html.contains("data-link-card"));
  assert!(html.contains(r#"<a href="https://example.com">custom</a>"#));
}

#[test]
fn test_url_inside_sentence_is_not_a_card() {
  let html = render("See https://example.com for more.\n");
  assert!(!html.contains("data-link-card"));
  assert!(html.contains(r#"href="https://example.com""#));
}

#[test]
fn test_query_string_round_trips() {
  let html = render("<https://example.com/?a=1&b=2>\n");
  assert!(html.contains(
    r#"<div data-link-card="https://example.com/?a=1&amp;b=2"></div>"#
  ));

  let placeholders = link_card_placeholders(&html);
  assert_eq!(placeholders.len(), 1);
  assert_eq!(placeholders[0].url, "https://example.com/?a=1&b=2");
}

#[test]
fn test_placeholders_in_document_order() {
  let html = render(
    "https://one.example\n\ntext\n\nhttps://two.example\n\nhttps://one.example\n",
  );
  let urls: Vec<String> = link_card_placeholders(&html)
    .into_iter()
    .map(|p| p.url)
    .collect();
  assert_eq!(urls, [
    "https://one.example",
    "https://two.example",
    "https://one.example"
  ]);
}

#[test]
fn test_link_cards_disabled() {
  let processor = MarkdownProcessor::new(
    MarkdownOptionsBuilder::new().link_cards(false).build(),
  );
  let html = processor.render("https://example.com\n").html;
  assert!(!html.contains("data-link-card"));
  assert!(!html.contains("LINKCARD"));
  assert!(html.contains(r#"<a href="https://example.com">"#));
}

#[test]
fn test_url_with_dollar_signs_is_kept_whole() {
  let html = render("<https://example.com/a$$b>\n");
  assert_eq!(
    html,
    "<div data-link-card=\"https://example.com/a$$b\"></div>\n"
  );
  let placeholders = link_card_placeholders(&html);
  assert_eq!(placeholders.len(), 1);
  assert_eq!(placeholders[0].url, "https://example.com/a$$b");
}

#[test]
fn test_marker_text_in_fenced_code_stays_code() {
  let html = render("```\n$$LINKCARD:https://x.example$$\n```\n");
  assert!(!html.contains("data-link-card"));
  assert!(html.contains(r#"data-code-content="$$LINKCARD:https://x.example$$""#));
  assert!(html.contains("$$LINKCARD:https://x.example$$</span>"));
}

#[test]
fn test_marker_text_in_inline_code_stays_code() {
  let html = render("Write `$$LINKCARD:https://x.example$$` to embed.\n");
  assert!(!html.contains("data-link-card"));
  assert!(html.contains("<code>$$LINKCARD:https://x.example$$</code>"));

  let html = render("`$$LINKCARD:https://x.example$$`\n");
  assert!(!html.contains("data-link-card"));
  assert_eq!(html, "<p><code>$$LINKCARD:https://x.example$$</code></p>\n");
}
