//! Syntax highlighting stage.
//!
//! Every `pre > code` block of the rendered document is rebuilt as a
//! `figure[data-code-figure]` holding one `span[data-line]` per source line.
//! Language and meta (title, emphasized lines) are read from the attributes
//! comrak writes for fenced code: `class="language-*"` and `data-meta`.
use std::panic::{AssertUnwindSafe, catch_unwind};

use kuchikikiki::NodeRef;
use log::{debug, warn};

use super::{process::guard_node, types::ThemeConfig};
use crate::{
  error::MarkdownResult,
  syntax::{HighlightedLine, PLAIN_TEXT, SyntaxManager},
  utils::{
    codeblock::CodeMeta,
    dom::{new_element, select_all, text_element},
  },
};

/// Text placed in blank lines so they keep their height.
pub const EMPTY_LINE_PLACEHOLDER: &str = " ";

struct PendingBlock {
  pre:      NodeRef,
  code:     String,
  language: String,
  meta:     CodeMeta,
}

/// Highlight all code blocks below `document`, returning how many were
/// replaced. A block that fails is logged and keeps its original markup.
pub fn highlight_code_blocks(
  document: &NodeRef,
  manager: &SyntaxManager,
  theme: &ThemeConfig,
) -> MarkdownResult<usize> {
  let blocks: Vec<PendingBlock> = select_all(document, "pre > code")?
    .into_iter()
    .filter_map(|code| {
      let pre = code.parent()?;
      let element = code.as_element()?;
      let attributes = element.attributes.borrow();
      let language = attributes
        .get("class")
        .and_then(|class| {
          class
            .split_whitespace()
            .find_map(|class| class.strip_prefix("language-"))
        })
        .filter(|language| !language.is_empty())
        .unwrap_or(PLAIN_TEXT)
        .to_string();
      let meta = CodeMeta::parse(attributes.get("data-meta").unwrap_or(""));
      Some(PendingBlock {
        pre,
        code: code.text_contents(),
        language,
        meta,
      })
    })
    .collect();

  let mut highlighted = 0;
  for block in blocks {
    let what = format!("highlighting of a {} code block", block.language);
    if let Some(figure) =
      guard_node(&what, || build_figure(&block, manager, theme))
    {
      block.pre.insert_before(figure);
      block.pre.detach();
      highlighted += 1;
    }
  }

  debug!("Highlighted {highlighted} code block(s) with {}", theme.name);
  Ok(highlighted)
}

fn build_figure(
  block: &PendingBlock,
  manager: &SyntaxManager,
  theme: &ThemeConfig,
) -> MarkdownResult<NodeRef> {
  let lines = manager.highlight_lines(
    &block.code,
    &block.language,
    Some(theme.name.as_str()),
  )?;

  let figure = new_element("figure", &[("data-code-figure", "")]);
  if let Some(title) = &block.meta.title {
    figure.append(text_element(
      "figcaption",
      &[("data-code-title", "")],
      title,
    ));
  }

  let style = theme
    .background
    .as_ref()
    .map(|background| format!("background-color:{background}"));
  let mut pre_attributes = vec![
    ("data-language", block.language.as_str()),
    ("data-theme", theme.name.as_str()),
  ];
  if let Some(style) = &style {
    pre_attributes.push(("style", style.as_str()));
  }
  pre_attributes.push(("tabindex", "0"));
  let pre = new_element("pre", &pre_attributes);

  let code = new_element("code", &[
    ("data-language", block.language.as_str()),
    ("data-theme", theme.name.as_str()),
  ]);
  for (index, line) in lines.iter().enumerate() {
    if index > 0 {
      code.append(NodeRef::new_text("\n"));
    }
    code.append(decorate_line(index + 1, line, &block.meta));
  }

  pre.append(code);
  figure.append(pre);
  Ok(figure)
}

/// Build the span for one line, falling back to plain text if decoration
/// panics.
fn decorate_line(
  number: usize,
  line: &HighlightedLine,
  meta: &CodeMeta,
) -> NodeRef {
  catch_unwind(AssertUnwindSafe(|| render_line(number, line, meta)))
    .unwrap_or_else(|_| {
      warn!("Failed to decorate code line {number}, rendering it as plain");
      render_line(number, &HighlightedLine::plain(&line.text()), meta)
    })
}

fn render_line(
  number: usize,
  line: &HighlightedLine,
  meta: &CodeMeta,
) -> NodeRef {
  let mut attributes = Vec::with_capacity(3);
  if line.is_empty() {
    attributes.push(("data-empty-line", ""));
  }
  if meta.is_highlighted(number) {
    attributes.push(("data-highlighted-line", ""));
  }
  attributes.push(("data-line", ""));

  if line.is_empty() {
    return text_element("span", &attributes, EMPTY_LINE_PLACEHOLDER);
  }

  let span = new_element("span", &attributes);
  for token in &line.tokens {
    match token.style.css() {
      Some(css) => {
        span.append(text_element(
          "span",
          &[("style", css.as_str())],
          &token.text,
        ));
      },
      None => span.append(NodeRef::new_text(token.text.as_str())),
    }
  }
  span
}
