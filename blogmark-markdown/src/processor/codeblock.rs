//! Copy-ready code block wrappers.
//!
//! Runs after highlighting. Each `figure[data-code-figure]` is moved into a
//! wrapper that carries the raw code (for a copy button) and the file name
//! taken from the figure's caption:
//!
//! ```html
//! <div class="code-block-wrapper" data-code-content="..." data-filename="main.rs">
//!   <div class="code-block-header">
//!     <div class="code-block-filename">
//!       <span aria-hidden="true" class="code-block-icon" data-icon="rust"></span>
//!       <span class="code-block-filename-text">main.rs</span>
//!     </div>
//!     <div class="code-block-actions" data-copy-slot=""></div>
//!   </div>
//!   <figure data-code-figure="">...</figure>
//! </div>
//! ```
use kuchikikiki::NodeRef;
use log::debug;

use super::process::guard_node;
use crate::{
  error::MarkdownResult,
  syntax::SyntaxManager,
  utils::dom::{has_attribute, is_tag, new_element, select_all, text_element},
};

/// Icon name used when the file type cannot be determined.
pub const GENERIC_FILE_ICON: &str = "file";

/// Wrap every highlighted code figure below `document`. Returns the number of
/// figures wrapped; a figure that fails is logged and left as it was.
pub fn enrich_code_blocks(
  document: &NodeRef,
  manager: Option<&SyntaxManager>,
) -> MarkdownResult<usize> {
  let figures = select_all(document, "figure[data-code-figure]")?;

  let mut enriched = 0;
  for figure in figures {
    if guard_node("code block enrichment", || wrap_figure(&figure, manager))
      .is_some()
    {
      enriched += 1;
    }
  }

  debug!("Enriched {enriched} code block(s)");
  Ok(enriched)
}

fn wrap_figure(
  figure: &NodeRef,
  manager: Option<&SyntaxManager>,
) -> MarkdownResult<()> {
  let code_content = figure
    .children()
    .find(|child| is_tag(child, "pre"))
    .map_or_else(|| figure.text_contents(), |pre| extract_code_text(&pre));

  let caption = figure.children().find(|child| is_tag(child, "figcaption"));
  let filename = caption
    .as_ref()
    .map(|caption| caption.text_contents().trim().to_string())
    .unwrap_or_default();
  if let Some(caption) = caption {
    caption.detach();
  }

  let wrapper = new_element("div", &[
    ("class", "code-block-wrapper"),
    ("data-code-content", code_content.trim()),
    ("data-filename", filename.as_str()),
  ]);
  wrapper.append(build_header(&filename, manager));

  figure.insert_before(wrapper.clone());
  figure.detach();
  wrapper.append(figure.clone());
  Ok(())
}

/// Code text of a highlighted `pre`, one entry per `data-line` span.
///
/// Blank-line placeholders count as empty lines. Falls back to the plain text
/// content when the block has no line spans.
fn extract_code_text(pre: &NodeRef) -> String {
  let lines: Vec<NodeRef> = pre
    .descendants()
    .filter(|node| has_attribute(node, "data-line"))
    .collect();

  if lines.is_empty() {
    return pre.text_contents();
  }

  lines
    .iter()
    .map(|line| {
      if has_attribute(line, "data-empty-line") {
        String::new()
      } else {
        line.text_contents()
      }
    })
    .collect::<Vec<_>>()
    .join("\n")
}

fn build_header(filename: &str, manager: Option<&SyntaxManager>) -> NodeRef {
  let header = new_element("div", &[("class", "code-block-header")]);

  if !filename.is_empty() {
    let icon = manager
      .and_then(|manager| manager.language_from_filename(filename))
      .unwrap_or_else(|| GENERIC_FILE_ICON.to_string());

    let label = new_element("div", &[("class", "code-block-filename")]);
    label.append(new_element("span", &[
      ("aria-hidden", "true"),
      ("class", "code-block-icon"),
      ("data-icon", icon.as_str()),
    ]));
    label.append(text_element(
      "span",
      &[("class", "code-block-filename-text")],
      filename,
    ));
    header.append(label);
  }

  header.append(new_element("div", &[
    ("class", "code-block-actions"),
    ("data-copy-slot", ""),
  ]));
  header
}
