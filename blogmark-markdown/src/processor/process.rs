//! Error recovery around the rendering pipeline.
//!
//! Rendering must always produce something readable. Whole-document failures
//! (an error or a panic anywhere in the pipeline) switch to the fallback
//! renderer; per-node failures are contained with [`guard_node`] so that one
//! bad code block or heading does not cost the rest of the document.
use std::{
  any::Any,
  panic::{AssertUnwindSafe, catch_unwind},
};

use log::{error, warn};

use super::types::MarkdownProcessor;
use crate::{
  error::{MarkdownError, MarkdownResult},
  types::RenderOutput,
  utils::entities::escape_html,
};

/// Class of the element wrapping fallback output.
pub const FALLBACK_CLASS: &str = "markdown-fallback";

/// Render `content` as escaped text, preserving line breaks.
///
/// Every `&`, `<`, `>`, `"` and `'` is escaped and every `\n` becomes `<br>`,
/// so decoding the body reproduces the input exactly.
#[must_use]
pub fn render_fallback(content: &str) -> RenderOutput {
  let body = escape_html(content).replace('\n', "<br>");
  RenderOutput {
    html:     format!(r#"<div class="{FALLBACK_CLASS}">{body}</div>"#),
    headings: Vec::new(),
    title:    None,
  }
}

/// Run a rendering stage, falling back to [`render_fallback`] if it errors or
/// panics.
pub fn process_with_fallback<F>(content: &str, stage: F) -> RenderOutput
where
  F: FnOnce(&str) -> MarkdownResult<RenderOutput>,
{
  match catch_unwind(AssertUnwindSafe(|| stage(content))) {
    Ok(Ok(output)) => output,
    Ok(Err(e)) => {
      error!("Markdown rendering failed, using fallback renderer: {e}");
      render_fallback(content)
    },
    Err(panic) => {
      error!(
        "Panic during markdown processing, using fallback renderer: {}",
        panic_message(panic.as_ref())
      );
      render_fallback(content)
    },
  }
}

/// Render with a configured processor, recovering from any failure.
///
/// # Arguments
///
/// * `processor` - The configured markdown processor
/// * `content` - The raw markdown content to process
#[must_use]
pub fn process_with_recovery(
  processor: &MarkdownProcessor,
  content: &str,
) -> RenderOutput {
  process_with_fallback(content, |content| processor.try_render(content))
}

/// Run a per-node operation, containing errors and panics.
///
/// Returns `None` (after logging) when the operation fails; the caller is
/// expected to leave the node as it was.
pub fn guard_node<T, F>(what: &str, operation: F) -> Option<T>
where
  F: FnOnce() -> MarkdownResult<T>,
{
  match catch_unwind(AssertUnwindSafe(operation)) {
    Ok(Ok(value)) => Some(value),
    Ok(Err(e)) => {
      warn!("Skipping {what}: {e}");
      None
    },
    Err(panic) => {
      let e = MarkdownError::Panicked(panic_message(panic.as_ref()));
      warn!("Skipping {what}: {e}");
      None
    },
  }
}

/// Best-effort description of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else {
    "unknown panic payload".to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::utils::entities::decode_entities;

  fn unwrap_fallback(html: &str) -> String {
    let body = html
      .strip_prefix(r#"<div class="markdown-fallback">"#)
      .and_then(|rest| rest.strip_suffix("</div>"))
      .expect("fallback wrapper");
    decode_entities(&body.replace("<br>", "\n")).into_owned()
  }

  #[test]
  fn test_fallback_escapes_everything() {
    let output = render_fallback(r#"<b>"x" & 'y'</b>"#);
    assert!(output.html.starts_with(r#"<div class="markdown-fallback">&lt;b&gt;"#));
    assert!(output.html.contains("&quot;x&quot; &amp; "));
    assert!(!output.html.contains('\''));
    assert!(output.html.ends_with("&lt;/b&gt;</div>"));
    assert!(output.headings.is_empty());
  }

  #[test]
  fn test_fallback_round_trips() {
    for input in [
      "plain",
      "# Heading\n\n<script>alert('x')</script>\n",
      "already &amp; escaped &lt;tag&gt;",
      "line one\r\nline two\n\n\n",
      "",
    ] {
      let output = render_fallback(input);
      assert_eq!(unwrap_fallback(&output.html), input);
    }
  }

  #[test]
  fn test_process_with_fallback_on_error() {
    let output = process_with_fallback("a < b", |_| {
      Err(MarkdownError::NestingTooDeep { limit: 1 })
    });
    assert_eq!(output, render_fallback("a < b"));
  }

  #[test]
  #[allow(clippy::panic, reason = "Exercises panic recovery")]
  fn test_process_with_fallback_on_panic() {
    let output = process_with_fallback("boom", |_| -> MarkdownResult<_> {
      panic!("stage exploded")
    });
    assert_eq!(output.html, r#"<div class="markdown-fallback">boom</div>"#);
  }

  #[test]
  fn test_process_with_fallback_passes_success_through() {
    let output = process_with_fallback("x", |content| {
      Ok(RenderOutput {
        html: format!("<p>{content}</p>"),
        ..RenderOutput::default()
      })
    });
    assert_eq!(output.html, "<p>x</p>");
  }

  #[test]
  #[allow(clippy::panic, reason = "Exercises panic recovery")]
  fn test_guard_node() {
    assert_eq!(guard_node("ok", || Ok(1)), Some(1));
    assert_eq!(
      guard_node::<(), _>("err", || Err(MarkdownError::MissingBody)),
      None
    );
    assert_eq!(guard_node::<(), _>("panic", || panic!("nope")), None);
  }
}
