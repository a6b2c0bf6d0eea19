//! Heading anchors and table-of-contents extraction.
use kuchikikiki::NodeRef;
use log::trace;
use markup5ever::local_name;

use super::process::guard_node;
use crate::{
  error::MarkdownResult,
  types::Heading,
  utils::{SlugRegistry, dom::select_all, slugify},
};

/// Give every `h1`..`h6` below `document` a unique `id` and return the
/// headings in document order.
///
/// IDs are slugs of the heading text; repeats within the document get `-1`,
/// `-2`, ... in the order they are met. Existing `id` attributes are replaced.
pub fn assign_heading_ids(document: &NodeRef) -> MarkdownResult<Vec<Heading>> {
  let nodes = select_all(document, "h1, h2, h3, h4, h5, h6")?;

  let mut registry = SlugRegistry::new();
  let mut headings = Vec::with_capacity(nodes.len());

  for node in nodes {
    let heading = guard_node("heading anchor", || {
      let Some(element) = node.as_element() else {
        return Ok(None);
      };
      let Some(level) = heading_level(element.name.local.as_ref()) else {
        return Ok(None);
      };

      let text = node.text_contents().trim().to_string();
      let id = registry.assign(&slugify(&text));
      element
        .attributes
        .borrow_mut()
        .insert(local_name!("id"), id.clone());

      trace!("Heading h{level} '{text}' -> #{id}");
      Ok(Some(Heading { id, level, text }))
    });

    if let Some(Some(heading)) = heading {
      headings.push(heading);
    }
  }

  Ok(headings)
}

/// Level of a heading tag name (`h1` -> 1).
#[must_use]
pub fn heading_level(tag: &str) -> Option<u8> {
  match tag {
    "h1" => Some(1),
    "h2" => Some(2),
    "h3" => Some(3),
    "h4" => Some(4),
    "h5" => Some(5),
    "h6" => Some(6),
    _ => None,
  }
}
