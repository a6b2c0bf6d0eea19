//! Thin helpers over kuchikikiki for building and reading the render DOM.
use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use markup5ever::{LocalName, QualName, ns};
use tendril::TendrilSink;

use super::{UtilError, UtilResult};

/// Parse an HTML fragment into a full document tree.
///
/// The fragment ends up inside `<body>`; see [`body`].
#[must_use]
pub fn parse_document(html: &str) -> NodeRef {
  kuchikikiki::parse_html().one(html)
}

/// The `<body>` element of a parsed document.
#[must_use]
pub fn body(document: &NodeRef) -> Option<NodeRef> {
  document
    .select_first("body")
    .ok()
    .map(|body| body.as_node().clone())
}

/// Build an HTML element with the given attributes, in order.
#[must_use]
pub fn new_element(tag: &str, attributes: &[(&str, &str)]) -> NodeRef {
  NodeRef::new_element(
    QualName::new(None, ns!(html), LocalName::from(tag)),
    attributes.iter().map(|(name, value)| {
      (ExpandedName::new("", *name), Attribute {
        prefix: None,
        value:  (*value).to_string(),
      })
    }),
  )
}

/// Build an element holding a single text child.
#[must_use]
pub fn text_element(
  tag: &str,
  attributes: &[(&str, &str)],
  text: &str,
) -> NodeRef {
  let element = new_element(tag, attributes);
  element.append(NodeRef::new_text(text));
  element
}

/// Whether `node` is an element carrying the attribute `name`.
#[must_use]
pub fn has_attribute(node: &NodeRef, name: &str) -> bool {
  node
    .as_element()
    .is_some_and(|element| element.attributes.borrow().contains(name))
}

/// Whether `node` is an element with the given tag name.
#[must_use]
pub fn is_tag(node: &NodeRef, tag: &str) -> bool {
  node
    .as_element()
    .is_some_and(|element| element.name.local.as_ref() == tag)
}

/// Collect every node matching `selector`, in document order.
///
/// Collecting up front lets callers mutate the tree afterwards without
/// invalidating the traversal.
pub fn select_all(
  root: &NodeRef,
  selector: &'static str,
) -> UtilResult<Vec<NodeRef>> {
  let matches = root
    .select(selector)
    .map_err(|()| UtilError::InvalidSelector(selector))?;
  Ok(matches.map(|element| element.as_node().clone()).collect())
}

/// Serialize the children of `node` (not `node` itself).
pub fn serialize_children(node: &NodeRef) -> UtilResult<String> {
  let mut buf = Vec::new();
  for child in node.children() {
    child.serialize(&mut buf)?;
  }
  Ok(String::from_utf8_lossy(&buf).into_owned())
}
