//! The `render` subcommand.
use std::{
  fs,
  io::{self, Write},
  path::Path,
  sync::Arc,
};

use blogmark_markdown::{MarkdownProcessor, RenderOutput};
use blogmark_ogp::{LinkCardResolver, OgpService};
use log::{debug, info};
use serde_json::json;

use crate::{
  cli::RenderFormat,
  cms::BlogEntry,
  config::Config,
  error::Result,
};

/// Read the Markdown to render: the file itself, or the `content` of a CMS
/// entry record when `entry` is set.
///
/// Plain Markdown files are returned as raw bytes; text that is not valid
/// UTF-8 is left for the renderer's fallback.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the entry is malformed.
pub fn load_markdown(input: &Path, entry: bool) -> Result<Vec<u8>> {
  if entry {
    let entry = BlogEntry::from_file(input)?;
    debug!("Rendering entry '{}' ({})", entry.title, entry.slug);
    Ok(entry.content.into_bytes())
  } else {
    Ok(fs::read(input)?)
  }
}

/// Replace the link-card placeholders of `output` with finished cards,
/// fetching through an in-process OGP service.
///
/// # Errors
///
/// Returns an error if the HTTP client or the async runtime cannot be built.
/// Failed lookups are not errors; they render as plain links.
pub fn prerender_cards(
  config: &Config,
  output: &mut RenderOutput,
) -> Result<()> {
  let service = Arc::new(OgpService::with_http(config.ogp_config())?);
  let cache = Arc::clone(service.cache());
  let resolver = LinkCardResolver::new(service, cache);

  let runtime = tokio::runtime::Runtime::new()?;
  output.html = runtime.block_on(resolver.prerender(&output.html));
  Ok(())
}

/// Serialize a render in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_output(
  output: &RenderOutput,
  format: RenderFormat,
) -> Result<String> {
  match format {
    RenderFormat::Html => Ok(output.html.clone()),
    RenderFormat::Json => {
      let mut json = serde_json::to_string_pretty(&json!({
        "html": output.html,
        "headings": output.headings,
      }))?;
      json.push('\n');
      Ok(json)
    },
  }
}

/// Render `input` and write the result to `output`, or standard output.
///
/// # Errors
///
/// Returns an error if reading, prerendering or writing fails. Markdown that
/// cannot be rendered, including text that is not UTF-8, is not an error; it
/// is shown as escaped text.
pub fn run(
  config: &Config,
  input: &Path,
  entry: bool,
  format: RenderFormat,
  output: Option<&Path>,
  prerender: bool,
) -> Result<()> {
  let markdown = load_markdown(input, entry)?;
  let processor = MarkdownProcessor::new(config.markdown_options());
  let mut rendered = processor.render_bytes(&markdown);
  debug!(
    "Rendered {} with {} heading(s)",
    input.display(),
    rendered.headings.len()
  );

  if prerender {
    prerender_cards(config, &mut rendered)?;
  }

  let content = format_output(&rendered, format)?;
  match output {
    Some(path) => {
      fs::write(path, content)?;
      info!("Wrote {}", path.display());
    },
    None => io::stdout().lock().write_all(content.as_bytes())?,
  }
  Ok(())
}
