//! Consuming the OGP service: link-card hydration.
//!
//! [`LinkCardResolver`] turns `data-link-card` placeholders into card markup.
//! It consults a local [`OgpCache`] first and goes through an [`OgpLookup`]
//! otherwise: either the HTTP endpoint ([`EndpointClient`]) or an in-process
//! [`OgpService`]. Lookups can be cancelled; a cancelled card is simply left
//! alone, it is neither an error nor a fallback.
use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use blogmark_markdown::{link_card_placeholders, utils::entities::escape_html};
use dashmap::DashSet;
use futures::future::{AbortRegistration, Abortable, join_all};
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::{
  cache::OgpCache,
  error::{FetchError, OgpResult},
  extract::OgpData,
  service::OgpService,
};

/// Something that can look up preview data for a URL.
#[async_trait]
pub trait OgpLookup: Send + Sync {
  async fn lookup(&self, url: &str) -> OgpResult<OgpData>;
}

#[async_trait]
impl OgpLookup for OgpService {
  async fn lookup(&self, url: &str) -> OgpResult<OgpData> {
    Self::lookup(self, url).await
  }
}

/// Overall request timeout of [`EndpointClient::new`]. Longer than the
/// service's own fetch timeout so upstream failures surface as JSON errors.
pub const ENDPOINT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client of a remote `GET /api/ogp` endpoint.
#[derive(Debug, Clone)]
pub struct EndpointClient {
  client:   Client,
  endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
  error: String,
}

impl EndpointClient {
  /// `endpoint` is the full URL of the lookup route, e.g.
  /// `https://blog.example.com/api/ogp`. Requests give up after
  /// [`ENDPOINT_TIMEOUT`].
  ///
  /// # Errors
  ///
  /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
  pub fn new(endpoint: Url) -> Result<Self, FetchError> {
    Self::with_timeout(endpoint, ENDPOINT_TIMEOUT)
  }

  /// Like [`Self::new`] with a custom request timeout.
  ///
  /// # Errors
  ///
  /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
  pub fn with_timeout(
    endpoint: Url,
    timeout: Duration,
  ) -> Result<Self, FetchError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self::with_client(client, endpoint))
  }

  #[must_use]
  pub const fn with_client(client: Client, endpoint: Url) -> Self {
    Self { client, endpoint }
  }

  /// Request URL for looking up `target`.
  #[must_use]
  pub fn request_url(&self, target: &str) -> Url {
    let mut url = self.endpoint.clone();
    url.query_pairs_mut().clear().append_pair("url", target);
    url
  }
}

#[async_trait]
impl OgpLookup for EndpointClient {
  async fn lookup(&self, url: &str) -> OgpResult<OgpData> {
    let response = self
      .client
      .get(self.request_url(url))
      .send()
      .await
      .map_err(FetchError::from)?;

    let status = response.status();
    if status.is_success() {
      return Ok(response.json().await.map_err(FetchError::from)?);
    }

    let message = response
      .json::<ErrorBody>()
      .await
      .map(|body| body.error)
      .unwrap_or_default();
    Err(
      FetchError::Endpoint {
        status: status.as_u16(),
        message,
      }
      .into(),
    )
  }
}

/// Result of resolving one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardState {
  Ready(OgpData),
  /// The lookup failed; show a plain link instead.
  Fallback { url: String },
  /// The lookup was aborted by its owner. Nothing is rendered.
  Cancelled,
}

impl CardState {
  /// Markup replacing the placeholder, or `None` for a cancelled card.
  #[must_use]
  pub fn to_html(&self) -> Option<String> {
    match self {
      Self::Ready(data) => Some(render_card(data)),
      Self::Fallback { url } => Some(render_fallback_link(url)),
      Self::Cancelled => None,
    }
  }
}

/// Cache-first resolver for link cards.
#[derive(Clone)]
pub struct LinkCardResolver {
  lookup: Arc<dyn OgpLookup>,
  cache:  Arc<OgpCache>,
}

impl std::fmt::Debug for LinkCardResolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("LinkCardResolver")
      .field("cached", &self.cache.len())
      .finish_non_exhaustive()
  }
}

impl LinkCardResolver {
  #[must_use]
  pub fn new(lookup: Arc<dyn OgpLookup>, cache: Arc<OgpCache>) -> Self {
    Self { lookup, cache }
  }

  #[must_use]
  pub fn cache(&self) -> &Arc<OgpCache> {
    &self.cache
  }

  /// Cached data for `url`. Never touches the network.
  #[must_use]
  pub fn cached(&self, url: &str) -> Option<OgpData> {
    self.cache.get(url)
  }

  /// Resolve `url`, from the cache if possible. Successful lookups are
  /// cached, failures are not.
  pub async fn resolve(&self, url: &str) -> CardState {
    if let Some(data) = self.cached(url) {
      return CardState::Ready(data);
    }

    match self.lookup.lookup(url).await {
      Ok(data) => {
        self.cache.set(url, data.clone());
        CardState::Ready(data)
      },
      Err(e) => {
        warn!("Link card for {url} unavailable: {e}");
        CardState::Fallback {
          url: url.to_string(),
        }
      },
    }
  }

  /// Like [`resolve`](Self::resolve), but stops when the matching
  /// [`AbortHandle`](futures::future::AbortHandle) fires.
  pub async fn resolve_cancellable(
    &self,
    url: &str,
    registration: AbortRegistration,
  ) -> CardState {
    if let Some(data) = self.cached(url) {
      return CardState::Ready(data);
    }

    Abortable::new(self.resolve(url), registration)
      .await
      .unwrap_or_else(|_| {
        debug!("Link card lookup for {url} cancelled");
        CardState::Cancelled
      })
  }

  /// Replace every link-card placeholder of `html` with its card.
  ///
  /// Distinct URLs are resolved concurrently; cards are placed by the
  /// position of their placeholder, not by completion order.
  pub async fn prerender(&self, html: &str) -> String {
    let placeholders = link_card_placeholders(html);
    if placeholders.is_empty() {
      return html.to_string();
    }

    let mut urls: Vec<&str> = Vec::new();
    for placeholder in &placeholders {
      if !urls.contains(&placeholder.url.as_str()) {
        urls.push(&placeholder.url);
      }
    }
    let states = join_all(urls.iter().map(|url| self.resolve(url))).await;
    let resolved: HashMap<&str, CardState> = urls.into_iter().zip(states).collect();

    let mut output = String::with_capacity(html.len());
    let mut cursor = 0;
    for placeholder in &placeholders {
      output.push_str(&html[cursor..placeholder.range.start]);
      let card = resolved
        .get(placeholder.url.as_str())
        .and_then(CardState::to_html);
      match card {
        Some(card) => output.push_str(&card),
        None => output.push_str(&html[placeholder.range.clone()]),
      }
      cursor = placeholder.range.end;
    }
    output.push_str(&html[cursor..]);

    debug!("Prerendered {} link card(s)", placeholders.len());
    output
  }
}

/// Tracks which placeholders already have a card mounted.
///
/// Visibility observers may report the same placeholder more than once; only
/// the first report mounts it.
#[derive(Debug, Default)]
pub struct MountRegistry {
  mounted: DashSet<usize>,
}

impl MountRegistry {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Claim placeholder `index`. Returns `false` if it was already mounted.
  pub fn try_mount(&self, index: usize) -> bool {
    self.mounted.insert(index)
  }

  #[must_use]
  pub fn is_mounted(&self, index: usize) -> bool {
    self.mounted.contains(&index)
  }

  /// Release placeholder `index`, e.g. when its card is torn down.
  pub fn unmount(&self, index: usize) {
    self.mounted.remove(&index);
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.mounted.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.mounted.is_empty()
  }
}

fn is_web_url(url: &str) -> bool {
  Url::parse(url).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Card markup for resolved data.
#[must_use]
pub fn render_card(data: &OgpData) -> String {
  let mut body = format!(
    r#"<span class="link-card-title">{}</span>"#,
    escape_html(&data.title)
  );
  if !data.description.is_empty() {
    body.push_str(&format!(
      r#"<span class="link-card-description">{}</span>"#,
      escape_html(&data.description)
    ));
  }
  if let Some(site_name) = &data.site_name {
    body.push_str(&format!(
      r#"<span class="link-card-site">{}</span>"#,
      escape_html(site_name)
    ));
  }

  let image = data
    .image
    .as_deref()
    .filter(|image| is_web_url(image))
    .map(|image| {
      format!(
        r#"<img alt="" class="link-card-image" loading="lazy" src="{}">"#,
        escape_html(image)
      )
    })
    .unwrap_or_default();

  format!(
    r#"<a class="link-card" href="{}" rel="noopener noreferrer" target="_blank"><span class="link-card-body">{body}</span>{image}</a>"#,
    escape_html(&data.url)
  )
}

/// Plain link shown when a card cannot be resolved. Non-web URLs are shown
/// as text only.
#[must_use]
pub fn render_fallback_link(url: &str) -> String {
  let text = escape_html(url);
  if is_web_url(url) {
    format!(
      r#"<a class="link-card-fallback" href="{text}" rel="noopener noreferrer" target="_blank">{text}</a>"#
    )
  } else {
    format!(r#"<span class="link-card-fallback">{text}</span>"#)
  }
}
