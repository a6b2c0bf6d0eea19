//! Fetching pages for metadata extraction.
//!
//! [`PageSource`] is the seam between the service and the network. The real
//! implementation, [`HttpPageSource`], never trusts an upstream response
//! partially: a page that is not HTML, answers with an error status, or is
//! larger than the byte cap is a failure as a whole.
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{
  Client,
  header::{ACCEPT, CONTENT_TYPE, HeaderValue},
  redirect::Policy,
};
use url::Url;

use crate::{config::OgpConfig, error::FetchError, validate::validate_target};

/// Content types accepted from upstream, compared without parameters.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Redirects followed before giving up.
const MAX_REDIRECTS: usize = 5;

/// Source of page HTML.
#[async_trait]
pub trait PageSource: Send + Sync {
  /// Fetch the HTML of `url`.
  async fn fetch_page(&self, url: &Url) -> Result<String, FetchError>;
}

/// [`PageSource`] backed by an HTTP client.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
  client:         Client,
  timeout:        Duration,
  max_body_bytes: usize,
}

impl HttpPageSource {
  /// Build a fetcher from the service configuration.
  ///
  /// Redirects are followed only while every hop would itself pass target
  /// validation, so a public page cannot bounce the fetcher into a private
  /// network.
  ///
  /// # Errors
  ///
  /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
  pub fn new(config: &OgpConfig) -> Result<Self, FetchError> {
    let client = Client::builder()
      .user_agent(config.user_agent.as_str())
      .redirect(Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
          attempt.error("too many redirects")
        } else if validate_target(attempt.url().as_str()).is_err() {
          attempt.stop()
        } else {
          attempt.follow()
        }
      }))
      .build()?;

    Ok(Self {
      client,
      timeout: config.timeout,
      max_body_bytes: config.max_body_bytes,
    })
  }

  async fn download(&self, url: &Url) -> Result<String, FetchError> {
    let mut response = self
      .client
      .get(url.clone())
      .header(ACCEPT, "text/html,application/xhtml+xml")
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status(status.as_u16()));
    }

    check_content_type(response.headers().get(CONTENT_TYPE))?;

    let limit = self.max_body_bytes;
    if response
      .content_length()
      .is_some_and(|length| length > u64::try_from(limit).unwrap_or(u64::MAX))
    {
      return Err(FetchError::TooLarge { limit });
    }

    // Content-Length may be absent or wrong, so the cap is enforced while
    // reading as well.
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
      if body.len() + chunk.len() > limit {
        return Err(FetchError::TooLarge { limit });
      }
      body.extend_from_slice(&chunk);
    }

    trace!("Fetched {} bytes from {url}", body.len());
    Ok(String::from_utf8_lossy(&body).into_owned())
  }
}

#[async_trait]
impl PageSource for HttpPageSource {
  async fn fetch_page(&self, url: &Url) -> Result<String, FetchError> {
    debug!("Fetching {url}");
    // Dropping the download future on expiry aborts the request.
    tokio::time::timeout(self.timeout, self.download(url))
      .await
      .unwrap_or_else(|_| Err(FetchError::Timeout(self.timeout)))
  }
}

/// Accept only HTML content types. A missing header is a failure.
///
/// # Errors
///
/// Returns [`FetchError::MissingContentType`] or [`FetchError::ContentType`].
pub fn check_content_type(value: Option<&HeaderValue>) -> Result<(), FetchError> {
  let value = value.ok_or(FetchError::MissingContentType)?;
  let value = String::from_utf8_lossy(value.as_bytes());
  let mime = value
    .split(';')
    .next()
    .unwrap_or_default()
    .trim()
    .to_ascii_lowercase();

  if ALLOWED_CONTENT_TYPES.contains(&mime.as_str()) {
    Ok(())
  } else {
    Err(FetchError::ContentType(value.into_owned()))
  }
}
