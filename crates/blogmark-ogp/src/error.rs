//! Error types of the OGP service and their HTTP mapping.
use std::time::Duration;

use axum::{
  Json,
  extract::rejection::QueryRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use log::{debug, warn};
use serde_json::json;
use thiserror::Error;

use crate::validate::UrlRejection;

/// Result type for OGP lookups.
pub type OgpResult<T> = Result<T, OgpError>;

/// Why fetching a page failed.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("request timed out after {0:?}")]
  Timeout(Duration),

  #[error("upstream responded with status {0}")]
  Status(u16),

  #[error("content type '{0}' is not HTML")]
  ContentType(String),

  #[error("response has no content type")]
  MissingContentType,

  #[error("body is larger than {limit} bytes")]
  TooLarge { limit: usize },

  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("endpoint answered {status}: {message}")]
  Endpoint { status: u16, message: String },
}

/// Errors surfaced by the `/api/ogp` endpoint.
///
/// Each variant maps to a fixed public message. Causes are logged, never sent
/// to the client.
#[derive(Debug, Error)]
pub enum OgpError {
  #[error("rate limit exceeded, retry after {retry_after}s")]
  RateLimited { retry_after: u64 },

  #[error("URL parameter is required")]
  MissingUrl,

  #[error("invalid URL: {0}")]
  InvalidUrl(#[from] UrlRejection),

  #[error("malformed query string: {0}")]
  MalformedQuery(#[from] QueryRejection),

  #[error("failed to fetch OGP data: {0}")]
  Fetch(#[from] FetchError),
}

impl OgpError {
  /// Message placed in the JSON error body.
  #[must_use]
  pub const fn public_message(&self) -> &'static str {
    match self {
      Self::RateLimited { .. } => {
        "Rate limit exceeded. Please try again later."
      },
      Self::MissingUrl => "URL parameter is required",
      Self::InvalidUrl(_) | Self::MalformedQuery(_) => "Invalid URL",
      Self::Fetch(_) => "Failed to fetch OGP data",
    }
  }

  #[must_use]
  pub const fn status(&self) -> StatusCode {
    match self {
      Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
      Self::MissingUrl | Self::InvalidUrl(_) | Self::MalformedQuery(_) => {
        StatusCode::BAD_REQUEST
      },
      Self::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for OgpError {
  fn into_response(self) -> Response {
    match &self {
      Self::Fetch(e) => warn!("OGP fetch failed: {e}"),
      Self::InvalidUrl(e) => debug!("Rejected OGP target: {e}"),
      Self::MalformedQuery(e) => debug!("Rejected OGP query: {e}"),
      Self::RateLimited { retry_after } => {
        debug!("Rate limited OGP request, retry after {retry_after}s");
      },
      Self::MissingUrl => {},
    }

    let body = Json(json!({ "error": self.public_message() }));
    let mut response = (self.status(), body).into_response();
    if let Self::RateLimited { retry_after } = self {
      response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    }
    response
  }
}
