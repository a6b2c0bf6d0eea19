//! Runtime settings of the OGP service.
use std::time::Duration;

/// Default time budget for one upstream fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default cap on the size of a fetched page.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Default fixed-window length of the rate limiter.
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// Default number of requests a client may make per window.
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 30;

/// `User-Agent` sent with upstream requests unless configured otherwise.
#[must_use]
pub fn default_user_agent() -> String {
  format!(
    "blogmark-ogp/{} (+link preview fetcher)",
    env!("CARGO_PKG_VERSION")
  )
}

/// Settings shared by the fetcher and the rate limiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OgpConfig {
  /// Upper bound for connect, headers and body of one fetch.
  pub timeout:                 Duration,
  /// Pages larger than this are rejected, never truncated.
  pub max_body_bytes:          usize,
  pub user_agent:              String,
  pub rate_limit_window:       Duration,
  pub rate_limit_max_requests: u32,
}

impl Default for OgpConfig {
  fn default() -> Self {
    Self {
      timeout:                 DEFAULT_TIMEOUT,
      max_body_bytes:          DEFAULT_MAX_BODY_BYTES,
      user_agent:              default_user_agent(),
      rate_limit_window:       DEFAULT_RATE_LIMIT_WINDOW,
      rate_limit_max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
    }
  }
}
