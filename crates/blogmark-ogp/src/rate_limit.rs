//! Fixed-window rate limiting per client.
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use dashmap::DashMap;
use log::debug;

/// Identifier used when a request carries no client address headers.
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Copy)]
struct Window {
  count:    u32,
  reset_at: Instant,
}

/// Outcome of [`RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
  Allow,
  Deny {
    /// Time until the client's window resets.
    retry_after: Duration,
  },
}

impl RateLimitDecision {
  /// `Retry-After` value in whole seconds, rounded up and at least 1.
  #[must_use]
  pub fn retry_after_secs(&self) -> Option<u64> {
    match self {
      Self::Allow => None,
      Self::Deny { retry_after } => {
        let secs =
          retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
        Some(secs.max(1))
      },
    }
  }
}

/// Counts requests per client in fixed windows.
///
/// A client's window starts with its first request and lasts `window`; within
/// it at most `max_requests` are allowed.
#[derive(Debug)]
pub struct RateLimiter {
  window:       Duration,
  max_requests: u32,
  windows:      DashMap<String, Window>,
}

impl RateLimiter {
  #[must_use]
  pub fn new(window: Duration, max_requests: u32) -> Self {
    Self {
      window,
      max_requests,
      windows: DashMap::new(),
    }
  }

  /// Count a request from `client` at `now`.
  pub fn check(&self, client: &str, now: Instant) -> RateLimitDecision {
    let mut window = self
      .windows
      .entry(client.to_string())
      .or_insert_with(|| Window {
        count:    0,
        reset_at: now + self.window,
      });

    if now > window.reset_at {
      *window = Window {
        count:    0,
        reset_at: now + self.window,
      };
    }

    if window.count >= self.max_requests {
      let retry_after = window.reset_at.saturating_duration_since(now);
      debug!("Client {client} is over its limit for {retry_after:?}");
      return RateLimitDecision::Deny { retry_after };
    }

    window.count += 1;
    RateLimitDecision::Allow
  }

  /// Drop windows that have expired by `now`. Returns how many were removed.
  pub fn prune(&self, now: Instant) -> usize {
    let before = self.windows.len();
    self.windows.retain(|_, window| now <= window.reset_at);
    before - self.windows.len()
  }

  /// Number of clients with a live window.
  #[must_use]
  pub fn tracked_clients(&self) -> usize {
    self.windows.len()
  }
}

/// Identify the client of a request from forwarding headers.
///
/// Uses the first address of `X-Forwarded-For`, then `X-Real-IP`, then
/// [`UNKNOWN_CLIENT`].
#[must_use]
pub fn client_id(headers: &HeaderMap) -> String {
  let header = |name: &str| {
    headers
      .get(name)
      .and_then(|value| value.to_str().ok())
      .map(|value| value.split(',').next().unwrap_or_default().trim())
      .filter(|value| !value.is_empty())
      .map(str::to_string)
  };

  header("x-forwarded-for")
    .or_else(|| header("x-real-ip"))
    .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
