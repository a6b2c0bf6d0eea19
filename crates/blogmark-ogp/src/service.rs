//! The OGP lookup service.
use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use log::{debug, trace};
use tokio::task::JoinHandle;

use crate::{
  cache::OgpCache,
  config::OgpConfig,
  error::{FetchError, OgpError, OgpResult},
  extract::{OgpData, extract_ogp},
  fetch::{HttpPageSource, PageSource},
  rate_limit::RateLimiter,
  validate::validate_target,
};

/// Everything a request handler needs, constructed once per process and
/// shared through axum state.
pub struct OgpService {
  config:      OgpConfig,
  page_source: Arc<dyn PageSource>,
  cache:       Arc<OgpCache>,
  limiter:     RateLimiter,
}

impl std::fmt::Debug for OgpService {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OgpService")
      .field("config", &self.config)
      .field("cached", &self.cache.len())
      .field("tracked_clients", &self.limiter.tracked_clients())
      .finish_non_exhaustive()
  }
}

impl OgpService {
  /// Create a service around `page_source` with an empty cache.
  #[must_use]
  pub fn new(config: OgpConfig, page_source: Arc<dyn PageSource>) -> Self {
    let limiter = RateLimiter::new(
      config.rate_limit_window,
      config.rate_limit_max_requests,
    );
    Self {
      config,
      page_source,
      cache: Arc::new(OgpCache::new()),
      limiter,
    }
  }

  /// Create a service that fetches over HTTP.
  ///
  /// # Errors
  ///
  /// Returns an error if the HTTP client cannot be built.
  pub fn with_http(config: OgpConfig) -> Result<Self, FetchError> {
    let source = HttpPageSource::new(&config)?;
    Ok(Self::new(config, Arc::new(source)))
  }

  /// Use `cache` instead of the service's own.
  #[must_use]
  pub fn with_cache(mut self, cache: Arc<OgpCache>) -> Self {
    self.cache = cache;
    self
  }

  #[must_use]
  pub const fn config(&self) -> &OgpConfig {
    &self.config
  }

  #[must_use]
  pub fn cache(&self) -> &Arc<OgpCache> {
    &self.cache
  }

  #[must_use]
  pub const fn limiter(&self) -> &RateLimiter {
    &self.limiter
  }

  /// Count one request from `client` against the rate limit.
  ///
  /// # Errors
  ///
  /// Returns [`OgpError::RateLimited`] once the client is over its cap.
  pub fn check_rate(&self, client: &str) -> OgpResult<()> {
    let decision = self.limiter.check(client, Instant::now());
    match decision.retry_after_secs() {
      None => Ok(()),
      Some(retry_after) => Err(OgpError::RateLimited { retry_after }),
    }
  }

  /// Look up preview data for `candidate`.
  ///
  /// The target is validated, then served from the cache or fetched and
  /// extracted. Only successful lookups are cached.
  ///
  /// # Errors
  ///
  /// Returns [`OgpError::InvalidUrl`] for rejected targets and
  /// [`OgpError::Fetch`] if the page cannot be fetched.
  pub async fn lookup(&self, candidate: &str) -> OgpResult<OgpData> {
    let url = validate_target(candidate)?;

    if let Some(hit) = self.cache.get(candidate) {
      debug!("Serving OGP data for {candidate} from cache");
      return Ok(hit);
    }

    let html = self.page_source.fetch_page(&url).await?;
    let data = extract_ogp(&html, candidate);
    trace!("Extracted OGP data for {candidate}: {data:?}");

    self.cache.set(candidate, data.clone());
    Ok(data)
  }

  /// Periodically drop expired rate-limit windows.
  pub fn spawn_limiter_pruning(
    self: &Arc<Self>,
    every: Duration,
  ) -> JoinHandle<()> {
    let service = Arc::clone(self);
    tokio::spawn(async move {
      let mut interval = tokio::time::interval(every);
      loop {
        interval.tick().await;
        let pruned = service.limiter.prune(Instant::now());
        if pruned > 0 {
          debug!("Pruned {pruned} expired rate-limit window(s)");
        }
      }
    })
  }
}
