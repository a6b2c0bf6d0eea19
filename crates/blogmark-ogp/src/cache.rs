//! In-memory OGP cache.
use dashmap::DashMap;
use log::trace;

use crate::extract::OgpData;

/// URL to metadata map shared by all requests of a process.
///
/// Keys are the request URL strings exactly as given. Entries live until
/// [`clear`](Self::clear); there is no expiry or size bound.
#[derive(Debug, Default)]
pub struct OgpCache {
  entries: DashMap<String, OgpData>,
}

impl OgpCache {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn get(&self, url: &str) -> Option<OgpData> {
    let hit = self.entries.get(url).map(|entry| entry.value().clone());
    trace!(
      "OGP cache {} for {url}",
      if hit.is_some() { "hit" } else { "miss" }
    );
    hit
  }

  /// Store `data` for `url`, replacing any previous entry.
  pub fn set(&self, url: impl Into<String>, data: OgpData) {
    self.entries.insert(url.into(), data);
  }

  pub fn clear(&self) {
    self.entries.clear();
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
