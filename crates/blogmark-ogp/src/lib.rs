//! Open Graph metadata service behind blogmark's link cards.
//!
//! The Markdown pipeline turns bare-URL paragraphs into
//! `<div data-link-card="...">` placeholders. This crate resolves them:
//!
//! - [`validate`] rejects non-HTTPS targets and private or loopback hosts
//! - [`fetch`] downloads the page under a timeout, content-type check and
//!   byte cap
//! - [`extract`] pulls `og:*` metadata out of the HTML with tolerant patterns
//! - [`cache`] and [`rate_limit`] hold the only shared state of the service
//! - [`service`] ties those together, and [`routes`] exposes it as
//!   `GET /api/ogp`
//! - [`client`] consumes the endpoint (or the service in-process) to turn
//!   placeholders into cards
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod rate_limit;
pub mod routes;
pub mod service;
pub mod validate;

pub use cache::OgpCache;
pub use client::{
  CardState,
  ENDPOINT_TIMEOUT,
  EndpointClient,
  LinkCardResolver,
  MountRegistry,
  OgpLookup,
};
pub use config::OgpConfig;
pub use error::{FetchError, OgpError, OgpResult};
pub use extract::{OgpData, extract_ogp};
pub use fetch::{HttpPageSource, PageSource};
pub use rate_limit::{RateLimitDecision, RateLimiter, client_id};
pub use routes::router;
pub use service::OgpService;
pub use validate::{UrlRejection, validate_target};
