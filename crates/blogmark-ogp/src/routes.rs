//! HTTP surface of the OGP service.
//!
//! - `GET /api/ogp?url=<https URL>` - preview data as JSON
//! - `GET /health` - liveness check
use std::sync::Arc;

use axum::{
  Json,
  Router,
  extract::{Query, State, rejection::QueryRejection},
  http::{HeaderMap, HeaderValue, Method, header},
  response::{IntoResponse, Response},
  routing::get,
};
use log::warn;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::{
  error::{OgpError, OgpResult},
  rate_limit::client_id,
  service::OgpService,
};

/// Path of the lookup endpoint.
pub const OGP_ROUTE: &str = "/api/ogp";

/// `Cache-Control` of successful lookups.
pub const SUCCESS_CACHE_CONTROL: &str = "public, max-age=86400";

/// Query string of `GET /api/ogp`.
#[derive(Debug, Default, Deserialize)]
pub struct OgpQuery {
  pub url: Option<String>,
}

/// Build the service router. `allowed_origins` empty means any origin.
pub fn router(service: Arc<OgpService>, allowed_origins: &[String]) -> Router {
  Router::new()
    .route(OGP_ROUTE, get(ogp_handler))
    .route("/health", get(health_check))
    .layer(cors_layer(allowed_origins))
    .with_state(service)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
  let layer = CorsLayer::new()
    .allow_methods([Method::GET])
    .allow_headers(Any);

  if allowed_origins.is_empty() {
    return layer.allow_origin(Any);
  }

  let origins: Vec<HeaderValue> = allowed_origins
    .iter()
    .filter_map(|origin| {
      HeaderValue::from_str(origin)
        .inspect_err(|e| warn!("Ignoring allowed origin '{origin}': {e}"))
        .ok()
    })
    .collect();
  layer.allow_origin(AllowOrigin::list(origins))
}

/// `GET /api/ogp`.
///
/// Checks run in a fixed order: rate limit, query parsing, presence of
/// `url`, target validation, then the lookup itself. A malformed query still
/// counts against the rate limit.
///
/// # Errors
///
/// Every failure is an [`OgpError`], rendered as a JSON error response.
pub async fn ogp_handler(
  State(service): State<Arc<OgpService>>,
  headers: HeaderMap,
  query: Result<Query<OgpQuery>, QueryRejection>,
) -> OgpResult<Response> {
  service.check_rate(&client_id(&headers))?;

  let Query(query) = query?;
  let url = query
    .url
    .as_deref()
    .filter(|url| !url.is_empty())
    .ok_or(OgpError::MissingUrl)?;

  let data = service.lookup(url).await?;
  Ok(
    (
      [(
        header::CACHE_CONTROL,
        HeaderValue::from_static(SUCCESS_CACHE_CONTROL),
      )],
      Json(data),
    )
      .into_response(),
  )
}

/// `GET /health`.
pub async fn health_check() -> Json<Value> {
  Json(json!({ "status": "ok" }))
}
