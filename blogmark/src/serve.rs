//! The `serve` subcommand: the OGP endpoint behind link-card hydration.
use std::{net::SocketAddr, sync::Arc, time::Duration};

use blogmark_ogp::{OgpService, router, routes::OGP_ROUTE};
use log::{info, warn};
use tokio::net::TcpListener;

use crate::{config::Config, error::Result};

/// Run the server until interrupted.
///
/// # Errors
///
/// Returns an error if the runtime or HTTP client cannot be built, or if the
/// address cannot be bound.
pub fn run(config: &Config, bind: Option<SocketAddr>) -> Result<()> {
  let runtime = tokio::runtime::Runtime::new()?;
  runtime.block_on(serve(config, bind.unwrap_or(config.server.bind)))
}

async fn serve(config: &Config, addr: SocketAddr) -> Result<()> {
  let ogp_config = config.ogp_config();
  let prune_every = ogp_config.rate_limit_window.max(Duration::from_secs(1));

  let service = Arc::new(OgpService::with_http(ogp_config)?);
  let pruning = service.spawn_limiter_pruning(prune_every);
  let app = router(service, &config.server.allowed_origins);

  let listener = TcpListener::bind(addr).await?;
  info!(
    "Serving link-card metadata on http://{}{OGP_ROUTE}",
    listener.local_addr()?
  );
  if config.server.allowed_origins.is_empty() {
    info!("CORS: any origin allowed");
  }

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  pruning.abort();
  info!("Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!("Failed to listen for shutdown signal: {e}");
    std::future::pending::<()>().await;
  }
}
