use axum::Router;
use tokio::net::TcpListener;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

use crate::infrastructure::settings::Settings;
use crate::presentation::AppState;
use crate::presentation::http::middleware::trace::apply_trace;
use crate::presentation::http::routes;

#[derive(Debug, Clone, Copy)]
pub(crate) struct HttpLimits {
    pub(crate) body_limit_bytes: usize,
    pub(crate) concurrency_limit: usize,
}

impl From<&Settings> for HttpLimits {
    fn from(settings: &Settings) -> Self {
        Self {
            body_limit_bytes: settings.http_request_body_limit_bytes,
            concurrency_limit: settings.http_concurrency_limit,
        }
    }
}

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state, HttpLimits::from(settings));

    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

/// The concurrency limit is global: every route draws from one pool of
/// permits, and requests over the limit wait for a free one.
pub(crate) fn build_router(state: AppState, limits: HttpLimits) -> Router {
    let app = routes::router(state)
        .layer(RequestBodyLimitLayer::new(limits.body_limit_bytes))
        .layer(GlobalConcurrencyLimitLayer::new(limits.concurrency_limit));
    apply_trace(app)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
