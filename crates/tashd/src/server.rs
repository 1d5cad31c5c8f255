//! HTTP server for tashd

use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tash_common::matcher::InferenceProvider;
use tash_common::materializer::RoutingPolicy;
use tash_common::rules::RuleIndex;
use tash_common::store::DocStore;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes;

/// Application state shared across handlers
pub struct AppState {
    pub store: DocStore,
    /// Absent when no credential is configured; consult degrades to an empty
    /// suggestion list instead of failing.
    pub provider: Option<Arc<dyn InferenceProvider>>,
    pub rules: RuleIndex,
    pub routing_policy: RoutingPolicy,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        store: DocStore,
        provider: Option<Arc<dyn InferenceProvider>>,
        routing_policy: RoutingPolicy,
    ) -> Self {
        Self {
            store,
            provider,
            rules: RuleIndex::builtin(),
            routing_policy,
            start_time: Instant::now(),
        }
    }
}

/// Run the HTTP server
pub async fn run(state: AppState, bind_addr: &str) -> Result<()> {
    let state = Arc::new(state);

    let app = Router::new()
        .merge(routes::health_routes())
        .merge(routes::consult_routes())
        .merge(routes::template_routes())
        .merge(routes::case_routes())
        .merge(routes::soldier_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("  Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
