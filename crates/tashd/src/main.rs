//! Tash Daemon - welfare case assistant daemon
//!
//! Matches narratives to request templates and tracks case checklists.

use anyhow::Result;
use std::sync::Arc;
use tash_common::catalog::default_catalog;
use tash_common::store::DocStore;
use tashd::config::Config;
use tashd::gemini::GeminiClient;
use tashd::server::{self, AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Tash Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();

    let store = DocStore::open(&config.daemon.data_dir)?;
    let seeded = store.seed_templates(&default_catalog())?;
    if seeded > 0 {
        info!("Seeded {} built-in templates", seeded);
    }

    let provider = match GeminiClient::from_config(&config.llm) {
        Ok(client) => {
            info!("Provider ready: {}", client.model());
            Some(Arc::new(client) as Arc<dyn tash_common::matcher::InferenceProvider>)
        }
        Err(e) => {
            // The desk still works without a model: consult returns no
            // suggestions and the caseworker selects manually.
            warn!("Provider disabled: {}", e);
            None
        }
    };

    let state = AppState::new(store, provider, config.daemon.routing_policy);
    server::run(state, &config.daemon.bind_addr).await
}
