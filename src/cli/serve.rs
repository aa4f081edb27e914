//! `tango serve`

use anyhow::{Context, Result};
use tracing::info;

use tango::api::{start_server, AppState};
use tango::Config;

pub(crate) async fn cmd_serve(mut config: Config, bind: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = AppState::from_config(&config).context("Failed to initialize services")?;
    info!(
        words = state.resolver.catalog().len(),
        generation = state.resolver.has_generator(),
        durable_cache = state.resolver.store().is_configured(),
        tts = state.tts.is_some(),
        "Starting tango"
    );

    start_server(&config.server, state)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
