//! `tango cache`

use std::sync::Arc;

use anyhow::{Context, Result};

use tango::cache::UpstashStore;
use tango::{Config, DetailResolver, WordCatalog};

use super::CacheAction;

pub(crate) async fn cmd_cache(config: &Config, action: CacheAction) -> Result<()> {
    match action {
        CacheAction::Clear { slug } => {
            if UpstashStore::from_config(&config.cache)?.is_none() {
                println!("Upstash is not configured; only the server's in-process cache holds entries.");
                println!("Use DELETE /api/words/{}/cache against a running server instead.", slug);
                return Ok(());
            }
            let resolver = DetailResolver::from_config(config, Arc::new(WordCatalog::builtin()))
                .context("Failed to initialize resolver")?;
            if resolver.invalidate(&slug).await? {
                println!("Cleared cached detail for '{}'.", slug);
            } else {
                println!("Unknown word '{}'.", slug);
            }
        }
    }
    Ok(())
}
