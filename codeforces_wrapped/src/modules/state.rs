use crate::modules::config::Config;
use anyhow::{Context, Result};
use codeforces_wrapped_libs::{
    codeforces::{CodeforcesApi, CodeforcesClient, DatasetFetcher},
    ResponseCache, WrappedGenerator,
};
use std::sync::Arc;

pub struct AppState {
    pub generator: WrappedGenerator,
}

impl AppState {
    pub fn new(api: Arc<dyn CodeforcesApi>, reference_handle: &str, workers: usize) -> Arc<Self> {
        let fetcher = DatasetFetcher::new(api, reference_handle, workers);
        Arc::new(Self {
            generator: WrappedGenerator::new(fetcher),
        })
    }

    pub fn from_config(config: &Config) -> Result<Arc<Self>> {
        let cache = Arc::new(ResponseCache::new(config.cache_ttl, config.cache_capacity));
        let client = CodeforcesClient::new(&config.api_url, cache).with_context(|| {
            let message = format!(
                "couldn't create Codeforces API client. check the value of CODEFORCES_API_URL `{}`",
                config.api_url
            );
            tracing::error!(message);
            message
        })?;

        tracing::info!(
            "Codeforces API at {} with reference user {}",
            config.api_url,
            config.reference_handle
        );
        Ok(Self::new(
            Arc::new(client),
            &config.reference_handle,
            config.fetch_workers,
        ))
    }
}
