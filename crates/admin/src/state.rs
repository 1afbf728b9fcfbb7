//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::slug::SlugClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    slugs: SlugClient,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let slugs = SlugClient::new(config.backend_base_url.clone());
        Self {
            inner: Arc::new(AppStateInner { config, slugs }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn slugs(&self) -> &SlugClient {
        &self.inner.slugs
    }
}
