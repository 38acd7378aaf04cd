//! Application state for the Actix-web server
//!
//! `AppState` is wrapped in `web::Data` and shared by every handler. It holds
//! the extractor (with its injected page fetcher), the metrics tracker and
//! the loaded configuration. Nothing in it is mutated per request except the
//! metrics, which guard themselves.

use crate::config::Config;
use crate::fetcher::{PageFetcher, SiteFetcher};
use crate::metrics::MetricsTracker;
use crate::video::VideoExtractor;
use std::sync::Arc;

pub struct AppState {
    /// Resolves episode slugs into mirrors
    pub extractor: VideoExtractor,
    /// Extraction outcome counters
    pub metrics: Arc<MetricsTracker>,
    /// Application configuration
    pub config: Config,
}

impl AppState {
    /// Build state around any page fetcher
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn PageFetcher>) -> Self {
        let metrics = Arc::new(MetricsTracker::new());
        let extractor = VideoExtractor::new(fetcher, Arc::clone(&metrics));
        Self {
            extractor,
            metrics,
            config,
        }
    }

    /// Build state that fetches from the configured site
    pub fn from_config(config: Config) -> Result<Self, reqwest::Error> {
        let client = config
            .bot_detection
            .create_http_client(config.site.user_agent.clone())?;
        let fetcher = SiteFetcher::new(config.site.base_url.clone(), client);
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }
}
