// Library interface for anichin_scraper
// The binary and the integration tests both build on these modules

pub mod api;
pub mod app_state;
pub mod config;
pub mod fetcher;
pub mod http_client;
pub mod logging;
pub mod markup;
pub mod metrics;
pub mod models;
pub mod video;
