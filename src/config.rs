use crate::http_client::{EnhancedHttpClient, HttpClientConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://anichin.club";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub bot_detection: BotDetectionConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Origin every slug is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Fixed user agent for page requests; unset rotates desktop agents
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    /// First port to try binding
    #[serde(default = "default_port")]
    pub port: u16,

    /// How many consecutive ports to try when the first one is taken
    #[serde(default = "default_port_attempts")]
    pub port_attempts: u16,

    /// Map empty extraction results to 502/404 instead of 200
    #[serde(default)]
    pub strict_status_codes: bool,

    /// Browser origins allowed to call the API; empty allows any origin
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BotDetectionConfig {
    /// Maximum number of retry attempts for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial retry delay in milliseconds
    #[serde(default = "default_initial_retry_delay")]
    pub initial_retry_delay_ms: u64,

    /// Maximum retry delay in milliseconds
    #[serde(default = "default_max_retry_delay")]
    pub max_retry_delay_ms: u64,

    /// Timeout for HTTP requests in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Keep cookies between requests (challenge clearance)
    #[serde(default = "default_true")]
    pub enable_cookies: bool,

    /// Enable gzip/brotli compression
    #[serde(default = "default_true")]
    pub enable_compression: bool,
}

fn default_true() -> bool { true }
fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_port_attempts() -> u16 { 10 }
fn default_max_retries() -> usize { 4 }
fn default_initial_retry_delay() -> u64 { 500 }
fn default_max_retry_delay() -> u64 { 8000 }
fn default_timeout() -> u64 { 30 }

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            port_attempts: default_port_attempts(),
            strict_status_codes: false,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Default for BotDetectionConfig {
    fn default() -> Self {
        Self {
            max_retries: 4,
            initial_retry_delay_ms: 500,
            max_retry_delay_ms: 8000,
            timeout_secs: 30,
            enable_cookies: true,
            enable_compression: true,
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, then apply environment
    /// overrides. A missing or broken file falls back to defaults.
    pub fn load() -> Self {
        let mut cfg = Self::load_file(Path::new("config.toml"));
        cfg.apply_overrides(|key| std::env::var(key).ok());
        cfg
    }

    fn load_file(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("Ignoring invalid {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Override settings from `USER_AGENT`, `SITE_BASE_URL`, `HOST` and `PORT`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(agent) = lookup("USER_AGENT").filter(|v| !v.trim().is_empty()) {
            self.site.user_agent = Some(agent);
        }
        if let Some(url) = lookup("SITE_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.site.base_url = url;
        }
        if let Some(host) = lookup("HOST").filter(|v| !v.trim().is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => log::warn!("Ignoring invalid PORT value {:?}", port),
            }
        }
    }
}

impl BotDetectionConfig {
    pub fn http_client_config(&self, user_agent: Option<String>) -> HttpClientConfig {
        HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            initial_retry_delay_ms: self.initial_retry_delay_ms,
            max_retry_delay_ms: self.max_retry_delay_ms,
            enable_cookies: self.enable_cookies,
            enable_gzip: self.enable_compression,
            user_agent,
        }
    }

    /// Create an HTTP client from this configuration
    pub fn create_http_client(
        &self,
        user_agent: Option<String>,
    ) -> Result<EnhancedHttpClient, reqwest::Error> {
        EnhancedHttpClient::with_config(self.http_client_config(user_agent))
    }
}
