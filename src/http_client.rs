use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;
use tokio::time::sleep;

/// Desktop user agents used when no fixed user agent is configured
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
];

/// Body fragments found on Cloudflare interstitial pages
const CHALLENGE_MARKERS: &[&str] = &[
    "Just a moment...",
    "cf-browser-verification",
    "challenge-platform",
    "cf_chl_opt",
];

/// Configuration for the HTTP client
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub max_retries: usize,
    pub initial_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    pub enable_cookies: bool,
    pub enable_gzip: bool,
    /// Fixed user agent; when `None` one is picked from the pool per attempt
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 4,
            initial_retry_delay_ms: 500,
            max_retry_delay_ms: 8000,
            enable_cookies: true,
            enable_gzip: true,
            user_agent: None,
        }
    }
}

/// A fully read response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: StatusCode,
    pub body: String,
    /// The last attempt still returned a Cloudflare challenge page
    pub challenged: bool,
}

/// HTTP client with browser-like headers, retries and challenge detection
pub struct EnhancedHttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl EnhancedHttpClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        let initial_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| Self::random_user_agent().to_string());

        let builder = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(initial_agent)
            .cookie_store(config.enable_cookies)
            .gzip(config.enable_gzip)
            .brotli(config.enable_gzip)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .default_headers(Self::browser_headers());

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Headers a desktop browser sends on a top-level navigation
    fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "accept",
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
            ),
        );
        headers.insert("accept-language", HeaderValue::from_static("en-US,en;q=0.9,id;q=0.8"));
        headers.insert("dnt", HeaderValue::from_static("1"));
        headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
        headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
        headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
        headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
        headers.insert("cache-control", HeaderValue::from_static("max-age=0"));
        headers
    }

    fn random_user_agent() -> &'static str {
        let mut rng = rand::thread_rng();
        let index = rng.gen_range(0..USER_AGENTS.len());
        USER_AGENTS[index]
    }

    fn user_agent_for_attempt(&self) -> String {
        match &self.config.user_agent {
            Some(agent) => agent.clone(),
            None => Self::random_user_agent().to_string(),
        }
    }

    /// Exponential backoff with ±25% jitter
    fn calculate_retry_delay(&self, attempt: usize) -> Duration {
        let base_delay = self.config.initial_retry_delay_ms;
        let max_delay = self.config.max_retry_delay_ms;

        let factor = 2u64.saturating_pow(attempt as u32);
        let delay_ms = base_delay.saturating_mul(factor).min(max_delay);

        let mut rng = rand::thread_rng();
        let jitter = rng.gen_range(0.75..=1.25);
        let final_delay_ms = (delay_ms as f64 * jitter) as u64;

        Duration::from_millis(final_delay_ms)
    }

    fn is_retryable_status(status: StatusCode) -> bool {
        matches!(
            status.as_u16(),
            // Rate limiting
            429 |
            // Server errors
            500 | 502 | 503 | 504 |
            // Cloudflare errors
            520 | 521 | 522 | 523 | 524 | 525 | 526 | 527
        )
    }

    /// Whether a response is a Cloudflare interstitial instead of content
    pub fn is_challenge(status: StatusCode, headers: &HeaderMap, body: &str) -> bool {
        if status != StatusCode::FORBIDDEN && status != StatusCode::SERVICE_UNAVAILABLE {
            return false;
        }

        let mitigated = headers
            .get("cf-mitigated")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("challenge"))
            .unwrap_or(false);
        if mitigated {
            return true;
        }

        let from_cloudflare = headers
            .get("server")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase().contains("cloudflare"))
            .unwrap_or(false);

        from_cloudflare && CHALLENGE_MARKERS.iter().any(|m| body.contains(m))
    }

    /// Fetch a URL, retrying transient failures and challenge pages.
    ///
    /// Non-retryable statuses are returned as-is; callers decide what a
    /// success is.
    pub async fn get_with_retry(&self, url: &str) -> Result<FetchedPage, reqwest::Error> {
        let mut attempt = 0;

        loop {
            let last_attempt = attempt >= self.config.max_retries;
            let request = self
                .client
                .get(url)
                .header("User-Agent", self.user_agent_for_attempt());

            let outcome = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let headers = response.headers().clone();
                    response
                        .text()
                        .await
                        .map(|body| (status, headers, body))
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok((status, headers, body)) => {
                    let challenged = Self::is_challenge(status, &headers, &body);

                    if (challenged || Self::is_retryable_status(status)) && !last_attempt {
                        log::warn!(
                            "{} from {} (challenge: {}), attempt {}/{}",
                            status,
                            url,
                            challenged,
                            attempt + 1,
                            self.config.max_retries + 1
                        );
                        sleep(self.calculate_retry_delay(attempt)).await;
                        attempt += 1;
                        continue;
                    }

                    return Ok(FetchedPage {
                        url: url.to_string(),
                        status,
                        body,
                        challenged,
                    });
                }
                Err(e) => {
                    let should_retry = e.is_timeout()
                        || e.is_connect()
                        || e.is_request()
                        || e.status().map(Self::is_retryable_status).unwrap_or(false);

                    if should_retry && !last_attempt {
                        log::warn!(
                            "Request failed for {}, attempt {}/{}: {}",
                            url,
                            attempt + 1,
                            self.config.max_retries + 1,
                            e
                        );
                        sleep(self.calculate_retry_delay(attempt)).await;
                        attempt += 1;
                        continue;
                    }

                    return Err(e);
                }
            }
        }
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}
