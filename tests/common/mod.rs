#![allow(dead_code)]

use anichin_scraper::fetcher::{FetchError, PageFetcher};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves canned markup by slug; unknown slugs fail like a 404
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, slug: &str, markup: impl Into<String>) -> Self {
        self.pages.insert(slug.to_string(), markup.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: path.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            })
    }
}

pub fn encode(html: &str) -> String {
    STANDARD.encode(html)
}

pub fn iframe(src: &str) -> String {
    encode(&format!(
        r#"<iframe width="100%" height="100%" src="{}" frameborder="0" allowfullscreen></iframe>"#,
        src
    ))
}

/// Episode page with a mirror control holding `(label, payload)` options
pub fn episode_page(options: &[(&str, &str)]) -> String {
    let options: String = options
        .iter()
        .map(|(label, value)| format!(r#"<option value="{}">{}</option>"#, value, label))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Throne of Seal Episode 98 Subtitle Indonesia</title></head>
<body>
  <div class="megavid">
    <div class="item video-nav">
      <div class="mobius">
        <select class="mirror" name="mirror" onchange="loadMirror(this)">
          <option value="">Pilih Server Video</option>
          {}
        </select>
      </div>
    </div>
  </div>
</body>
</html>"#,
        options
    )
}
