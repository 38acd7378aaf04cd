//! Video mirror extraction for episode pages.
//!
//! Episode pages carry a `<select class="mirror">` whose options hold a
//! base64-encoded `<iframe>` snippet per hosting server. Every option is
//! decoded on its own; a broken option is dropped and recorded, it never
//! fails the whole page.

use crate::fetcher::PageFetcher;
use crate::markup;
use crate::metrics::MetricsTracker;
use crate::models::{ExtractionFailure, ExtractionResult, StreamDescriptor, StreamKind};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use scraper::{Html, Selector};
use std::sync::{Arc, LazyLock};
use std::time::Instant;

static MIRROR_SELECT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("select.mirror").expect("static selector"));
static MIRROR_OPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("option").expect("static selector"));
static EMBED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("iframe, embed").expect("static selector"));

/// Standard alphabet, padding optional
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Why a single mirror option was dropped
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MirrorError {
    #[error("option has no label")]
    MissingLabel,

    #[error("option has no encoded payload")]
    MissingPayload,

    #[error("payload is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("decoded payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("decoded payload has no iframe or embed")]
    NoEmbed,

    #[error("embed element has no src")]
    MissingSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedMirror {
    /// Position of the option inside the mirror control
    pub index: usize,
    pub label: String,
    pub reason: MirrorError,
}

/// Accepted and dropped mirrors of one page, in option order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    pub accepted: Vec<StreamDescriptor>,
    pub dropped: Vec<DroppedMirror>,
}

impl MirrorReport {
    fn accept(&mut self, descriptor: StreamDescriptor) {
        self.accepted.push(descriptor);
    }

    fn drop_entry(&mut self, index: usize, label: String, reason: MirrorError) {
        log::warn!("Skipping mirror #{} ({:?}): {}", index, label, reason);
        self.dropped.push(DroppedMirror {
            index,
            label,
            reason,
        });
    }

    pub fn into_result(self) -> ExtractionResult {
        ExtractionResult::from_descriptors(self.accepted)
    }
}

/// Apply the site's embed path fix: `videoembed` becomes `video`
pub fn normalize_embed_url(url: &str) -> String {
    if url.contains("videoembed") {
        url.replace("videoembed", "video")
    } else {
        url.to_string()
    }
}

/// Decode an option payload into the markup it wraps
pub fn decode_payload(payload: &str) -> Result<String, MirrorError> {
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(MirrorError::MissingPayload);
    }

    let bytes = PAYLOAD_ENGINE
        .decode(compact.as_bytes())
        .map_err(|e| MirrorError::InvalidBase64(e.to_string()))?;

    String::from_utf8(bytes).map_err(|_| MirrorError::InvalidUtf8)
}

/// Pull the player URL out of a decoded mirror snippet
pub fn embed_source(fragment: &str) -> Result<String, MirrorError> {
    let parsed = markup::parse_fragment(fragment).ok_or(MirrorError::NoEmbed)?;
    let embed = markup::select_first(&parsed, &EMBED).ok_or(MirrorError::NoEmbed)?;
    let src = markup::attr(embed, "src").ok_or(MirrorError::MissingSource)?;
    Ok(normalize_embed_url(src))
}

fn decode_mirror(label: &str, payload: Option<&str>) -> Result<StreamDescriptor, MirrorError> {
    if label.is_empty() {
        return Err(MirrorError::MissingLabel);
    }
    let payload = payload.ok_or(MirrorError::MissingPayload)?;
    let fragment = decode_payload(payload)?;
    let url = embed_source(&fragment)?;

    Ok(StreamDescriptor {
        label: label.to_string(),
        url,
        kind: StreamKind::Iframe,
    })
}

/// Walk the mirror control of a parsed episode page.
///
/// Returns `None` when the page has no mirror control at all.
pub fn extract_mirrors(document: &Html) -> Option<MirrorReport> {
    let control = markup::select_first(document, &MIRROR_SELECT)?;

    let mut report = MirrorReport::default();
    for (index, option) in markup::select_all(control, &MIRROR_OPTION)
        .into_iter()
        .enumerate()
    {
        let label = markup::text(option);
        match decode_mirror(&label, markup::attr(option, "value")) {
            Ok(descriptor) => report.accept(descriptor),
            Err(reason) => report.drop_entry(index, label, reason),
        }
    }

    Some(report)
}

/// Full extraction over already fetched markup
pub fn extract_from_markup(markup_text: &str) -> (ExtractionResult, usize) {
    let Some(document) = markup::parse_document(markup_text) else {
        return (ExtractionResult::failed(ExtractionFailure::PageNotFound), 0);
    };

    match extract_mirrors(&document) {
        Some(report) => {
            let dropped = report.dropped.len();
            (report.into_result(), dropped)
        }
        None => (ExtractionResult::failed(ExtractionFailure::NoVideoServers), 0),
    }
}

/// Resolves episode slugs into playable mirrors
pub struct VideoExtractor {
    fetcher: Arc<dyn PageFetcher>,
    metrics: Arc<MetricsTracker>,
}

impl VideoExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, metrics: Arc<MetricsTracker>) -> Self {
        Self { fetcher, metrics }
    }

    pub async fn extract(&self, slug: &str) -> ExtractionResult {
        let start = Instant::now();

        let slug = slug.trim();
        let (result, dropped) = if slug.is_empty() {
            (ExtractionResult::failed(ExtractionFailure::PageNotFound), 0)
        } else {
            match self.fetcher.fetch(slug).await {
                Ok(markup_text) => extract_from_markup(&markup_text),
                Err(e) => {
                    log::error!("Failed to fetch episode page {}: {}", slug, e);
                    (ExtractionResult::failed(ExtractionFailure::PageNotFound), 0)
                }
            }
        };

        match result.failure() {
            None => log::info!(
                "Extracted {} mirror(s) for {} ({} dropped)",
                result.descriptors().len(),
                slug,
                dropped
            ),
            Some(failure) => log::warn!("No mirrors for {}: {}", slug, failure),
        }

        self.metrics.record_extraction(&result, dropped, start.elapsed());
        result
    }
}
