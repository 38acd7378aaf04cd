use serde::{Deserialize, Serialize};

/// How a player should consume a stream URL
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Iframe,
}

/// One playable mirror taken from an episode page
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub label: String,
    pub url: String,
    pub kind: StreamKind,
}

/// Terminal outcomes of an extraction call
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionFailure {
    #[error("page not found")]
    PageNotFound,

    #[error("no video servers found")]
    NoVideoServers,

    #[error("no valid video links found")]
    NoValidLinks,
}

/// Outcome of one extraction call.
///
/// Either at least one descriptor and no error, or no descriptors and a
/// failure. The constructors are the only way to build one, so the two
/// states can't mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    descriptors: Vec<StreamDescriptor>,
    failure: Option<ExtractionFailure>,
}

impl ExtractionResult {
    /// Wrap extracted descriptors; an empty list becomes `NoValidLinks`
    pub fn from_descriptors(descriptors: Vec<StreamDescriptor>) -> Self {
        if descriptors.is_empty() {
            return Self::failed(ExtractionFailure::NoValidLinks);
        }
        Self {
            descriptors,
            failure: None,
        }
    }

    pub fn failed(failure: ExtractionFailure) -> Self {
        Self {
            descriptors: Vec::new(),
            failure: Some(failure),
        }
    }

    pub fn descriptors(&self) -> &[StreamDescriptor] {
        &self.descriptors
    }

    pub fn failure(&self) -> Option<ExtractionFailure> {
        self.failure
    }

    pub fn error_message(&self) -> Option<String> {
        self.failure.map(|f| f.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn into_descriptors(self) -> Vec<StreamDescriptor> {
        self.descriptors
    }
}

/// A single entry of the `medias` array.
///
/// `quality` carries the server label and `extension` the stream kind; the
/// names are kept for compatibility with existing frontends.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    pub quality: String,
    pub url: String,
    pub extension: StreamKind,
}

impl From<StreamDescriptor> for MediaEntry {
    fn from(d: StreamDescriptor) -> Self {
        Self {
            quality: d.label,
            url: d.url,
            extension: d.kind,
        }
    }
}

/// JSON body of `GET /video-source/{slug}`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VideoSourceResponse {
    pub medias: Vec<MediaEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ExtractionResult> for VideoSourceResponse {
    fn from(result: ExtractionResult) -> Self {
        let error = result.error_message();
        Self {
            medias: result
                .into_descriptors()
                .into_iter()
                .map(MediaEntry::from)
                .collect(),
            error,
        }
    }
}
