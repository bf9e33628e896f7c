//! Request-scoped pipeline: validate URL, format offset, extract clip,
//! recognize song.

pub mod audd_client;
pub mod clip_extractor;
pub mod timecode;
pub mod url_validator;

pub use audd_client::{AuddClient, RecognitionError};
pub use clip_extractor::{ClipExtractor, ExtractionError};
pub use timecode::format_start;
pub use url_validator::{validate, UrlError, ValidatedUrl};

use thiserror::Error;
use tracing::info;

/// Failure in either downstream stage of the pipeline
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),
}

/// Runs the extract-then-recognize tail of the pipeline
#[derive(Debug, Clone)]
pub struct SongResolver {
    extractor: ClipExtractor,
    audd: AuddClient,
}

impl SongResolver {
    pub fn new(extractor: ClipExtractor, audd: AuddClient) -> Self {
        Self { extractor, audd }
    }

    /// Extract a clip at `start` and submit it for recognition.
    ///
    /// The clip file never outlives this call: the extractor removes it on
    /// its own failures and the recognition client deletes it on every one
    /// of its exit paths.
    pub async fn resolve(&self, url: &ValidatedUrl, start: &str) -> Result<String, ResolveError> {
        let clip = self.extractor.extract(url, start).await?;
        info!(host = %url.host(), clip = %clip.display(), "Clip extracted, recognizing");
        let text = self.audd.recognize(&clip).await?;
        Ok(text)
    }
}
