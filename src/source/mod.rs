//! Source normalization: turning heterogeneous inputs into documents.
//!
//! An ingestion request may carry up to three inputs (inline text, an
//! uploaded PDF, a video URL). Each is normalized independently and
//! concurrently into [`Extraction`]s; the flattened output is ordered by
//! input kind (inline, then PDF, then video), not by completion time.

mod pdf;
mod youtube;

pub use youtube::{CaptionProvider, YtDlpCaptions};

use crate::error::{Result, SvarError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Source label used for pasted text.
pub const INLINE_SOURCE: &str = "inline";

/// Fallback source label for uploads without a usable filename.
const DEFAULT_UPLOAD_NAME: &str = "upload.pdf";

/// Provenance metadata carried by every normalized document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Where the text came from: "inline", an upload filename, or a URL.
    pub source: String,
    /// Diagnostic note attached during normalization, if any.
    pub note: Option<String>,
}

impl SourceMetadata {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            note: None,
        }
    }
}

/// A normalized unit of ingestible text.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub content: String,
    pub metadata: SourceMetadata,
}

impl SourceDocument {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: SourceMetadata::new(source),
        }
    }
}

/// Outcome of normalizing a single input.
///
/// Soft failures (unparseable PDF, missing captions) are values, not errors,
/// so one bad input never sinks a batch with usable sources.
#[derive(Debug, Clone)]
pub enum Extraction {
    /// Usable text with provenance.
    Document(SourceDocument),
    /// The input was present but yielded no text; `note` says why.
    Unavailable { source: String, note: String },
}

impl Extraction {
    /// The source label, regardless of outcome.
    pub fn source(&self) -> &str {
        match self {
            Extraction::Document(doc) => &doc.metadata.source,
            Extraction::Unavailable { source, .. } => source,
        }
    }

    /// The diagnostic note, if any.
    pub fn note(&self) -> Option<&str> {
        match self {
            Extraction::Document(doc) => doc.metadata.note.as_deref(),
            Extraction::Unavailable { note, .. } => Some(note),
        }
    }

    /// Whether this extraction carries non-blank text.
    pub fn has_content(&self) -> bool {
        match self {
            Extraction::Document(doc) => !doc.content.trim().is_empty(),
            Extraction::Unavailable { .. } => false,
        }
    }
}

/// An uploaded file staged on disk by the transport layer.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    /// Path of the staged temporary file.
    pub path: PathBuf,
    /// Filename as declared by the client.
    pub original_name: Option<String>,
}

/// Raw inputs accepted by an ingestion request. All fields optional.
#[derive(Debug, Default)]
pub struct IngestInput {
    pub text: Option<String>,
    pub upload: Option<StagedUpload>,
    pub video_url: Option<String>,
}

/// Normalizes the inputs of one ingestion request into documents.
pub struct Normalizer {
    captions: Arc<dyn CaptionProvider>,
    preferred_language: String,
}

impl Normalizer {
    pub fn new(captions: Arc<dyn CaptionProvider>, preferred_language: impl Into<String>) -> Self {
        Self {
            captions,
            preferred_language: preferred_language.into(),
        }
    }

    /// Normalize all inputs concurrently.
    ///
    /// Output order is inline, PDF, video. An unreadable staged upload is
    /// the only fatal condition here; everything else degrades to an
    /// [`Extraction::Unavailable`] with a note.
    pub async fn normalize(&self, input: &IngestInput) -> Result<Vec<Extraction>> {
        let (inline, upload, video) = futures::join!(
            self.normalize_inline(input.text.as_deref()),
            self.normalize_upload(input.upload.as_ref()),
            self.normalize_video(input.video_url.as_deref()),
        );

        let mut extractions = inline;
        extractions.extend(upload?);
        extractions.extend(video);
        Ok(extractions)
    }

    async fn normalize_inline(&self, text: Option<&str>) -> Vec<Extraction> {
        match text {
            Some(text) if !text.trim().is_empty() => {
                vec![Extraction::Document(SourceDocument::new(
                    text,
                    INLINE_SOURCE,
                ))]
            }
            _ => Vec::new(),
        }
    }

    async fn normalize_upload(&self, upload: Option<&StagedUpload>) -> Result<Vec<Extraction>> {
        let Some(upload) = upload else {
            return Ok(Vec::new());
        };

        let source = upload
            .original_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UPLOAD_NAME.to_string());

        let bytes = tokio::fs::read(&upload.path).await.map_err(|e| {
            SvarError::SourceUnavailable(format!(
                "cannot read staged upload {}: {}",
                upload.path.display(),
                e
            ))
        })?;

        let extraction = match pdf::extract_text(&bytes) {
            Ok(text) if !text.trim().is_empty() => {
                Extraction::Document(SourceDocument::new(text, source))
            }
            Ok(_) => Extraction::Unavailable {
                source,
                note: "PDF contained no extractable text".to_string(),
            },
            Err(e) => {
                warn!("PDF extraction failed for {}: {}", source, e);
                Extraction::Unavailable {
                    source,
                    note: format!("PDF text extraction failed: {}", e),
                }
            }
        };

        Ok(vec![extraction])
    }

    async fn normalize_video(&self, url: Option<&str>) -> Vec<Extraction> {
        let url = match url {
            Some(url) if !url.trim().is_empty() => url.trim(),
            _ => return Vec::new(),
        };

        // First pass with the preferred language, second without a hint.
        let text = match self
            .try_captions(url, Some(&self.preferred_language))
            .await
        {
            Some(text) => Some(text),
            None => self.try_captions(url, None).await,
        };

        let extraction = match text {
            Some(text) => Extraction::Document(SourceDocument::new(text, url)),
            None => Extraction::Unavailable {
                source: url.to_string(),
                note: format!(
                    "no captions could be retrieved for {} (the video may have captions \
                     disabled, or no transcript is published)",
                    url
                ),
            },
        };

        vec![extraction]
    }

    /// One caption-fetch attempt. Provider failures are logged and mapped
    /// to None, as is a blank transcript.
    async fn try_captions(&self, url: &str, language: Option<&str>) -> Option<String> {
        match self.captions.fetch(url, language).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                warn!(
                    "caption fetch failed for {} (language {:?}): {}",
                    url, language, e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Write;

    /// Caption stub: returns a canned per-language script, erroring on
    /// languages it does not know.
    struct ScriptedCaptions {
        hinted: Option<String>,
        unhinted: Option<String>,
    }

    #[async_trait]
    impl CaptionProvider for ScriptedCaptions {
        async fn fetch(&self, _url: &str, language: Option<&str>) -> Result<String> {
            let script = match language {
                Some(_) => &self.hinted,
                None => &self.unhinted,
            };
            script
                .clone()
                .ok_or_else(|| SvarError::Captions("transcript unavailable".to_string()))
        }
    }

    fn normalizer(hinted: Option<&str>, unhinted: Option<&str>) -> Normalizer {
        Normalizer::new(
            Arc::new(ScriptedCaptions {
                hinted: hinted.map(String::from),
                unhinted: unhinted.map(String::from),
            }),
            "en",
        )
    }

    #[tokio::test]
    async fn test_inline_text_verbatim() {
        let input = IngestInput {
            text: Some("The sky is blue.".to_string()),
            ..Default::default()
        };
        let extractions = normalizer(None, None).normalize(&input).await.unwrap();

        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].source(), INLINE_SOURCE);
        assert!(extractions[0].has_content());
        match &extractions[0] {
            Extraction::Document(doc) => assert_eq!(doc.content, "The sky is blue."),
            other => panic!("expected document, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blank_inputs_yield_nothing() {
        let input = IngestInput {
            text: Some("   \n".to_string()),
            video_url: Some("".to_string()),
            ..Default::default()
        };
        let extractions = normalizer(None, None).normalize(&input).await.unwrap();
        assert!(extractions.is_empty());
    }

    #[tokio::test]
    async fn test_caption_fallback_to_unhinted_pass() {
        let input = IngestInput {
            video_url: Some("https://youtu.be/dQw4w9WgXcQ".to_string()),
            ..Default::default()
        };
        let extractions = normalizer(None, Some("hello from the fallback track"))
            .normalize(&input)
            .await
            .unwrap();

        assert_eq!(extractions.len(), 1);
        assert!(extractions[0].has_content());
        match &extractions[0] {
            Extraction::Document(doc) => {
                assert_eq!(doc.content, "hello from the fallback track");
                assert_eq!(doc.metadata.source, "https://youtu.be/dQw4w9WgXcQ");
            }
            other => panic!("expected document, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_captions_unavailable_yields_note() {
        let input = IngestInput {
            video_url: Some("https://youtu.be/dQw4w9WgXcQ".to_string()),
            ..Default::default()
        };
        let extractions = normalizer(None, None).normalize(&input).await.unwrap();

        assert_eq!(extractions.len(), 1);
        assert!(!extractions[0].has_content());
        assert!(extractions[0].note().unwrap().contains("captions"));
    }

    #[tokio::test]
    async fn test_unparseable_upload_becomes_soft_failure() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a pdf").unwrap();

        let input = IngestInput {
            upload: Some(StagedUpload {
                path: file.path().to_path_buf(),
                original_name: Some("notes.pdf".to_string()),
            }),
            ..Default::default()
        };
        let extractions = normalizer(None, None).normalize(&input).await.unwrap();

        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].source(), "notes.pdf");
        assert!(!extractions[0].has_content());
        assert!(extractions[0].note().is_some());
    }

    #[tokio::test]
    async fn test_missing_upload_file_is_fatal() {
        let input = IngestInput {
            upload: Some(StagedUpload {
                path: PathBuf::from("/nonexistent/svar-upload"),
                original_name: None,
            }),
            ..Default::default()
        };
        let result = normalizer(None, None).normalize(&input).await;
        assert!(matches!(result, Err(SvarError::SourceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_output_order_is_inline_then_upload_then_video() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a pdf").unwrap();

        let input = IngestInput {
            text: Some("pasted".to_string()),
            upload: Some(StagedUpload {
                path: file.path().to_path_buf(),
                original_name: Some("doc.pdf".to_string()),
            }),
            video_url: Some("https://youtu.be/dQw4w9WgXcQ".to_string()),
        };
        let extractions = normalizer(Some("transcript text"), None)
            .normalize(&input)
            .await
            .unwrap();

        let sources: Vec<&str> = extractions.iter().map(|e| e.source()).collect();
        assert_eq!(
            sources,
            vec![INLINE_SOURCE, "doc.pdf", "https://youtu.be/dQw4w9WgXcQ"]
        );
    }
}
