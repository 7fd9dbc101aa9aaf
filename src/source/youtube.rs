//! YouTube caption retrieval.

use crate::error::{Result, SvarError};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Provider of video transcripts.
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    /// Fetch the joined transcript text for a video.
    ///
    /// `language` narrows track selection when given; without it any
    /// available track may be used.
    async fn fetch(&self, url: &str, language: Option<&str>) -> Result<String>;
}

/// Caption provider backed by yt-dlp metadata and a direct track download.
pub struct YtDlpCaptions {
    http: reqwest::Client,
    video_id_regex: Regex,
}

impl YtDlpCaptions {
    pub fn new() -> Self {
        // Matches various YouTube URL formats and bare video IDs
        let video_id_regex = Regex::new(
            r"(?x)
            (?:
                # Full YouTube URLs
                (?:https?://)?
                (?:www\.)?
                (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            # Bare video ID (11 characters)
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex");

        Self {
            http: reqwest::Client::new(),
            video_id_regex,
        }
    }

    /// Extract video ID from a YouTube URL or bare ID.
    fn extract_video_id(&self, input: &str) -> Option<String> {
        let caps = self.video_id_regex.captures(input.trim())?;

        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    /// Fetch video metadata (including caption track listings) via yt-dlp.
    async fn fetch_metadata(&self, url: &str) -> Result<Value> {
        let output = tokio::process::Command::new("yt-dlp")
            .args(["--dump-json", "--no-download", "--no-warnings", url])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SvarError::Captions(
                        "yt-dlp not found. Please install it and ensure it's in your PATH."
                            .to_string(),
                    )
                } else {
                    SvarError::Captions(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SvarError::Captions(format!(
                "video unavailable: {}",
                stderr.trim()
            )));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&json_str)
            .map_err(|e| SvarError::Captions(format!("Failed to parse yt-dlp output: {}", e)))
    }
}

impl Default for YtDlpCaptions {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptionProvider for YtDlpCaptions {
    async fn fetch(&self, url: &str, language: Option<&str>) -> Result<String> {
        let video_id = self.extract_video_id(url).ok_or_else(|| {
            SvarError::InvalidInput(format!("Invalid YouTube video ID or URL: {}", url))
        })?;
        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);

        let metadata = self.fetch_metadata(&watch_url).await?;

        // Manually authored subtitles win over auto-generated captions.
        let track_url = pick_track(&metadata["subtitles"], language)
            .or_else(|| pick_track(&metadata["automatic_captions"], language))
            .ok_or_else(|| {
                SvarError::Captions(match language {
                    Some(lang) => format!("no caption track for language '{}'", lang),
                    None => "no caption track in any language".to_string(),
                })
            })?;

        let payload: Value = self
            .http
            .get(&track_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = join_json3(&payload);
        debug!("fetched {} chars of captions for {}", text.len(), video_id);
        Ok(text)
    }
}

/// Pick a json3 caption track URL from a yt-dlp track map.
///
/// With a language hint, only that language (or a regional variant of it,
/// e.g. "en-US" for "en") is considered; without one the first track in
/// key order is used.
fn pick_track(tracks: &Value, language: Option<&str>) -> Option<String> {
    let map = tracks.as_object()?;

    let key = match language {
        Some(lang) => map
            .keys()
            .find(|k| *k == lang || k.starts_with(&format!("{}-", lang)))?
            .clone(),
        None => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            (*keys.first()?).clone()
        }
    };

    map.get(&key)?
        .as_array()?
        .iter()
        .find(|entry| entry["ext"].as_str() == Some("json3"))
        .and_then(|entry| entry["url"].as_str())
        .map(String::from)
}

/// Join the text segments of a json3 transcript into one string.
fn join_json3(payload: &Value) -> String {
    let mut parts = Vec::new();
    if let Some(events) = payload["events"].as_array() {
        for event in events {
            if let Some(segs) = event["segs"].as_array() {
                let line: String = segs
                    .iter()
                    .filter_map(|seg| seg["utf8"].as_str())
                    .collect::<Vec<_>>()
                    .join("");
                let line = line.replace('\n', " ");
                let line = line.trim();
                if !line.is_empty() {
                    parts.push(line.to_string());
                }
            }
        }
    }
    parts.join(" ")
}
