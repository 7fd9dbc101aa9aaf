//! Configuration settings for Svar.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub vector_store: VectorStoreSettings,
    pub captions: CaptionSettings,
    pub rag: RagSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for temporary files (staged uploads).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/svar".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

/// Content chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters of overlap between adjacent chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 160,
        }
    }
}

/// How ingestion batches map onto vector-database collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionMode {
    /// All sessions read and write one shared collection.
    #[default]
    Shared,
    /// Each ingestion batch gets its own collection, isolating sessions.
    PerSession,
}

impl std::str::FromStr for CollectionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shared" => Ok(CollectionMode::Shared),
            "per-session" | "per_session" => Ok(CollectionMode::PerSession),
            _ => Err(format!("Unknown collection mode: {}", s)),
        }
    }
}

impl std::fmt::Display for CollectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionMode::Shared => write!(f, "shared"),
            CollectionMode::PerSession => write!(f, "per-session"),
        }
    }
}

/// Vector database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Qdrant base URL.
    pub url: String,
    /// Optional Qdrant API key.
    pub api_key: Option<String>,
    /// Collection name (base name in per-session mode).
    pub collection: String,
    /// Shared corpus or one collection per ingestion batch.
    pub mode: CollectionMode,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            api_key: None,
            collection: "svar-chunks".to_string(),
            mode: CollectionMode::Shared,
        }
    }
}

/// Caption retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionSettings {
    /// Preferred caption language, tried before falling back to any track.
    pub preferred_language: String,
}

impl Default for CaptionSettings {
    fn default() -> Self {
        Self {
            preferred_language: "en".to_string(),
        }
    }
}

/// RAG (Retrieval-Augmented Generation) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// LLM model for answer generation.
    pub model: String,
    /// Number of chunks retrieved per question.
    pub max_context_chunks: usize,
    /// Per-chunk character cap when assembling the prompt context.
    pub chunk_char_cap: usize,
    /// Total character budget for the assembled context.
    pub max_context_chars: usize,
    /// Length of the snippet returned with each cited source.
    pub snippet_chars: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_context_chunks: 5,
            chunk_char_cap: 1200,
            max_context_chars: 12_000,
            snippet_chars: 200,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied on top of whatever was loaded.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env();
        Ok(settings)
    }

    /// Apply recognized environment variables over loaded settings.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("QDRANT_URL") {
            if !url.is_empty() {
                self.vector_store.url = url;
            }
        }
        if let Ok(key) = std::env::var("QDRANT_API_KEY") {
            if !key.is_empty() {
                self.vector_store.api_key = Some(key);
            }
        }
        if let Ok(lang) = std::env::var("SVAR_CAPTION_LANGUAGE") {
            if !lang.is_empty() {
                self.captions.preferred_language = lang;
            }
        }
        if let Ok(port) = std::env::var("SVAR_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("svar")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}
