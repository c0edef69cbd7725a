use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, LegendaError};

/// Environment variable overriding the translation endpoint
pub const ENDPOINT_ENV_VAR: &str = "TRANSLATE_API_URL";

fn default_request_delay_ms() -> u64 {
    100
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_extensions() -> Vec<String> {
    vec!["mkv".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub library: LibraryConfig,
    pub translate: TranslateConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directories scanned recursively for container files
    pub roots: Vec<PathBuf>,
    /// Container file extensions to pick up (case-insensitive, without dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Append-only list of containers whose source subtitles are image-based
    pub deferred_log: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// LibreTranslate-compatible `/translate` endpoint
    pub endpoint: String,
    /// Language code sent as `source` and used to pick the track to extract
    pub source_language: String,
    /// Language code sent as `target` and used for the output file name
    pub target_language: String,
    /// Pause between consecutive requests for the same document
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to mkvmerge binary (track inspection)
    pub mkvmerge_path: String,
    /// Path to mkvextract binary (track extraction)
    pub mkvextract_path: String,
    /// Scratch directory for extracted tracks before they are moved in place
    pub temp_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: LibraryConfig {
                roots: vec![PathBuf::from("/movies"), PathBuf::from("/tv")],
                extensions: default_extensions(),
                deferred_log: PathBuf::from("/temp/legendassup.txt"),
            },
            translate: TranslateConfig {
                endpoint: "http://localhost:5000/translate".to_string(),
                source_language: "en".to_string(),
                target_language: "pt-BR".to_string(),
                request_delay_ms: default_request_delay_ms(),
                timeout_secs: default_timeout_secs(),
            },
            media: MediaConfig {
                mkvmerge_path: "mkvmerge".to_string(),
                mkvextract_path: "mkvextract".to_string(),
                temp_dir: std::env::temp_dir().join("legenda"),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LegendaError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LegendaError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| LegendaError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Apply `TRANSLATE_API_URL` on top of whatever was loaded
    pub fn apply_env_overrides(&mut self) {
        self.apply_endpoint_override(std::env::var(ENDPOINT_ENV_VAR).ok());
    }

    fn apply_endpoint_override(&mut self, endpoint: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.translate.endpoint = endpoint.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.translate.endpoint.trim().is_empty() {
            return Err(LegendaError::Config("translate.endpoint must not be empty".to_string()));
        }
        if self.translate.source_language.trim().is_empty()
            || self.translate.target_language.trim().is_empty()
        {
            return Err(LegendaError::Config("source and target languages must be set".to_string()));
        }
        if self.library.extensions.is_empty() {
            return Err(LegendaError::Config("library.extensions must not be empty".to_string()));
        }
        Ok(())
    }
}
