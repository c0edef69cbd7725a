// Translation through an external service
//
// - LibreTranslate: HTTP implementation of the service seam
// - Client: markup shielding and the never-fail fallback policy

pub mod client;
pub mod libretranslate;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use client::*;
pub use libretranslate::*;

use crate::config::TranslateConfig;
use crate::error::Result;

/// Language entry as listed by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportedLanguage {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Raw request/response access to a translation service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Translate `text` as-is; any transport, status or decoding problem is an error
    async fn translate_raw(&self, text: &str, source: &str, target: &str) -> Result<String>;

    /// Languages the service advertises
    async fn supported_languages(&self) -> Result<Vec<SupportedLanguage>>;
}

/// Factory for translation service instances
pub struct TranslationServiceFactory;

impl TranslationServiceFactory {
    pub fn create_service(config: &TranslateConfig) -> Result<Box<dyn TranslationService>> {
        Ok(Box::new(LibreTranslateService::new(config)?))
    }
}
