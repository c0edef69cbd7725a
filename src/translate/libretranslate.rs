use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{Result, LegendaError};
use super::{SupportedLanguage, TranslationService};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub q: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResponse {
    #[serde(rename = "translatedText")]
    pub translated_text: String,
}

/// LibreTranslate `/translate` + `/languages` client
pub struct LibreTranslateService {
    client: Client,
    endpoint: String,
}

impl LibreTranslateService {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Companion listing endpoint: last `/translate` segment swapped for `/languages`
    pub fn languages_endpoint(&self) -> String {
        languages_url(&self.endpoint)
    }
}

pub fn languages_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    match trimmed.strip_suffix("/translate") {
        Some(base) => format!("{}/languages", base),
        None => format!("{}/languages", trimmed),
    }
}

#[async_trait]
impl TranslationService for LibreTranslateService {
    async fn translate_raw(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let request = TranslationRequest {
            q: text.to_string(),
            source: source.to_string(),
            target: target.to_string(),
        };

        debug!("Sending translation request to: {}", self.endpoint);

        let response = self.client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LegendaError::Translation {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranslationResponse = serde_json::from_str(&body).map_err(|e| {
            LegendaError::Translation {
                status: status.as_u16(),
                body: format!("malformed response ({}): {}", e, body),
            }
        })?;

        Ok(parsed.translated_text)
    }

    async fn supported_languages(&self) -> Result<Vec<SupportedLanguage>> {
        let url = self.languages_endpoint();
        debug!("Fetching supported languages from: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LegendaError::Translation {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
