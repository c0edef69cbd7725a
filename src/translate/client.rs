use tracing::{debug, info, warn};

use crate::error::LegendaError;
use crate::shield::{shield, unshield};
use super::TranslationService;

/// Shielded, never-failing translation on top of a [`TranslationService`]
pub struct TranslationClient {
    service: Box<dyn TranslationService>,
}

impl TranslationClient {
    pub fn new(service: Box<dyn TranslationService>) -> Self {
        Self { service }
    }

    /// Translate one text unit.
    ///
    /// Markup is hidden behind placeholders for the request and restored in
    /// the response. Any failure returns `text` unchanged; nothing is retried.
    pub async fn translate(&self, text: &str, source: &str, target: &str) -> String {
        let shielded = shield(text);

        match self.service.translate_raw(&shielded.text, source, target).await {
            Ok(translated) => {
                let restored = unshield(&translated, &shielded.placeholders);
                debug!("Translated {:?} -> {:?}", text, restored);
                restored
            }
            Err(LegendaError::Translation { status, body }) => {
                warn!("Translation failed, status {}: {:?}", status, shielded.text);
                warn!("Response: {}", body);
                text.to_string()
            }
            Err(e) => {
                warn!("Translation request failed for {:?}: {}", shielded.text, e);
                text.to_string()
            }
        }
    }

    /// Log the advertised languages and a probe translation.
    ///
    /// Diagnostics only: failures are logged and otherwise ignored.
    pub async fn log_diagnostics(&self, source: &str, target: &str) {
        match self.service.supported_languages().await {
            Ok(languages) => {
                let codes: Vec<&str> = languages.iter().map(|l| l.code.as_str()).collect();
                info!("Supported languages: {}", codes.join(", "));
            }
            Err(e) => warn!("Could not fetch supported languages: {}", e),
        }

        match self.service.translate_raw("Hello", source, target).await {
            Ok(result) => info!("Translation service probe ({} -> {}): {:?}", source, target, result),
            Err(e) => warn!("Translation service probe failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{MockTranslationService, SupportedLanguage};

    #[tokio::test]
    async fn test_failure_status_echoes_input() {
        let mut service = MockTranslationService::new();
        service.expect_translate_raw().times(1).returning(|_, _, _| {
            Err(LegendaError::Translation {
                status: 503,
                body: "unavailable".to_string(),
            })
        });

        let client = TranslationClient::new(Box::new(service));
        let input = "Hello <i>world</i>";
        assert_eq!(client.translate(input, "en", "pt-BR").await, input);
    }

    #[tokio::test]
    async fn test_transport_error_echoes_input() {
        let mut service = MockTranslationService::new();
        service
            .expect_translate_raw()
            .returning(|_, _, _| Err(LegendaError::Media("connection refused".to_string())));

        let client = TranslationClient::new(Box::new(service));
        assert_eq!(client.translate("Bye", "en", "pt-BR").await, "Bye");
    }

    #[tokio::test]
    async fn test_service_sees_placeholders_and_markup_is_restored() {
        let mut service = MockTranslationService::new();
        service
            .expect_translate_raw()
            .withf(|text, source, target| {
                text.to_string() == "[[[TAG0]]]Hello[[[TAG1]]]"
                    && source.to_string() == "en"
                    && target.to_string() == "pt-BR"
            })
            .times(1)
            .returning(|_, _, _| Ok("[[[TAG0]]]Olá[[[TAG1]]]".to_string()));

        let client = TranslationClient::new(Box::new(service));
        assert_eq!(client.translate("<b>Hello</b>", "en", "pt-BR").await, "<b>Olá</b>");
    }

    #[tokio::test]
    async fn test_diagnostics_tolerate_failures() {
        let mut service = MockTranslationService::new();
        service
            .expect_supported_languages()
            .times(1)
            .returning(|| Err(LegendaError::Media("down".to_string())));
        service
            .expect_translate_raw()
            .times(1)
            .returning(|_, _, _| Err(LegendaError::Media("down".to_string())));

        let client = TranslationClient::new(Box::new(service));
        client.log_diagnostics("en", "pt-BR").await;
    }

    #[tokio::test]
    async fn test_diagnostics_list_languages() {
        let mut service = MockTranslationService::new();
        service.expect_supported_languages().times(1).returning(|| {
            Ok(vec![SupportedLanguage {
                code: "en".to_string(),
                name: "English".to_string(),
                targets: vec!["pt-BR".to_string()],
            }])
        });
        service
            .expect_translate_raw()
            .times(1)
            .returning(|_, _, _| Ok("Olá".to_string()));

        let client = TranslationClient::new(Box::new(service));
        client.log_diagnostics("en", "pt-BR").await;
    }
}
