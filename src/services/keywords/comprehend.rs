//! AWS Comprehend key phrase adapter.

use async_trait::async_trait;
use aws_sdk_comprehend::error::DisplayErrorContext;
use aws_sdk_comprehend::types::LanguageCode;
use aws_sdk_comprehend::Client;
use tracing::debug;

use super::KeywordExtractor;
use crate::config::KeywordSettings;
use crate::models::{Keyword, Record};
use crate::services::ServiceError;

/// `DetectKeyPhrases` rejects documents over this many UTF-8 bytes.
const MAX_TEXT_BYTES: usize = 100_000;

#[derive(Clone)]
pub struct ComprehendExtractor {
    client: Client,
    language: LanguageCode,
}

impl ComprehendExtractor {
    pub fn new(client: Client, language_code: &str) -> Self {
        Self {
            client,
            language: LanguageCode::from(language_code),
        }
    }

    pub async fn from_settings(settings: &KeywordSettings) -> Self {
        let config = crate::services::aws_config(&settings.region).await;
        Self::new(Client::new(&config), &settings.language_code)
    }
}

/// Longest prefix of `text` within `max` bytes that ends on a char boundary.
fn truncate_utf8(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[async_trait]
impl KeywordExtractor for ComprehendExtractor {
    async fn extract(&self, record: &Record) -> Result<Vec<Keyword>, ServiceError> {
        let text = truncate_utf8(&record.content, MAX_TEXT_BYTES);

        let output = self
            .client
            .detect_key_phrases()
            .text(text)
            .language_code(self.language.clone())
            .send()
            .await
            .map_err(|e| ServiceError::request("comprehend", DisplayErrorContext(&e)))?;

        let keywords: Vec<Keyword> = output
            .key_phrases()
            .iter()
            .filter_map(|phrase| {
                phrase
                    .text()
                    .map(|text| Keyword::new(text, phrase.score().unwrap_or_default()))
            })
            .collect();

        debug!(record_id = record.id, count = keywords.len(), "Extracted key phrases");
        Ok(keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate_utf8("오늘 산책", 100), "오늘 산책");
    }

    #[test]
    fn test_truncate_backs_off_to_char_boundary() {
        // each Hangul syllable is 3 bytes
        let text = "가나다";
        assert_eq!(truncate_utf8(text, 7), "가나");
        assert_eq!(truncate_utf8(text, 6), "가나");
        assert_eq!(truncate_utf8(text, 2), "");
    }
}
