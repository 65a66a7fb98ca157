//! Hosted keyword extraction behind a trait.
//!
//! The pipeline only sees `&dyn KeywordExtractor`; the response is opaque display
//! text and is never parsed.

use async_trait::async_trait;

use crate::credentials::ApiKey;
use crate::extraction::prompts::{build_extract_prompt, EXTRACT_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    /// Model or backend name, reported alongside results.
    fn model(&self) -> &str;

    async fn extract(&self, jd_text: &str) -> Result<String, LlmError>;
}

/// Chat-completion extractor bound to one resolved API key.
pub struct LlmKeywordExtractor {
    llm: LlmClient,
    api_key: ApiKey,
}

impl LlmKeywordExtractor {
    pub fn new(llm: LlmClient, api_key: ApiKey) -> Self {
        Self { llm, api_key }
    }
}

#[async_trait]
impl KeywordExtractor for LlmKeywordExtractor {
    fn model(&self) -> &str {
        self.llm.model()
    }

    async fn extract(&self, jd_text: &str) -> Result<String, LlmError> {
        let prompt = build_extract_prompt(jd_text);
        self.llm
            .call_text(&self.api_key, EXTRACT_SYSTEM, &prompt)
            .await
    }
}
