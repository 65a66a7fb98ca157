//! Extraction pipeline — hosted extraction first, frequency ranking as companion or fallback.
//!
//! Every failure on the hosted path is caught here. It becomes a warning when the
//! ranker still produced something to show, and an `AppError` otherwise.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::credentials::CredentialError;
use crate::errors::AppError;
use crate::extraction::extractor::KeywordExtractor;
use crate::keywords::{KeywordRanker, RankedKeyword};
use crate::llm_client::LlmError;

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter a job description before extracting.";

#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    pub top_n: usize,
    /// Always run the ranker, even when hosted extraction succeeds.
    pub include_frequency: bool,
    /// Run the ranker when hosted extraction fails.
    pub fallback_on_failure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MissingCredential,
    InvalidCredential,
    Authentication,
    RateLimited,
    QuotaExhausted,
    ServiceError,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionWarning {
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub extraction_id: Uuid,
    pub extracted_at: DateTime<Utc>,
    /// Model that produced `ai_keywords`, when it succeeded.
    pub model: Option<String>,
    /// Opaque text from the hosted extractor.
    pub ai_keywords: Option<String>,
    /// `None` when the ranker did not run.
    pub ranked_keywords: Option<Vec<RankedKeyword>>,
    pub warnings: Vec<ExtractionWarning>,
}

/// Why the hosted path produced nothing.
#[derive(Debug)]
enum HostedFailure {
    Credential(CredentialError),
    Service(LlmError),
}

impl HostedFailure {
    fn warning(&self) -> ExtractionWarning {
        let (kind, message) = match self {
            HostedFailure::Credential(e @ CredentialError::Missing) => {
                (WarningKind::MissingCredential, e.to_string())
            }
            HostedFailure::Credential(e @ CredentialError::InvalidFormat { .. }) => {
                (WarningKind::InvalidCredential, e.to_string())
            }
            HostedFailure::Service(LlmError::Authentication { message, .. }) => (
                WarningKind::Authentication,
                format!("The API key was rejected: {message}"),
            ),
            HostedFailure::Service(LlmError::RateLimited {
                message,
                quota_exhausted: true,
            }) => (
                WarningKind::QuotaExhausted,
                format!("The API quota is exhausted: {message}"),
            ),
            HostedFailure::Service(LlmError::RateLimited { message, .. }) => (
                WarningKind::RateLimited,
                format!("The extraction service is rate limiting requests: {message}"),
            ),
            HostedFailure::Service(e) => (
                WarningKind::ServiceError,
                format!("The extraction service failed: {e}"),
            ),
        };
        ExtractionWarning { kind, message }
    }

    fn into_app_error(self) -> AppError {
        match self {
            HostedFailure::Credential(e) => AppError::Unauthorized(e.to_string()),
            HostedFailure::Service(LlmError::Authentication { message, .. }) => {
                AppError::Unauthorized(format!("The API key was rejected: {message}"))
            }
            HostedFailure::Service(e @ LlmError::RateLimited { .. }) => {
                AppError::RateLimited(e.to_string())
            }
            HostedFailure::Service(e) => AppError::Llm(e.to_string()),
        }
    }
}

/// Runs hosted extraction and, when asked or needed, frequency ranking over `jd_text`.
///
/// `extractor` is `Err` when no usable credential could be resolved; that is
/// handled exactly like a rejected key.
pub async fn run_extraction(
    jd_text: &str,
    extractor: Result<&dyn KeywordExtractor, CredentialError>,
    ranker: &KeywordRanker,
    options: &ExtractionOptions,
) -> Result<ExtractionReport, AppError> {
    if jd_text.trim().is_empty() {
        return Err(AppError::Validation(EMPTY_INPUT_MESSAGE.to_string()));
    }

    let extraction_id = Uuid::new_v4();

    let hosted = match extractor {
        Ok(extractor) => match extractor.extract(jd_text).await {
            Ok(text) => Ok((extractor.model().to_string(), text)),
            Err(e) => Err(HostedFailure::Service(e)),
        },
        Err(e) => Err(HostedFailure::Credential(e)),
    };

    let (model, ai_keywords, failure) = match hosted {
        Ok((model, text)) => (Some(model), Some(text), None),
        Err(failure) => {
            warn!("Extraction {extraction_id}: hosted extraction unavailable: {failure:?}");
            (None, None, Some(failure))
        }
    };

    let run_ranker =
        options.include_frequency || (failure.is_some() && options.fallback_on_failure);
    let ranked_keywords = run_ranker.then(|| ranker.rank(jd_text, Some(options.top_n)));

    let warnings = match failure {
        Some(failure) if ranked_keywords.is_none() => return Err(failure.into_app_error()),
        Some(failure) => vec![failure.warning()],
        None => Vec::new(),
    };

    info!(
        "Extraction {extraction_id} complete: hosted={}, ranked={}, warnings={}",
        ai_keywords.is_some(),
        ranked_keywords.as_ref().map_or(0, Vec::len),
        warnings.len()
    );

    Ok(ExtractionReport {
        extraction_id,
        extracted_at: Utc::now(),
        model,
        ai_keywords,
        ranked_keywords,
        warnings,
    })
}
