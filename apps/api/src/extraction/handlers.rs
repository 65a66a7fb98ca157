//! Axum route handlers for the Extraction API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::credentials::UserEntryProvider;
use crate::errors::AppError;
use crate::extraction::extractor::{KeywordExtractor, LlmKeywordExtractor};
use crate::extraction::pipeline::{run_extraction, ExtractionOptions, ExtractionReport};
use crate::extraction::upload::read_text_upload;
use crate::keywords::RankedKeyword;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub jd_text: String,
    /// Key typed into the form; used only when no configured key exists.
    pub api_key: Option<String>,
    pub top_n: Option<usize>,
    pub include_frequency: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub text: String,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub ranked_keywords: Vec<RankedKeyword>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/extract
///
/// Extracts keywords from pasted JD text.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractionReport>, AppError> {
    let report = extract(
        &state,
        &request.jd_text,
        request.api_key,
        request.top_n,
        request.include_frequency,
    )
    .await?;
    Ok(Json(report))
}

/// POST /api/v1/extract/upload
///
/// Multipart variant: a `file` part holding a plain-text JD, plus optional
/// `api_key`, `top_n` and `include_frequency` text parts.
pub async fn handle_extract_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionReport>, AppError> {
    let mut jd_text: Option<String> = None;
    let mut api_key: Option<String> = None;
    let mut top_n: Option<usize> = None;
    let mut include_frequency: Option<bool> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().map(String::from);
                let content_type = field.content_type().map(String::from);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                debug!(
                    "Received upload {:?} ({:?}, {} bytes)",
                    filename,
                    content_type,
                    bytes.len()
                );
                jd_text = Some(read_text_upload(
                    filename.as_deref(),
                    content_type.as_deref(),
                    &bytes,
                )?);
            }
            "api_key" => api_key = Some(field.text().await.map_err(multipart_error)?),
            "top_n" => {
                let raw = field.text().await.map_err(multipart_error)?;
                top_n = parse_optional(&raw, "top_n")?;
            }
            "include_frequency" => {
                let raw = field.text().await.map_err(multipart_error)?;
                include_frequency = parse_flag(&raw)?;
            }
            other => debug!("Ignoring multipart field '{other}'"),
        }
    }

    let jd_text =
        jd_text.ok_or_else(|| AppError::Validation("No file was uploaded".to_string()))?;

    let report = extract(&state, &jd_text, api_key, top_n, include_frequency).await?;
    Ok(Json(report))
}

/// POST /api/v1/keywords/rank
///
/// Frequency ranking only. Never calls the extraction service.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    let top_n = resolve_top_n(&state, request.top_n)?;
    let ranked_keywords = state.ranker.rank(&request.text, Some(top_n));
    Ok(Json(RankResponse { ranked_keywords }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn extract(
    state: &AppState,
    jd_text: &str,
    api_key: Option<String>,
    top_n: Option<usize>,
    include_frequency: Option<bool>,
) -> Result<ExtractionReport, AppError> {
    let options = ExtractionOptions {
        top_n: resolve_top_n(state, top_n)?,
        include_frequency: include_frequency.unwrap_or(false),
        fallback_on_failure: state.config.frequency_fallback,
    };

    let extractor = state
        .credentials
        .then(UserEntryProvider::new(api_key))
        .resolve()
        .map(|credential| {
            info!("Using API key from {}", credential.source);
            LlmKeywordExtractor::new(state.llm.clone(), credential.key)
        });

    let extractor = extractor
        .as_ref()
        .map(|e| e as &dyn KeywordExtractor)
        .map_err(Clone::clone);

    run_extraction(jd_text, extractor, &state.ranker, &options).await
}

fn resolve_top_n(state: &AppState, requested: Option<usize>) -> Result<usize, AppError> {
    let top_n = requested.unwrap_or(state.ranker.default_top_n());
    if top_n == 0 || top_n > state.config.max_top_n {
        return Err(AppError::Validation(format!(
            "top_n must be between 1 and {}",
            state.config.max_top_n
        )));
    }
    Ok(top_n)
}

fn parse_optional(raw: &str, field: &str) -> Result<Option<usize>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<usize>()
        .map(Some)
        .map_err(|_| AppError::Validation(format!("{field} must be a positive integer")))
}

/// HTML checkboxes send "on"; API clients send true/false.
fn parse_flag(raw: &str) -> Result<Option<bool>, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "true" | "on" | "1" | "yes" => Ok(Some(true)),
        "false" | "off" | "0" | "no" => Ok(Some(false)),
        other => Err(AppError::Validation(format!(
            "include_frequency must be a boolean, got '{other}'"
        ))),
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("The uploaded file exceeds the size limit".to_string())
    } else {
        AppError::Validation(format!("Malformed upload: {}", e.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_variants() {
        assert_eq!(parse_flag("on").unwrap(), Some(true));
        assert_eq!(parse_flag(" FALSE ").unwrap(), Some(false));
        assert_eq!(parse_flag("").unwrap(), None);
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn test_parse_optional_top_n() {
        assert_eq!(parse_optional("15", "top_n").unwrap(), Some(15));
        assert_eq!(parse_optional("  ", "top_n").unwrap(), None);
        assert!(parse_optional("-3", "top_n").is_err());
        assert!(parse_optional("ten", "top_n").is_err());
    }
}
