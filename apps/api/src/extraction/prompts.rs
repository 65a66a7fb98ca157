// Prompt constants for hosted keyword extraction.

/// System prompt for keyword extraction.
pub const EXTRACT_SYSTEM: &str =
    "You are a helpful assistant that extracts and categorizes keywords.";

/// Keyword extraction prompt template. Replace `{jd_text}` before sending.
pub const EXTRACT_PROMPT_TEMPLATE: &str =
    "Extract and categorize keywords from this job description:\n{jd_text}";

pub fn build_extract_prompt(jd_text: &str) -> String {
    EXTRACT_PROMPT_TEMPLATE.replace("{jd_text}", jd_text)
}
