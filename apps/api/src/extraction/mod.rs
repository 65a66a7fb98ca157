// Keyword extraction: hosted chat-completion extraction with a local
// frequency-ranking fallback, plus the input surfaces (pasted text, uploads).
// All LLM calls go through llm_client — no direct HTTP calls here.

pub mod extractor;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod upload;
