//! Credential resolution for the hosted keyword extractor.
//!
//! The API key is looked up through an ordered `CredentialChain`. The default chain
//! is secrets store → environment; request handlers append the user's own entry
//! as the last provider. The first provider that yields a value wins, and that value
//! must pass `ApiKey` validation before any network call is made.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub mod providers;

pub use providers::{EnvProvider, SecretsFileProvider, UserEntryProvider};

/// Prefixes a key must start with to be sent upstream.
pub const RECOGNIZED_PREFIXES: &[&str] = &["sk-"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    SecretsStore,
    Environment,
    UserEntry,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CredentialSource::SecretsStore => "secrets store",
            CredentialSource::Environment => "environment",
            CredentialSource::UserEntry => "user entry",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("No API key found in the secrets store, the environment, or the request")]
    Missing,

    #[error("API key from {origin} does not look like a valid key (expected prefix 'sk-')")]
    InvalidFormat { origin: CredentialSource },
}

/// A validated API key. `Debug` and `Display` never print the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Validates a raw key: trimmed, no inner whitespace, recognized prefix with a body.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim();
        if key.chars().any(char::is_whitespace) {
            return None;
        }
        RECOGNIZED_PREFIXES
            .iter()
            .any(|prefix| key.len() > prefix.len() && key.starts_with(prefix))
            .then(|| ApiKey(key.to_string()))
    }

    /// The raw secret, for the Authorization header only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({self})")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = RECOGNIZED_PREFIXES
            .iter()
            .find(|p| self.0.starts_with(*p))
            .copied()
            .unwrap_or("");
        write!(f, "{prefix}****")
    }
}

/// A key together with where it came from.
#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    pub key: ApiKey,
    pub source: CredentialSource,
}

/// One place an API key may come from.
pub trait CredentialProvider: Send + Sync {
    fn source(&self) -> CredentialSource;

    /// Returns the raw value if this provider has one. Blank values count as absent.
    fn fetch(&self) -> Option<String>;
}

/// An ordered list of providers, tried first to last.
#[derive(Clone, Default)]
pub struct CredentialChain {
    providers: Vec<Arc<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new(providers: Vec<Arc<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Secrets store, then environment.
    pub fn from_config(config: &Config) -> Self {
        Self::new(vec![
            Arc::new(SecretsFileProvider::new(
                config.secrets_path.clone(),
                config.api_key_var.clone(),
            )),
            Arc::new(EnvProvider::new(config.api_key_var.clone())),
        ])
    }

    /// Returns a new chain with `provider` tried after every existing one.
    pub fn then(&self, provider: impl CredentialProvider + 'static) -> Self {
        let mut providers = self.providers.clone();
        providers.push(Arc::new(provider));
        Self { providers }
    }

    pub fn sources(&self) -> Vec<CredentialSource> {
        self.providers.iter().map(|p| p.source()).collect()
    }

    /// Resolves the first present value. A present but malformed value is rejected
    /// rather than skipped.
    pub fn resolve(&self) -> Result<ResolvedCredential, CredentialError> {
        for provider in &self.providers {
            let Some(raw) = provider.fetch() else {
                continue;
            };
            let source = provider.source();
            debug!("API key found in {source}");
            return ApiKey::parse(&raw)
                .map(|key| ResolvedCredential { key, source })
                .ok_or(CredentialError::InvalidFormat { origin: source });
        }
        Err(CredentialError::Missing)
    }
}

impl fmt::Debug for CredentialChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialChain")
            .field("sources", &self.sources())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(CredentialSource, Option<&'static str>);

    impl CredentialProvider for Fixed {
        fn source(&self) -> CredentialSource {
            self.0
        }

        fn fetch(&self) -> Option<String> {
            self.1.map(String::from)
        }
    }

    fn chain(entries: Vec<Fixed>) -> CredentialChain {
        CredentialChain::new(
            entries
                .into_iter()
                .map(|p| Arc::new(p) as Arc<dyn CredentialProvider>)
                .collect(),
        )
    }

    #[test]
    fn test_api_key_accepts_recognized_prefix() {
        assert!(ApiKey::parse("sk-abc123").is_some());
        assert!(ApiKey::parse("  sk-proj-abc123  ").is_some());
    }

    #[test]
    fn test_api_key_rejects_bad_values() {
        assert!(ApiKey::parse("").is_none());
        assert!(ApiKey::parse("sk-").is_none());
        assert!(ApiKey::parse("pk-abc123").is_none());
        assert!(ApiKey::parse("sk-abc 123").is_none());
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::parse("sk-supersecret").unwrap();
        assert_eq!(format!("{key:?}"), "ApiKey(sk-****)");
        assert!(!key.to_string().contains("supersecret"));
        assert_eq!(key.expose(), "sk-supersecret");
    }

    #[test]
    fn test_first_present_provider_wins() {
        let resolved = chain(vec![
            Fixed(CredentialSource::SecretsStore, Some("sk-from-secrets")),
            Fixed(CredentialSource::Environment, Some("sk-from-env")),
        ])
        .resolve()
        .unwrap();
        assert_eq!(resolved.source, CredentialSource::SecretsStore);
        assert_eq!(resolved.key.expose(), "sk-from-secrets");
    }

    #[test]
    fn test_absent_providers_are_skipped() {
        let resolved = chain(vec![
            Fixed(CredentialSource::SecretsStore, None),
            Fixed(CredentialSource::Environment, None),
        ])
        .then(Fixed(CredentialSource::UserEntry, Some("sk-typed")))
        .resolve()
        .unwrap();
        assert_eq!(resolved.source, CredentialSource::UserEntry);
    }

    #[test]
    fn test_malformed_value_is_rejected_not_skipped() {
        let err = chain(vec![
            Fixed(CredentialSource::SecretsStore, None),
            Fixed(CredentialSource::Environment, Some("not-a-key")),
            Fixed(CredentialSource::UserEntry, Some("sk-valid")),
        ])
        .resolve()
        .unwrap_err();
        assert_eq!(
            err,
            CredentialError::InvalidFormat {
                origin: CredentialSource::Environment
            }
        );
    }

    #[test]
    fn test_empty_chain_is_missing() {
        assert_eq!(
            CredentialChain::default().resolve().unwrap_err(),
            CredentialError::Missing
        );
    }

    #[test]
    fn test_then_does_not_mutate_original() {
        let base = chain(vec![Fixed(CredentialSource::Environment, None)]);
        let extended = base.then(Fixed(CredentialSource::UserEntry, Some("sk-x1")));
        assert_eq!(base.sources().len(), 1);
        assert_eq!(
            extended.sources(),
            vec![CredentialSource::Environment, CredentialSource::UserEntry]
        );
    }
}
