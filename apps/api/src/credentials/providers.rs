use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::warn;

use crate::credentials::{CredentialProvider, CredentialSource};

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Reads the key from a top-level string entry of a TOML secrets file.
///
/// A missing file is simply absent. An unreadable or malformed file is logged
/// and treated as absent so the next provider gets a chance.
#[derive(Debug, Clone)]
pub struct SecretsFileProvider {
    path: PathBuf,
    key: String,
}

impl SecretsFileProvider {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }
}

impl CredentialProvider for SecretsFileProvider {
    fn source(&self) -> CredentialSource {
        CredentialSource::SecretsStore
    }

    fn fetch(&self) -> Option<String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read secrets file {}: {e}", self.path.display());
                return None;
            }
        };

        let table: toml::Table = match raw.parse() {
            Ok(table) => table,
            Err(e) => {
                warn!("Ignoring malformed secrets file {}: {e}", self.path.display());
                return None;
            }
        };

        table
            .get(&self.key)
            .and_then(|v| v.as_str())
            .map(String::from)
            .and_then(non_blank)
    }
}

/// Reads the key from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvProvider {
    var: String,
}

impl EnvProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvProvider {
    fn source(&self) -> CredentialSource {
        CredentialSource::Environment
    }

    fn fetch(&self) -> Option<String> {
        std::env::var(&self.var).ok().and_then(non_blank)
    }
}

/// A key typed into the form for this request only.
#[derive(Debug, Clone, Default)]
pub struct UserEntryProvider {
    value: Option<String>,
}

impl UserEntryProvider {
    pub fn new(value: Option<String>) -> Self {
        Self { value }
    }
}

impl CredentialProvider for UserEntryProvider {
    fn source(&self) -> CredentialSource {
        CredentialSource::UserEntry
    }

    fn fetch(&self) -> Option<String> {
        self.value.clone().and_then(non_blank)
    }
}
