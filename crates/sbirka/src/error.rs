//! Error taxonomy for the extraction pipeline.
//!
//! Only transport failures and request validation raise errors. Extraction
//! ambiguity (no sections found, a section number that matches nothing)
//! degrades to empty results instead, so the fallback chain can treat
//! "found nothing" and "provider errored" the same way.

use std::time::Duration;

use crate::types::Provider;

/// A failed retrieval of one URL, before any provider semantics apply.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered, but with a non-success status.
    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    /// The rendered-mode browser could not be launched or driven.
    #[error("browser error: {0}")]
    Browser(String),
}

impl FetchError {
    /// Whether this is the provider saying "no such view" (4xx) rather than
    /// being unreachable. Some views are legitimately absent for some laws.
    pub fn is_missing_view(&self) -> bool {
        matches!(self, FetchError::Status { status } if (400..500).contains(status))
    }
}

/// Errors surfaced by source adapters and the fallback chain.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The law reference matched neither accepted citation form.
    #[error("invalid law identifier {input:?}: expected \"number/year\" or \"year-number\"")]
    InvalidIdentifier { input: String },

    /// A required disjunctive parameter is missing.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The provider addresses laws by slug and none is known for this one.
    /// Recoverable: upstream treats it like an empty result.
    #[error("no {provider} slug known for law {code}")]
    SlugNotFound { provider: Provider, code: String },

    /// Transport or navigation failure while talking to a provider.
    #[error("{provider} fetch failed for {url}: {cause}")]
    FetchFailed {
        provider: Provider,
        url: String,
        cause: String,
    },

    /// Every source in the chain was exhausted. Carries each attempt's cause
    /// in the order they were made; the first cause is never dropped.
    #[error("all sources failed: {}", render_attempts(.attempts))]
    AllSourcesFailed { attempts: Vec<(Provider, String)> },
}

impl SourceError {
    pub fn fetch_failed(provider: Provider, url: impl Into<String>, cause: &FetchError) -> Self {
        SourceError::FetchFailed {
            provider,
            url: url.into(),
            cause: cause.to_string(),
        }
    }
}

fn render_attempts(attempts: &[(Provider, String)]) -> String {
    attempts
        .iter()
        .map(|(provider, cause)| format!("{provider}: {cause}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_sources_failed_lists_every_attempt() {
        let err = SourceError::AllSourcesFailed {
            attempts: vec![
                (Provider::ZakonyProLidi, "HTTP status 503".to_string()),
                (Provider::Kurzy, "request timed out after 10s".to_string()),
            ],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("zakonyprolidi.cz: HTTP status 503"));
        assert!(rendered.contains("kurzy.cz: request timed out"));
    }

    #[test]
    fn missing_view_covers_client_errors_only() {
        assert!(FetchError::Status { status: 404 }.is_missing_view());
        assert!(FetchError::Status { status: 410 }.is_missing_view());
        assert!(!FetchError::Status { status: 503 }.is_missing_view());
        assert!(!FetchError::Transport("connection refused".to_string()).is_missing_view());
    }
}
