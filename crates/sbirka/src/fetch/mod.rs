//! Markup retrieval: one interface, two transport strategies.
//!
//! Static mode is a plain HTTP GET; rendered mode drives a headless browser
//! for providers that only assemble their document bodies client-side. Both
//! yield the same thing, a raw markup string, so everything downstream is
//! transport-agnostic.

pub mod browser;
pub mod http;

use std::str::FromStr;

use async_trait::async_trait;

use crate::error::FetchError;

pub use browser::{BrowserFetcher, RenderOptions};
pub use http::HttpFetcher;

/// Browser-like identity sent by both transports. The legal providers vary
/// their markup (or refuse outright) for obvious non-browser clients.
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Transport strategy for a provider, chosen per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    #[default]
    Static,
    Rendered,
}

impl FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(FetchMode::Static),
            "rendered" => Ok(FetchMode::Rendered),
            other => Err(format!(
                "unknown fetch mode {other:?} (expected \"static\" or \"rendered\")"
            )),
        }
    }
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchMode::Static => f.write_str("static"),
            FetchMode::Rendered => f.write_str("rendered"),
        }
    }
}

/// Retrieves raw markup for a URL.
#[async_trait]
pub trait MarkupFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;

    /// Release long-lived resources. Default is a no-op; the rendered
    /// fetcher closes its shared browser here.
    async fn shutdown(&self) {}
}
