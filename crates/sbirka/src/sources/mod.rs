//! Provider adapters: one trait, two independent source websites.
//!
//! An adapter owns everything provider-specific, from URL schemes to markup
//! quirks, and maps it all into the canonical types. "This provider cannot
//! answer that" is an empty result, not an error, so the fallback chain can
//! treat adapters uniformly.

pub mod kurzy;
pub mod zakonyprolidi;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::types::{
    LawChange, LawDocument, Provider, SearchQuery, SearchResult, Section, SectionQuery,
};

pub use kurzy::Kurzy;
pub use zakonyprolidi::ZakonyProLidi;

/// The four document operations every provider adapter exposes.
#[async_trait]
pub trait LawSource: Send + Sync {
    /// Which website this adapter scrapes.
    fn provider(&self) -> Provider;

    /// Full-text law search. Empty output is a normal outcome.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SourceError>;

    /// Fetch one law, optionally narrowed to a single section. Unparseable
    /// markup degrades to an unstructured or empty document; only transport
    /// and identifier failures raise.
    async fn fetch_document(
        &self,
        code: &str,
        section: Option<&str>,
    ) -> Result<LawDocument, SourceError>;

    /// Amendment timeline, optionally bounded below by an ISO date.
    async fn changes(
        &self,
        code: &str,
        date_from: Option<&str>,
    ) -> Result<Vec<LawChange>, SourceError>;

    /// Find sections by number and/or keyword, optionally scoped to one law.
    async fn search_sections(&self, query: &SectionQuery) -> Result<Vec<Section>, SourceError>;
}
