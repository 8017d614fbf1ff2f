//! Canonical entities shared by every provider adapter.
//!
//! Adapters map provider-specific markup into these shapes; nothing
//! downstream of an adapter knows which website a value came from except
//! through the explicit [`Sourced`] annotation.

use serde::{Deserialize, Serialize};

use crate::identifier::LawIdentifier;

/// An external website legal text is scraped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    ZakonyProLidi,
    Kurzy,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::ZakonyProLidi => write!(f, "zakonyprolidi.cz"),
            Provider::Kurzy => write!(f, "kurzy.cz"),
        }
    }
}

/// Category of legal document, as exposed in search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    Law,
    Treaty,
    EuLaw,
    CourtDecision,
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DocumentType::Law => "law",
            DocumentType::Treaty => "treaty",
            DocumentType::EuLaw => "eu-law",
            DocumentType::CourtDecision => "court-decision",
        };
        f.write_str(label)
    }
}

/// Kind of change an amendment record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    Amendment,
    Repeal,
    NewProvision,
    Other,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChangeType::Amendment => "amendment",
            ChangeType::Repeal => "repeal",
            ChangeType::NewProvision => "new-provision",
            ChangeType::Other => "other",
        };
        f.write_str(label)
    }
}

/// One numbered provision of a law.
///
/// `number` carries the canonical `§N` form with an optional letter suffix
/// (`§154`, `§154a`). `text` may be empty for entries that came from a table
/// of contents rather than a full document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
}

/// A fetched law, either whole or narrowed to one section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawDocument {
    /// The citation the caller asked for, echoed back. Unlike
    /// [`SearchResult::code`] this may be an opaque provider path segment.
    pub code: String,
    pub title: String,
    /// Derived from `sections` when structure was found; otherwise bounded
    /// visible text of the page.
    pub full_text: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    /// `None` when extraction degraded to unstructured text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,
}

impl LawDocument {
    /// Shell for a law no source could provide content for.
    pub fn not_found(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            title: code.clone(),
            code,
            full_text: String::new(),
            url: String::new(),
            effective_date: None,
            sections: None,
        }
    }

    /// True when extraction produced neither structure nor text. The chain
    /// treats such a document as "found nothing" and moves to the next
    /// source.
    pub fn is_empty(&self) -> bool {
        self.full_text.trim().is_empty()
            && self.sections.as_ref().is_none_or(|s| s.is_empty())
    }
}

/// One hit from a law search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub code: LawIdentifier,
    pub title: String,
    pub url: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
}

/// One record in a law's amendment timeline, with the date already
/// normalized to ISO `YYYY-MM-DD` where the source format was recognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawChange {
    pub date: String,
    pub amending_law: String,
    pub description: String,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
}

/// Parameters for a law search.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub doc_type: Option<DocumentType>,
    pub year: Option<u16>,
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            doc_type: None,
            year: None,
            limit: 10,
        }
    }
}

/// Parameters for a section search. At least one of `section_number` or
/// `keyword` must be present; adapters reject a query with neither.
#[derive(Debug, Clone, Default)]
pub struct SectionQuery {
    pub section_number: Option<String>,
    pub keyword: Option<String>,
    pub law_code: Option<String>,
}

/// A value annotated with the provider that produced it, so callers can say
/// which website actually satisfied the request.
#[derive(Debug, Clone, Serialize)]
pub struct Sourced<T> {
    pub provider: Provider,
    pub value: T,
}

impl<T> Sourced<T> {
    pub fn new(provider: Provider, value: T) -> Self {
        Self { provider, value }
    }
}
