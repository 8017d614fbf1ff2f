//! Cross-provider fallback for the four document operations.
//!
//! The primary provider is always tried first; a failure or an empty
//! outcome moves on to the secondary. "Found nothing" and "provider
//! errored" are deliberately the same trigger: a scraper that silently
//! parses zero sections out of a redesigned page is indistinguishable from
//! a broken one. Only when every source has been exhausted does the chain
//! raise, and then with every attempt's cause attached.
//!
//! Two errors step outside that rule. A malformed citation aborts the
//! chain at once, since both providers parse citations identically and a
//! second attempt could only repeat the refusal. A missing slug on the
//! secondary is downgraded to an empty outcome: the law simply has no
//! page on that provider.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::SourceError;
use crate::sources::LawSource;
use crate::types::{
    LawChange, LawDocument, Provider, SearchQuery, SearchResult, Section, SectionQuery, Sourced,
};

const NO_RESULTS: &str = "returned no results";

pub struct SourceChain {
    primary: Arc<dyn LawSource>,
    secondary: Arc<dyn LawSource>,
}

impl SourceChain {
    pub fn new(primary: Arc<dyn LawSource>, secondary: Arc<dyn LawSource>) -> Self {
        Self { primary, secondary }
    }

    pub fn providers(&self) -> (Provider, Provider) {
        (self.primary.provider(), self.secondary.provider())
    }

    pub async fn search(
        &self,
        query: &SearchQuery,
    ) -> Result<Sourced<Vec<SearchResult>>, SourceError> {
        let mut attempts = Vec::new();
        match self.primary.search(query).await {
            Ok(results) if !results.is_empty() => {
                return Ok(Sourced::new(self.primary.provider(), results));
            }
            Ok(_) => self.note_empty(&mut attempts),
            Err(e @ SourceError::InvalidIdentifier { .. }) => return Err(e),
            Err(e) => self.note_failure(&mut attempts, e),
        }

        match self.secondary.search(query).await {
            Ok(results) => Ok(Sourced::new(self.secondary.provider(), results)),
            Err(SourceError::SlugNotFound { .. }) => {
                Ok(Sourced::new(self.secondary.provider(), Vec::new()))
            }
            Err(e) => {
                attempts.push((self.secondary.provider(), e.to_string()));
                Err(SourceError::AllSourcesFailed { attempts })
            }
        }
    }

    pub async fn fetch_document(
        &self,
        code: &str,
        section: Option<&str>,
    ) -> Result<Sourced<LawDocument>, SourceError> {
        let mut attempts = Vec::new();
        match self.primary.fetch_document(code, section).await {
            Ok(doc) if !doc.is_empty() => {
                return Ok(Sourced::new(self.primary.provider(), doc));
            }
            Ok(_) => self.note_empty(&mut attempts),
            Err(e @ SourceError::InvalidIdentifier { .. }) => return Err(e),
            Err(e) => self.note_failure(&mut attempts, e),
        }

        match self.secondary.fetch_document(code, section).await {
            Ok(doc) => Ok(Sourced::new(self.secondary.provider(), doc)),
            Err(SourceError::SlugNotFound { .. }) => Ok(Sourced::new(
                self.secondary.provider(),
                LawDocument::not_found(code),
            )),
            Err(e) => {
                attempts.push((self.secondary.provider(), e.to_string()));
                Err(SourceError::AllSourcesFailed { attempts })
            }
        }
    }

    pub async fn changes(
        &self,
        code: &str,
        date_from: Option<&str>,
    ) -> Result<Sourced<Vec<LawChange>>, SourceError> {
        let mut attempts = Vec::new();
        match self.primary.changes(code, date_from).await {
            Ok(changes) if !changes.is_empty() => {
                return Ok(Sourced::new(self.primary.provider(), changes));
            }
            Ok(_) => self.note_empty(&mut attempts),
            Err(e @ SourceError::InvalidIdentifier { .. }) => return Err(e),
            Err(e) => self.note_failure(&mut attempts, e),
        }

        match self.secondary.changes(code, date_from).await {
            Ok(changes) => Ok(Sourced::new(self.secondary.provider(), changes)),
            Err(SourceError::SlugNotFound { .. }) => {
                Ok(Sourced::new(self.secondary.provider(), Vec::new()))
            }
            Err(e) => {
                attempts.push((self.secondary.provider(), e.to_string()));
                Err(SourceError::AllSourcesFailed { attempts })
            }
        }
    }

    /// Section search falls back only when the secondary could actually
    /// serve the query, which needs both a law code and a section number.
    /// With the gate closed the primary's outcome stands alone, whatever
    /// it was.
    pub async fn search_sections(
        &self,
        query: &SectionQuery,
    ) -> Result<Sourced<Vec<Section>>, SourceError> {
        let gate_open = query.law_code.is_some() && query.section_number.is_some();

        let mut attempts = Vec::new();
        match self.primary.search_sections(query).await {
            Ok(found) if !found.is_empty() => {
                return Ok(Sourced::new(self.primary.provider(), found));
            }
            Ok(found) if !gate_open => {
                return Ok(Sourced::new(self.primary.provider(), found));
            }
            Ok(_) => self.note_empty(&mut attempts),
            Err(e @ SourceError::InvalidIdentifier { .. }) => return Err(e),
            Err(e) if !gate_open => return Err(e),
            Err(e) => self.note_failure(&mut attempts, e),
        }

        match self.secondary.search_sections(query).await {
            Ok(found) => Ok(Sourced::new(self.secondary.provider(), found)),
            Err(SourceError::SlugNotFound { .. }) => {
                Ok(Sourced::new(self.secondary.provider(), Vec::new()))
            }
            Err(e) => {
                attempts.push((self.secondary.provider(), e.to_string()));
                Err(SourceError::AllSourcesFailed { attempts })
            }
        }
    }

    fn note_empty(&self, attempts: &mut Vec<(Provider, String)>) {
        info!(
            "{} {NO_RESULTS}, trying {}",
            self.primary.provider(),
            self.secondary.provider()
        );
        attempts.push((self.primary.provider(), NO_RESULTS.to_string()));
    }

    fn note_failure(&self, attempts: &mut Vec<(Provider, String)>, error: SourceError) {
        warn!(
            "{} failed ({error}), trying {}",
            self.primary.provider(),
            self.secondary.provider()
        );
        attempts.push((self.primary.provider(), error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::types::DocumentType;

    enum Outcome {
        Full,
        Empty,
        Fail(String),
        BadCitation,
        NoSlug,
    }

    /// Scripted source: every operation is driven off one canned outcome.
    /// Calls are counted across operations.
    struct StubSource {
        provider: Provider,
        outcome: Outcome,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn scripted(provider: Provider, outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                provider,
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        fn with_content(provider: Provider) -> Arc<Self> {
            Self::scripted(provider, Outcome::Full)
        }

        fn empty(provider: Provider) -> Arc<Self> {
            Self::scripted(provider, Outcome::Empty)
        }

        fn failing(provider: Provider, cause: &str) -> Arc<Self> {
            Self::scripted(provider, Outcome::Fail(cause.to_string()))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn gate<T>(&self, full: T, empty: T) -> Result<T, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Outcome::Full => Ok(full),
                Outcome::Empty => Ok(empty),
                Outcome::Fail(cause) => Err(SourceError::FetchFailed {
                    provider: self.provider,
                    url: "https://example.test/".to_string(),
                    cause: cause.clone(),
                }),
                Outcome::BadCitation => Err(SourceError::InvalidIdentifier {
                    input: "§§".to_string(),
                }),
                Outcome::NoSlug => Err(SourceError::SlugNotFound {
                    provider: self.provider,
                    code: "99/1999".to_string(),
                }),
            }
        }
    }

    fn search_hit(code: &str) -> SearchResult {
        SearchResult {
            code: code.parse().unwrap(),
            title: format!("Zákon {code}"),
            url: format!("https://example.test/{code}"),
            doc_type: DocumentType::Law,
            year: None,
        }
    }

    fn full_document(provider: Provider) -> LawDocument {
        LawDocument {
            code: "89/2012".to_string(),
            title: format!("Dokument z {provider}"),
            full_text: "§1\nObsah.".to_string(),
            url: "https://example.test/89-2012".to_string(),
            effective_date: None,
            sections: Some(vec![section()]),
        }
    }

    fn empty_document() -> LawDocument {
        LawDocument {
            code: "89/2012".to_string(),
            title: "89/2012".to_string(),
            full_text: String::new(),
            url: "https://example.test/89-2012".to_string(),
            effective_date: None,
            sections: None,
        }
    }

    fn section() -> Section {
        Section {
            number: "§1".to_string(),
            title: None,
            text: "Obsah.".to_string(),
        }
    }

    #[async_trait]
    impl LawSource for StubSource {
        fn provider(&self) -> Provider {
            self.provider
        }

        async fn search(&self, _query: &SearchQuery) -> Result<Vec<SearchResult>, SourceError> {
            self.gate(vec![search_hit("89/2012")], Vec::new())
        }

        async fn fetch_document(
            &self,
            _code: &str,
            _section: Option<&str>,
        ) -> Result<LawDocument, SourceError> {
            self.gate(full_document(self.provider), empty_document())
        }

        async fn changes(
            &self,
            _code: &str,
            _date_from: Option<&str>,
        ) -> Result<Vec<LawChange>, SourceError> {
            self.gate(
                vec![LawChange {
                    date: "2013-01-01".to_string(),
                    amending_law: "303/2013 Sb.".to_string(),
                    description: "Novela".to_string(),
                    change_type: crate::types::ChangeType::Amendment,
                }],
                Vec::new(),
            )
        }

        async fn search_sections(
            &self,
            _query: &SectionQuery,
        ) -> Result<Vec<Section>, SourceError> {
            self.gate(vec![section()], Vec::new())
        }
    }

    #[tokio::test]
    async fn primary_success_never_touches_the_secondary() {
        let primary = StubSource::with_content(Provider::ZakonyProLidi);
        let secondary = StubSource::with_content(Provider::Kurzy);
        let chain = SourceChain::new(primary, secondary.clone());

        let sourced = chain.search(&SearchQuery::new("zákoník")).await.unwrap();
        assert_eq!(sourced.provider, Provider::ZakonyProLidi);
        assert_eq!(sourced.value.len(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn empty_primary_falls_back_and_annotates_the_secondary() {
        let chain = SourceChain::new(
            StubSource::empty(Provider::ZakonyProLidi),
            StubSource::with_content(Provider::Kurzy),
        );
        let sourced = chain.search(&SearchQuery::new("89/2012")).await.unwrap();
        assert_eq!(sourced.provider, Provider::Kurzy);
        assert_eq!(sourced.value.len(), 1);
    }

    #[tokio::test]
    async fn failing_primary_falls_back_too() {
        let chain = SourceChain::new(
            StubSource::failing(Provider::ZakonyProLidi, "HTTP status 503"),
            StubSource::with_content(Provider::Kurzy),
        );
        let sourced = chain
            .fetch_document("89/2012", None)
            .await
            .unwrap();
        assert_eq!(sourced.provider, Provider::Kurzy);
        assert!(!sourced.value.is_empty());
    }

    #[tokio::test]
    async fn empty_document_counts_as_not_found() {
        let primary = StubSource::empty(Provider::ZakonyProLidi);
        let secondary = StubSource::with_content(Provider::Kurzy);
        let chain = SourceChain::new(primary.clone(), secondary.clone());

        let sourced = chain.fetch_document("89/2012", Some("154")).await.unwrap();
        assert_eq!(sourced.provider, Provider::Kurzy);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn both_failures_compose_into_one_error() {
        let chain = SourceChain::new(
            StubSource::failing(Provider::ZakonyProLidi, "HTTP status 503"),
            StubSource::failing(Provider::Kurzy, "connection refused"),
        );
        let err = chain.search(&SearchQuery::new("cokoliv")).await.unwrap_err();
        let SourceError::AllSourcesFailed { attempts } = err else {
            panic!("expected the composite error, got {err:?}");
        };
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].0, Provider::ZakonyProLidi);
        assert!(attempts[0].1.contains("503"));
        assert_eq!(attempts[1].0, Provider::Kurzy);
        assert!(attempts[1].1.contains("connection refused"));
    }

    #[tokio::test]
    async fn malformed_citation_aborts_without_touching_the_secondary() {
        let primary = StubSource::scripted(Provider::ZakonyProLidi, Outcome::BadCitation);
        let secondary = StubSource::with_content(Provider::Kurzy);
        let chain = SourceChain::new(primary, secondary.clone());

        let err = chain.fetch_document("§§", None).await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidIdentifier { .. }));
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn missing_secondary_slug_reads_as_not_found() {
        let chain = SourceChain::new(
            StubSource::failing(Provider::ZakonyProLidi, "HTTP status 503"),
            StubSource::scripted(Provider::Kurzy, Outcome::NoSlug),
        );
        let sourced = chain.fetch_document("99/1999", None).await.unwrap();
        assert_eq!(sourced.provider, Provider::Kurzy);
        assert!(sourced.value.is_empty());
        assert_eq!(sourced.value.code, "99/1999");
    }

    #[tokio::test]
    async fn empty_everywhere_is_a_successful_empty_outcome() {
        let chain = SourceChain::new(
            StubSource::empty(Provider::ZakonyProLidi),
            StubSource::empty(Provider::Kurzy),
        );
        let sourced = chain.search(&SearchQuery::new("nic")).await.unwrap();
        assert_eq!(sourced.provider, Provider::Kurzy);
        assert!(sourced.value.is_empty());
    }

    #[tokio::test]
    async fn changes_fall_back_like_every_other_operation() {
        let chain = SourceChain::new(
            StubSource::empty(Provider::ZakonyProLidi),
            StubSource::with_content(Provider::Kurzy),
        );
        let sourced = chain.changes("89/2012", None).await.unwrap();
        assert_eq!(sourced.provider, Provider::Kurzy);
        assert_eq!(sourced.value.len(), 1);
    }

    #[tokio::test]
    async fn closed_gate_keeps_the_primary_outcome() {
        let primary = StubSource::empty(Provider::ZakonyProLidi);
        let secondary = StubSource::with_content(Provider::Kurzy);
        let chain = SourceChain::new(primary, secondary.clone());

        // Keyword-only query: the secondary could not serve it.
        let query = SectionQuery {
            keyword: Some("odstoupení".to_string()),
            ..SectionQuery::default()
        };
        let sourced = chain.search_sections(&query).await.unwrap();
        assert_eq!(sourced.provider, Provider::ZakonyProLidi);
        assert!(sourced.value.is_empty());
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn closed_gate_propagates_the_primary_error_unwrapped() {
        let chain = SourceChain::new(
            StubSource::failing(Provider::ZakonyProLidi, "HTTP status 500"),
            StubSource::with_content(Provider::Kurzy),
        );
        let query = SectionQuery {
            keyword: Some("smlouva".to_string()),
            ..SectionQuery::default()
        };
        let err = chain.search_sections(&query).await.unwrap_err();
        assert!(matches!(err, SourceError::FetchFailed { .. }));
    }

    #[tokio::test]
    async fn open_gate_falls_back_on_empty_sections() {
        let chain = SourceChain::new(
            StubSource::empty(Provider::ZakonyProLidi),
            StubSource::with_content(Provider::Kurzy),
        );
        let query = SectionQuery {
            section_number: Some("154".to_string()),
            law_code: Some("89/2012".to_string()),
            ..SectionQuery::default()
        };
        let sourced = chain.search_sections(&query).await.unwrap();
        assert_eq!(sourced.provider, Provider::Kurzy);
        assert_eq!(sourced.value.len(), 1);
    }
}
