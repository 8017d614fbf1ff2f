//! Adapter for www.zakonyprolidi.cz, the primary provider.
//!
//! Documents live under `/cs/{year}-{number}` paths, search under
//! `/hledani`, amendment history under `/cs/{year}-{number}/zmeny`. Result
//! markup is recognized by link shape rather than page layout, which has
//! survived several of the site's redesigns.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::SourceError;
use crate::extract::changes::{self, ChangeKeywords};
use crate::extract::{dom, sections};
use crate::fetch::MarkupFetcher;
use crate::identifier::LawIdentifier;
use crate::sources::LawSource;
use crate::types::{
    DocumentType, LawChange, LawDocument, Provider, SearchQuery, SearchResult, Section,
    SectionQuery,
};

pub const BASE_URL: &str = "https://www.zakonyprolidi.cz";

pub struct ZakonyProLidi {
    fetcher: Arc<dyn MarkupFetcher>,
    base: String,
    keywords: ChangeKeywords,
}

impl ZakonyProLidi {
    pub fn new(fetcher: Arc<dyn MarkupFetcher>) -> Self {
        Self::with_base(fetcher, BASE_URL)
    }

    /// Point the adapter at a different host (tests, mirrors).
    pub fn with_base(fetcher: Arc<dyn MarkupFetcher>, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            fetcher,
            base,
            keywords: ChangeKeywords::default(),
        }
    }

    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        self.fetcher
            .fetch(url)
            .await
            .map_err(|e| SourceError::fetch_failed(Provider::ZakonyProLidi, url, &e))
    }

    /// Document URL for a citation. Tokens that parse get the canonical
    /// `year-number` path; separator-free tokens pass through opaquely so
    /// provider-specific document names keep working.
    fn document_url(&self, code: &str) -> Result<String, SourceError> {
        match LawIdentifier::parse(code) {
            Ok(id) => Ok(format!("{}/cs/{}", self.base, id.year_number())),
            Err(_) if is_opaque_path(code) => Ok(format!("{}/cs/{}", self.base, code.trim())),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl LawSource for ZakonyProLidi {
    fn provider(&self) -> Provider {
        Provider::ZakonyProLidi
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SourceError> {
        // Scoped so the non-Send serializer is dropped before the await.
        let url = {
            let mut params = url::form_urlencoded::Serializer::new(String::new());
            params.append_pair("q", &query.query);
            params.append_pair("area", search_area(query.doc_type));
            if let Some(year) = query.year {
                params.append_pair("year", &year.to_string());
            }
            format!("{}/hledani?{}", self.base, params.finish())
        };

        let html = self.fetch(&url).await?;
        let results = parse_search_results(&html, &self.base, query);
        debug!("search {:?} yielded {} results", query.query, results.len());
        Ok(results)
    }

    async fn fetch_document(
        &self,
        code: &str,
        section: Option<&str>,
    ) -> Result<LawDocument, SourceError> {
        let url = self.document_url(code)?;
        let html = self.fetch(&url).await?;
        Ok(build_document(code, &url, &html, section))
    }

    async fn changes(
        &self,
        code: &str,
        date_from: Option<&str>,
    ) -> Result<Vec<LawChange>, SourceError> {
        let url = format!("{}/zmeny", self.document_url(code)?);
        let html = match self.fetcher.fetch(&url).await {
            Ok(html) => html,
            // Not every law has a history view; a 4xx there is an empty
            // timeline, not a fault.
            Err(e) if e.is_missing_view() => {
                debug!("no changes view at {url} ({e})");
                return Ok(Vec::new());
            }
            Err(e) => return Err(SourceError::fetch_failed(self.provider(), &url, &e)),
        };
        Ok(changes::extract_changes(&html, date_from, &self.keywords))
    }

    async fn search_sections(&self, query: &SectionQuery) -> Result<Vec<Section>, SourceError> {
        if query.section_number.is_none() && query.keyword.is_none() {
            return Err(SourceError::InvalidRequest(
                "at least one of section number or keyword is required".to_string(),
            ));
        }

        let mut terms = Vec::new();
        if let Some(number) = &query.section_number {
            terms.push(number.clone());
        }
        if let Some(keyword) = &query.keyword {
            terms.push(keyword.clone());
        }
        if let Some(code) = &query.law_code {
            terms.push(code.clone());
        }
        // Scoped so the non-Send serializer is dropped before the await.
        let url = {
            let mut params = url::form_urlencoded::Serializer::new(String::new());
            params.append_pair("q", &terms.join(" "));
            format!("{}/hledani?{}", self.base, params.finish())
        };

        let html = self.fetch(&url).await?;
        Ok(parse_section_results(
            &html,
            query.section_number.as_deref(),
        ))
    }
}

fn is_opaque_path(code: &str) -> bool {
    let token = code.trim();
    !token.is_empty()
        && !token.contains('/')
        && !token.contains('-')
        && !token.contains('§')
        && !token.contains(char::is_whitespace)
}

/// zakonyprolidi's search areas by document category; `vse` means "all".
fn search_area(doc_type: Option<DocumentType>) -> &'static str {
    match doc_type {
        Some(DocumentType::Law) => "zakony",
        Some(DocumentType::Treaty) => "smlouvy",
        Some(DocumentType::EuLaw) => "eu",
        Some(DocumentType::CourtDecision) => "soudni",
        None => "vse",
    }
}

/// Recognize result links by shape: an anchor into `/cs/{year}-{number}`
/// whose text names a collection citation ("... Sb."). Deduplicated by law,
/// first occurrence wins, capped at the query limit.
fn parse_search_results(html: &str, base: &str, query: &SearchQuery) -> Vec<SearchResult> {
    let doc = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").unwrap();
    let href_re = Regex::new(r"/cs/(\d{4})-(\d+)").expect("law path regex is valid");
    let code_re = Regex::new(r"(\d+)/(\d{4})").expect("citation regex is valid");

    let mut seen = HashSet::new();
    let mut results = Vec::new();
    for anchor in doc.select(&anchors) {
        if results.len() >= query.limit {
            break;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(href_caps) = href_re.captures(href) else {
            continue;
        };
        let link_text = dom::element_text(anchor);
        if !link_text.contains("Sb.") {
            continue;
        }
        let Some(code) = extract_code(&link_text, &href_caps, &code_re) else {
            continue;
        };
        if !seen.insert(code.clone()) {
            continue;
        }

        let year = query.year.or(Some(code.year()));
        results.push(SearchResult {
            code,
            title: enrich_title(anchor, &link_text),
            url: absolutize(base, href),
            doc_type: query.doc_type.unwrap_or(DocumentType::Law),
            year,
        });
    }
    results
}

/// The law code: from the link text citation when present, else from the
/// path segments.
fn extract_code(
    link_text: &str,
    href_caps: &regex::Captures<'_>,
    code_re: &Regex,
) -> Option<LawIdentifier> {
    if let Some(caps) = code_re.captures(link_text) {
        if let Ok(id) = LawIdentifier::parse(&format!("{}/{}", &caps[1], &caps[2])) {
            return Some(id);
        }
    }
    let year = href_caps[1].parse().ok()?;
    LawIdentifier::new(&href_caps[2], year).ok()
}

/// Search snippets put the law name next to the link, not inside it. When
/// the surrounding block carries meaningfully more text, append it, minus
/// the expander widget's label.
fn enrich_title(anchor: ElementRef, link_text: &str) -> String {
    let parent_text = anchor
        .parent()
        .and_then(ElementRef::wrap)
        .map(dom::element_text)
        .unwrap_or_default();

    let mut title = link_text.to_string();
    if parent_text.len() > link_text.len() + 10 {
        let stripped = parent_text.replacen(link_text, "", 1);
        let expander = Regex::new(r"(?i)Rozbalit obsah.*$").expect("expander regex is valid");
        let rest = expander.replace(&stripped, "").trim().to_string();
        if rest.len() > 5 {
            title = format!("{link_text} {rest}");
        }
    }
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn absolutize(base: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{base}{href}")
    }
}

fn build_document(code: &str, url: &str, html: &str, requested: Option<&str>) -> LawDocument {
    let doc = Html::parse_document(html);

    // Selector lists match in document order, and <title> sits in <head>
    // before any heading; try the headings on their own first.
    let heading_sel = Selector::parse("h1, .law-title").unwrap();
    let title_sel = Selector::parse("title").unwrap();
    let title = doc
        .select(&heading_sel)
        .next()
        .map(dom::element_text)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            doc.select(&title_sel)
                .next()
                .map(dom::element_text)
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| code.to_string());

    let date_sel = Selector::parse("time, .effective-date, .date").unwrap();
    let effective_date = doc
        .select(&date_sel)
        .next()
        .map(dom::element_text)
        .filter(|t| !t.is_empty());

    let extracted = sections::extract_from(&doc);

    let (full_text, section_list) = match requested {
        Some(number) => {
            let matched = sections::filter_by_number(extracted, number);
            if matched.is_empty() {
                // An absent section leaves the document empty; the caller's
                // fallback chain can still try the other provider's
                // per-paragraph view.
                (String::new(), None)
            } else {
                (sections::concat_sections(&matched), Some(matched))
            }
        }
        None if extracted.is_empty() => (sections::fallback_text_from(&doc), None),
        None => (sections::concat_sections(&extracted), Some(extracted)),
    };

    LawDocument {
        code: code.to_string(),
        title,
        full_text,
        url: url.to_string(),
        effective_date,
        sections: section_list,
    }
}

/// Dedicated section-result blocks, when the search view renders them.
fn parse_section_results(html: &str, requested: Option<&str>) -> Vec<Section> {
    let doc = Html::parse_document(html);
    let blocks = Selector::parse(".section-result, .paragraph-result").unwrap();
    let number_sel = Selector::parse(".section-number, .par-number").unwrap();
    let title_sel = Selector::parse(".section-title").unwrap();
    let text_sel = Selector::parse(".section-text, .par-text").unwrap();

    let mut out = Vec::new();
    for block in doc.select(&blocks) {
        let text = dom::first_text(block, &text_sel);
        if text.is_empty() {
            continue;
        }
        let number = dom::first_text(block, &number_sel);
        let number = if number.is_empty() {
            requested.unwrap_or_default().to_string()
        } else {
            number
        };
        let title = Some(dom::first_text(block, &title_sel)).filter(|t| !t.is_empty());
        out.push(Section { number, title, text });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_area_maps_every_document_type() {
        assert_eq!(search_area(Some(DocumentType::Law)), "zakony");
        assert_eq!(search_area(Some(DocumentType::Treaty)), "smlouvy");
        assert_eq!(search_area(Some(DocumentType::EuLaw)), "eu");
        assert_eq!(search_area(Some(DocumentType::CourtDecision)), "soudni");
        assert_eq!(search_area(None), "vse");
    }

    #[test]
    fn opaque_paths_pass_through_but_garbage_does_not() {
        assert!(is_opaque_path("sb2012-89"));
        assert!(!is_opaque_path("89/20"));
        assert!(!is_opaque_path("§154"));
        assert!(!is_opaque_path("dva slova"));
        assert!(!is_opaque_path("  "));
    }

    const SEARCH_PAGE: &str = r#"<html><body>
        <div class="result">
          <a href="/cs/2012-89">89/2012 Sb. Občanský zákoník</a>
          <span>Zákon občanský zákoník Rozbalit obsah paragrafů</span>
        </div>
        <div class="result">
          <a href="/cs/2012-89">89/2012 Sb. (duplikát)</a>
        </div>
        <div class="result">
          <a href="/cs/2006-182">182/2006 Sb. Insolvenční zákon</a>
        </div>
        <a href="/cs/2009-280">bez citace</a>
        <a href="/o-nas">Sb. mimo zákony</a>
    </body></html>"#;

    #[test]
    fn search_results_deduplicate_by_law() {
        let results = parse_search_results(SEARCH_PAGE, BASE_URL, &SearchQuery::new("zákoník"));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].code.to_string(), "89/2012");
        assert_eq!(results[1].code.to_string(), "182/2006");
        assert_eq!(results[0].url, format!("{BASE_URL}/cs/2012-89"));
        assert_eq!(results[0].year, Some(2012));
    }

    #[test]
    fn link_without_citation_text_is_skipped() {
        // "/cs/2009-280" matches by path but its text has no "Sb.".
        let results = parse_search_results(SEARCH_PAGE, BASE_URL, &SearchQuery::new("daně"));
        assert!(results.iter().all(|r| r.code.to_string() != "280/2009"));
    }

    #[test]
    fn search_respects_the_limit() {
        let mut query = SearchQuery::new("zákon");
        query.limit = 1;
        let results = parse_search_results(SEARCH_PAGE, BASE_URL, &query);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn title_enrichment_appends_surrounding_text() {
        let results = parse_search_results(SEARCH_PAGE, BASE_URL, &SearchQuery::new("oz"));
        assert_eq!(
            results[0].title,
            "89/2012 Sb. Občanský zákoník Zákon občanský zákoník"
        );
    }

    #[test]
    fn document_with_markers_keeps_structure() {
        let html = r#"<html><body>
            <h1>Zákon č. 89/2012 Sb.</h1>
            <time>1. 1. 2014</time>
            <div class="law-content">
              <h3>§ 154</h3><p>Tělo sto padesát čtyři.</p>
              <h3>§ 1540</h3><p>Jiné tělo.</p>
            </div>
        </body></html>"#;
        let doc = build_document("89/2012", "https://example.test/cs/2012-89", html, None);
        assert_eq!(doc.title, "Zákon č. 89/2012 Sb.");
        assert_eq!(doc.effective_date.as_deref(), Some("1. 1. 2014"));
        let sections = doc.sections.unwrap();
        assert_eq!(sections.len(), 2);
        assert!(doc.full_text.contains("Tělo sto padesát čtyři."));
    }

    #[test]
    fn head_title_tag_never_beats_the_heading() {
        let html = r#"<html><head><title>Zákon č. 89/2012 Sb. | Zákony pro lidi</title></head>
        <body><h1>Občanský zákoník</h1><main>Text.</main></body></html>"#;
        let doc = build_document("89/2012", "https://example.test/cs/2012-89", html, None);
        assert_eq!(doc.title, "Občanský zákoník");
    }

    #[test]
    fn requested_section_narrows_the_document() {
        let html = r#"<html><body><div class="law-content">
            <h3>§ 154</h3><p>Hledané tělo.</p>
            <h3>§ 1540</h3><p>Past na podřetězce.</p>
        </div></body></html>"#;
        let doc = build_document("89/2012", "https://example.test/cs/2012-89", html, Some("154"));
        let sections = doc.sections.unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].number, "§154");
    }

    #[test]
    fn missing_section_leaves_the_document_empty() {
        let html = r#"<html><body><div class="law-content">
            <h3>§ 1</h3><p>Jen jedna sekce.</p>
        </div></body></html>"#;
        let doc = build_document("89/2012", "https://example.test/cs/2012-89", html, Some("999"));
        assert!(doc.is_empty());
    }

    #[test]
    fn structureless_document_degrades_to_text() {
        let html = "<html><body><main>Prostý text zákona.</main></body></html>";
        let doc = build_document("89/2012", "https://example.test/cs/2012-89", html, None);
        assert!(doc.sections.is_none());
        assert_eq!(doc.full_text, "Prostý text zákona.");
    }

    #[test]
    fn section_result_blocks_parse_with_fallback_number() {
        let html = r#"<html><body>
            <div class="section-result">
              <span class="section-number">§ 154</span>
              <span class="section-title">Odstoupení</span>
              <div class="section-text">Text výsledku.</div>
            </div>
            <div class="paragraph-result">
              <div class="par-text">Bez čísla.</div>
            </div>
            <div class="section-result"><span class="section-number">§ 1</span></div>
        </body></html>"#;
        let found = parse_section_results(html, Some("154"));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].number, "§ 154");
        assert_eq!(found[0].title.as_deref(), Some("Odstoupení"));
        assert_eq!(found[1].number, "154"); // falls back to the request
    }

    mod http {
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        use super::*;
        use crate::fetch::HttpFetcher;

        fn source(server: &MockServer) -> ZakonyProLidi {
            ZakonyProLidi::with_base(Arc::new(HttpFetcher::default()), server.uri())
        }

        #[tokio::test]
        async fn search_builds_the_query_and_parses_results() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/hledani"))
                .and(query_param("q", "občanský zákoník"))
                .and(query_param("area", "zakony"))
                .and(query_param("year", "2012"))
                .respond_with(ResponseTemplate::new(200).set_body_string(SEARCH_PAGE))
                .expect(1)
                .mount(&server)
                .await;

            let mut query = SearchQuery::new("občanský zákoník");
            query.doc_type = Some(DocumentType::Law);
            query.year = Some(2012);
            let results = source(&server).search(&query).await.unwrap();
            assert_eq!(results.len(), 2);
            assert_eq!(results[0].code.to_string(), "89/2012");
        }

        #[tokio::test]
        async fn fetch_document_narrows_to_the_requested_section() {
            let server = MockServer::start().await;
            let page = r#"<html><body><div class="law-content">
                <h3>§ 154</h3><p>Hledané tělo.</p>
                <h3>§ 155</h3><p>Jiné.</p>
            </div></body></html>"#;
            Mock::given(method("GET"))
                .and(path("/cs/2012-89"))
                .respond_with(ResponseTemplate::new(200).set_body_string(page))
                .mount(&server)
                .await;

            let doc = source(&server)
                .fetch_document("89/2012", Some("§154"))
                .await
                .unwrap();
            let found = doc.sections.unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].text, "Hledané tělo.");
        }

        #[tokio::test]
        async fn missing_changes_view_is_an_empty_timeline() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/cs/2012-89/zmeny"))
                .respond_with(ResponseTemplate::new(404))
                .mount(&server)
                .await;

            let changes = source(&server).changes("89/2012", None).await.unwrap();
            assert!(changes.is_empty());
        }

        #[tokio::test]
        async fn changes_parse_and_respect_the_date_bound() {
            let server = MockServer::start().await;
            let page = r#"<html><body><table>
                <tr><td>1. 1. 2013</td><td>89/2012 Sb.</td><td>Změna</td></tr>
                <tr><td>5. 6. 2015</td><td>132/2015 Sb.</td><td>Zrušeno</td></tr>
            </table></body></html>"#;
            Mock::given(method("GET"))
                .and(path("/cs/2012-89/zmeny"))
                .respond_with(ResponseTemplate::new(200).set_body_string(page))
                .mount(&server)
                .await;

            let changes = source(&server)
                .changes("89/2012", Some("2014-01-01"))
                .await
                .unwrap();
            assert_eq!(changes.len(), 1);
            assert_eq!(changes[0].date, "2015-06-05");
        }

        #[tokio::test]
        async fn invalid_identifier_raises_before_any_fetch() {
            let server = MockServer::start().await;
            let err = source(&server)
                .fetch_document("§ 154", None)
                .await
                .unwrap_err();
            assert!(matches!(err, SourceError::InvalidIdentifier { .. }));
            assert!(server.received_requests().await.unwrap().is_empty());
        }
    }
}
