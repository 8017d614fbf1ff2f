//! Adapter for www.kurzy.cz/zakony, the secondary provider.
//!
//! Laws are addressed as `/zakony/{number}-{year}-{slug}/`, so every fetch
//! goes through the slug resolver first. There is no usable search surface
//! and no amendment history; what this provider is good at is standalone
//! per-paragraph pages, which makes it the fallback of choice for narrow
//! section requests.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;

use crate::error::SourceError;
use crate::extract::{dom, sections};
use crate::fetch::MarkupFetcher;
use crate::identifier::LawIdentifier;
use crate::slug::SlugResolver;
use crate::sources::LawSource;
use crate::types::{
    DocumentType, LawChange, LawDocument, Provider, SearchQuery, SearchResult, Section,
    SectionQuery,
};

pub const BASE_URL: &str = "https://www.kurzy.cz";

pub struct Kurzy {
    fetcher: Arc<dyn MarkupFetcher>,
    base: String,
    slugs: SlugResolver,
}

impl Kurzy {
    pub fn new(fetcher: Arc<dyn MarkupFetcher>) -> Self {
        Self::with_base(fetcher, BASE_URL)
    }

    /// Point the adapter at a different host (tests, mirrors).
    pub fn with_base(fetcher: Arc<dyn MarkupFetcher>, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        let slugs = SlugResolver::new(Arc::clone(&fetcher), format!("{base}/zakony/"));
        Self {
            fetcher,
            base,
            slugs,
        }
    }

    async fn fetch(&self, url: &str) -> Result<String, SourceError> {
        self.fetcher
            .fetch(url)
            .await
            .map_err(|e| SourceError::fetch_failed(Provider::Kurzy, url, &e))
    }

    async fn law_url(&self, id: &LawIdentifier, section: Option<&str>) -> Result<String, SourceError> {
        let slug = self
            .slugs
            .resolve(id)
            .await
            .ok_or_else(|| SourceError::SlugNotFound {
                provider: Provider::Kurzy,
                code: id.to_string(),
            })?;
        let mut url = format!("{}/zakony/{}-{}/", self.base, id.number_year(), slug);
        if let Some(number) = section {
            url.push_str(&format!("paragraf-{}/", sections::normalize_token(number)));
        }
        Ok(url)
    }
}

#[async_trait]
impl LawSource for Kurzy {
    fn provider(&self) -> Provider {
        Provider::Kurzy
    }

    /// No search surface here; only a query that already names a law code
    /// resolves, to exactly that law's landing page.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SourceError> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }
        let Some(id) = LawIdentifier::find_in(&query.query) else {
            return Ok(Vec::new());
        };
        let Some(slug) = self.slugs.resolve(&id).await else {
            return Ok(Vec::new());
        };

        let year = Some(id.year());
        Ok(vec![SearchResult {
            url: format!("{}/zakony/{}-{}/", self.base, id.number_year(), slug),
            title: format!("Zákon č. {id} Sb."),
            doc_type: query.doc_type.unwrap_or(DocumentType::Law),
            year,
            code: id,
        }])
    }

    async fn fetch_document(
        &self,
        code: &str,
        section: Option<&str>,
    ) -> Result<LawDocument, SourceError> {
        let id = LawIdentifier::parse(code)?;
        let url = self.law_url(&id, section).await?;
        let html = self.fetch(&url).await?;
        Ok(build_document(&id, &url, &html, section))
    }

    /// kurzy.cz publishes no amendment history.
    async fn changes(
        &self,
        _code: &str,
        _date_from: Option<&str>,
    ) -> Result<Vec<LawChange>, SourceError> {
        Ok(Vec::new())
    }

    /// Reachable only with both a law code and a section number; that pair
    /// maps straight onto a per-paragraph page. Anything vaguer is out of
    /// reach for this provider and comes back empty.
    async fn search_sections(&self, query: &SectionQuery) -> Result<Vec<Section>, SourceError> {
        let (Some(code), Some(number)) = (query.law_code.as_deref(), query.section_number.as_deref())
        else {
            debug!("section search without law code and number, nothing to do here");
            return Ok(Vec::new());
        };
        let doc = self.fetch_document(code, Some(number)).await?;
        Ok(doc.sections.unwrap_or_default())
    }
}

fn build_document(
    id: &LawIdentifier,
    url: &str,
    html: &str,
    requested: Option<&str>,
) -> LawDocument {
    let doc = Html::parse_document(html);
    let title = page_title(&doc, id);

    match requested {
        // A per-paragraph page: one heading block with the provision.
        Some(number) => {
            let matched = sections::filter_by_number(sections::extract_from(&doc), number);
            if matched.is_empty() {
                return LawDocument {
                    code: id.to_string(),
                    title,
                    full_text: String::new(),
                    url: url.to_string(),
                    effective_date: None,
                    sections: None,
                };
            }
            LawDocument {
                code: id.to_string(),
                title,
                full_text: sections::concat_sections(&matched),
                url: url.to_string(),
                effective_date: None,
                sections: Some(matched),
            }
        }
        // The landing page. Usually only the table of contents survives the
        // cascade here, recognizable by its bodiless entries; those become
        // an enumeration instead of a pretend full text.
        None => {
            let extracted = sections::extract_from(&doc);
            if extracted.is_empty() {
                return LawDocument {
                    code: id.to_string(),
                    title,
                    full_text: sections::fallback_text_from(&doc),
                    url: url.to_string(),
                    effective_date: None,
                    sections: None,
                };
            }
            let full_text = if extracted.iter().all(|s| s.text.is_empty()) {
                format!(
                    "{title}\n\nZákon obsahuje {} paragrafů. Pro plné znění konkrétního \
                     paragrafu zadejte jeho číslo.",
                    extracted.len()
                )
            } else {
                sections::concat_sections(&extracted)
            };
            LawDocument {
                code: id.to_string(),
                title,
                full_text,
                url: url.to_string(),
                effective_date: None,
                sections: Some(extracted),
            }
        }
    }
}

fn page_title(doc: &Html, id: &LawIdentifier) -> String {
    let h1 = Selector::parse("h1").unwrap();
    let heading = doc
        .select(&h1)
        .next()
        .map(dom::element_text)
        .unwrap_or_default();
    if !heading.is_empty() {
        return heading;
    }

    let title_sel = Selector::parse("title").unwrap();
    let from_title = doc
        .select(&title_sel)
        .next()
        .map(dom::element_text)
        .unwrap_or_default()
        .replace("| Kurzy.cz", "")
        .trim()
        .to_string();
    if from_title.is_empty() {
        format!("Zákon č. {id} Sb.")
    } else {
        from_title
    }
}
