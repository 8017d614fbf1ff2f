//! Slug resolution for providers that address laws by readable URL segments.
//!
//! kurzy.cz paths look like `/zakony/89-2012-obcansky-zakonik/`; the trailing
//! slug cannot be derived from the citation. A seed table covers the
//! high-traffic laws; anything else is discovered by scanning the provider's
//! law index, with hits cached for the life of the process.

use std::collections::HashMap;
use std::sync::Arc;

use scraper::{Html, Selector};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::fetch::MarkupFetcher;
use crate::identifier::LawIdentifier;

/// Well-known law/slug pairs, so the common path never needs discovery.
const KNOWN_SLUGS: &[(&str, &str)] = &[
    ("182/2006", "insolvencni-zakon"),
    ("89/2012", "obcansky-zakonik"),
    ("280/2009", "danovy-rad"),
    ("262/2006", "zakonik-prace"),
    ("40/2009", "trestni-zakonik"),
    ("513/1991", "obchodni-zakonik"),
    ("586/1992", "zakon-o-danich-z-prijmu"),
];

pub struct SlugResolver {
    fetcher: Arc<dyn MarkupFetcher>,
    index_url: String,
    cache: RwLock<HashMap<LawIdentifier, String>>,
}

impl SlugResolver {
    pub fn new(fetcher: Arc<dyn MarkupFetcher>, index_url: impl Into<String>) -> Self {
        let mut seeded = HashMap::new();
        for (code, slug) in KNOWN_SLUGS {
            if let Ok(id) = LawIdentifier::parse(code) {
                seeded.insert(id, (*slug).to_string());
            }
        }
        Self {
            fetcher,
            index_url: index_url.into(),
            cache: RwLock::new(seeded),
        }
    }

    /// Resolve the slug for a law. `None` is the normal "not listed"
    /// outcome; a failed discovery fetch is logged and degrades to `None`
    /// rather than aborting the operation that needed the slug.
    pub async fn resolve(&self, id: &LawIdentifier) -> Option<String> {
        if let Some(slug) = self.cache.read().await.get(id) {
            return Some(slug.clone());
        }
        let html = match self.fetcher.fetch(&self.index_url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("slug discovery fetch of {} failed: {e}", self.index_url);
                return None;
            }
        };
        let slug = scan_index(&html, id)?;
        debug!("discovered slug {slug:?} for {id}");
        self.cache
            .write()
            .await
            .insert(id.clone(), slug.clone());
        Some(slug)
    }
}

/// Scan an index listing for an anchor whose path embeds `{number}-{year}-`
/// and return the trailing slug segment.
fn scan_index(html: &str, id: &LawIdentifier) -> Option<String> {
    let doc = Html::parse_document(html);
    let anchors = Selector::parse(r#"a[href*="/zakony/"]"#).unwrap();
    let needle = format!("/{}-", id.number_year());
    for anchor in doc.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(at) = href.find(&needle) else {
            continue;
        };
        let slug = href[at + needle.len()..]
            .split('/')
            .next()
            .unwrap_or_default();
        if !slug.is_empty() {
            return Some(slug.to_string());
        }
    }
    None
}
