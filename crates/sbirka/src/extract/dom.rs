//! Flattened view of a document's main content region.
//!
//! The section heuristics walk an ordered run of sibling blocks with
//! explicit stop conditions. Flattening the DOM into plain [`ContentNode`]s
//! first keeps those walks testable against hand-built node lists, with no
//! parser in sight.

use scraper::{ElementRef, Html, Selector};

/// Containers tried in order when locating the main content region.
const CONTENT_SELECTORS: &[&str] = &[".law-content", ".law-text", "#content", "article", "main"];

/// One element in document order: tag name, machine id, visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentNode {
    pub tag: String,
    pub id: Option<String>,
    pub text: String,
}

impl ContentNode {
    pub fn new(tag: &str, id: Option<&str>, text: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: id.map(str::to_string),
            text: text.to_string(),
        }
    }

    /// `h1`..`h6` mapped to 1..6.
    pub fn heading_level(&self) -> Option<u8> {
        match self.tag.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }
}

/// Visible text of an element with runs of whitespace collapsed.
pub fn element_text(el: ElementRef) -> String {
    let raw = el.text().collect::<Vec<_>>().join(" ");
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the first descendant matching `sel`, or empty.
pub fn first_text(scope: ElementRef, sel: &Selector) -> String {
    scope.select(sel).next().map(element_text).unwrap_or_default()
}

/// Locate the main content region: the first known container, else `<body>`,
/// else the document root.
pub fn content_root(doc: &Html) -> ElementRef<'_> {
    for selector in CONTENT_SELECTORS {
        if let Ok(sel) = Selector::parse(selector) {
            if let Some(el) = doc.select(&sel).next() {
                return el;
            }
        }
    }
    let body = Selector::parse("body").unwrap();
    doc.select(&body)
        .next()
        .unwrap_or_else(|| doc.root_element())
}

/// Flatten the sibling sequence `anchor` belongs to: every element child of
/// its parent, in document order. Falls back to the anchor alone when the
/// parent is not an element.
pub fn sibling_run(anchor: ElementRef) -> Vec<ContentNode> {
    let Some(parent) = anchor.parent().and_then(ElementRef::wrap) else {
        return vec![flatten(anchor)];
    };
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .map(flatten)
        .collect()
}

fn flatten(el: ElementRef) -> ContentNode {
    ContentNode {
        tag: el.value().name().to_ascii_lowercase(),
        id: el.value().id().map(str::to_string),
        text: element_text(el),
    }
}
