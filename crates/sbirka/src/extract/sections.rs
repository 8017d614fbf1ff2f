//! Layered section extraction from arbitrarily-shaped legal markup.
//!
//! Providers disagree on how provisions are marked up and none of them
//! version their templates, so extraction runs a cascade of heuristics from
//! most to least structural and stops at the first one that yields sections:
//!
//! 1. h2-h4 headings carrying the `§` glyph, with sibling blocks as bodies
//!    (the page h1 is the law title, never a provision);
//! 2. blocks with machine ids of the form `p<number>`;
//! 3. table-of-contents anchors linking to per-paragraph pages.
//!
//! Ambiguity never raises. A document that defeats all three degrades to
//! bounded unstructured text.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::dom::{self, ContentNode};
use crate::types::Section;

const SECTION_GLYPH: char = '§';

/// Upper bound on unstructured fallback text, in characters.
pub const FALLBACK_TEXT_LIMIT: usize = 12_000;

fn section_number_re() -> Regex {
    Regex::new(r"(?i)§\s*(\d+[a-z]?)").expect("section number regex is valid")
}

fn paragraph_id_re() -> Regex {
    Regex::new(r"(?i)^p(\d+[a-z]?)$").expect("paragraph id regex is valid")
}

/// Run the heuristic cascade over fetched markup.
pub fn extract_sections(html: &str) -> Vec<Section> {
    extract_from(&Html::parse_document(html))
}

pub(crate) fn extract_from(doc: &Html) -> Vec<Section> {
    let headings = Selector::parse("h2, h3, h4").unwrap();
    let marker_runs = runs_of(doc, &headings, &|el| contains_glyph(el));
    let found: Vec<Section> = marker_runs.iter().flat_map(|run| markers_in_run(run)).collect();
    if !found.is_empty() {
        return found;
    }

    let id_blocks = Selector::parse(r#"[id^="p"], [id^="P"]"#).unwrap();
    let id_re = paragraph_id_re();
    let id_runs = runs_of(doc, &id_blocks, &|el| {
        el.value().id().is_some_and(|id| id_re.is_match(id))
    });
    let found: Vec<Section> = id_runs.iter().flat_map(|run| id_blocks_in_run(run)).collect();
    if !found.is_empty() {
        debug!("no glyph markers, {} sections via paragraph ids", found.len());
        return found;
    }

    let toc = toc_from(doc);
    if !toc.is_empty() {
        debug!("no section bodies, {} entries via table of contents", toc.len());
    }
    toc
}

fn contains_glyph(el: &ElementRef) -> bool {
    el.text().any(|t| t.contains(SECTION_GLYPH))
}

/// Sibling runs, one per distinct parent in document order, for elements
/// matched by `sel` and accepted by `keep`. Marker elements scattered over
/// several containers each get their own run, so a stop condition never
/// leaks across container boundaries.
fn runs_of(
    doc: &Html,
    sel: &Selector,
    keep: &dyn Fn(&ElementRef) -> bool,
) -> Vec<Vec<ContentNode>> {
    let mut parents = Vec::new();
    let mut runs = Vec::new();
    for el in doc.select(sel) {
        if !keep(&el) {
            continue;
        }
        let Some(parent) = el.parent() else {
            continue;
        };
        if parents.contains(&parent.id()) {
            continue;
        }
        parents.push(parent.id());
        runs.push(dom::sibling_run(el));
    }
    runs
}

/// Heuristic 1: `§` headings. Each marker owns the sibling blocks after it,
/// up to the next heading at the same or a higher level. A marker with no
/// following blocks keeps its own heading text as the body, so a lone
/// paragraph page still yields one non-empty section. An h1 can end a body
/// but never starts a section; it is the law title even when it quotes a
/// section number.
fn markers_in_run(nodes: &[ContentNode]) -> Vec<Section> {
    let number_re = section_number_re();
    let mut sections = Vec::new();

    for (i, node) in nodes.iter().enumerate() {
        let Some(level) = node.heading_level() else {
            continue;
        };
        if level < 2 || !node.text.contains(SECTION_GLYPH) {
            continue;
        }
        let Some(caps) = number_re.captures(&node.text) else {
            continue;
        };
        let number = format!("§{}", caps[1].to_lowercase());
        let title = strip_number_prefix(&node.text, &number_re);

        let mut body = Vec::new();
        for follower in &nodes[i + 1..] {
            if follower.heading_level().is_some_and(|l| l <= level) {
                break;
            }
            let text = follower.text.trim();
            if !text.is_empty() {
                body.push(text.to_string());
            }
        }

        let text = if body.is_empty() {
            node.text.trim().to_string()
        } else {
            body.join("\n\n")
        };
        sections.push(Section { number, title, text });
    }

    sections
}

/// Heuristic 2: blocks with ids like `p154`. An id with a second separator
/// (`p154-1`) is a sub-paragraph; it contributes body text but never starts
/// a section. A heading directly after the marker becomes the title.
fn id_blocks_in_run(nodes: &[ContentNode]) -> Vec<Section> {
    let id_re = paragraph_id_re();
    let number_of = |node: &ContentNode| -> Option<String> {
        let id = node.id.as_deref()?;
        id_re.captures(id).map(|caps| caps[1].to_lowercase())
    };

    let mut sections = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        let Some(num) = number_of(node) else {
            continue;
        };
        let number = format!("§{num}");

        let mut rest = nodes[i + 1..].iter().peekable();
        let mut title = None;
        if let Some(next) = rest.peek() {
            if next.heading_level().is_some() && number_of(next).is_none() {
                let text = next.text.trim();
                if !text.is_empty() {
                    title = Some(text.to_string());
                }
                rest.next();
            }
        }

        let mut body = Vec::new();
        for follower in rest {
            if number_of(follower).is_some() {
                break;
            }
            let text = follower.text.trim();
            if !text.is_empty() {
                body.push(text.to_string());
            }
        }

        let text = if body.is_empty() {
            node.text.trim().to_string()
        } else {
            body.join("\n\n")
        };
        sections.push(Section { number, title, text });
    }

    sections
}

/// Heuristic 3: table-of-contents anchors pointing at per-paragraph pages.
/// Yields numbers and titles only; the bodies live behind the links.
pub(crate) fn toc_from(doc: &Html) -> Vec<Section> {
    let anchors = Selector::parse(r#"a[href*="/paragraf-"]"#).unwrap();
    let number_re = section_number_re();
    let mut sections = Vec::new();

    for anchor in doc.select(&anchors) {
        let text = dom::element_text(anchor);
        if !text.contains(SECTION_GLYPH) {
            continue;
        }
        let Some(caps) = number_re.captures(&text) else {
            continue;
        };
        sections.push(Section {
            number: format!("§{}", caps[1].to_lowercase()),
            title: strip_number_prefix(&text, &number_re),
            text: String::new(),
        });
    }

    sections
}

fn strip_number_prefix(heading: &str, number_re: &Regex) -> Option<String> {
    let title = number_re.replace(heading, "").trim().to_string();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Normalize a section token for comparison or URL building: strip the
/// glyph, surrounding whitespace, and letter-suffix case.
pub fn normalize_token(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(SECTION_GLYPH)
        .trim()
        .to_lowercase()
}

/// Keep only sections matching the requested number.
///
/// Matching is an exact token comparison after both sides are normalized;
/// when the request has no letter suffix, a single-letter-suffixed variant
/// also matches. `154` therefore matches `§154` and `§154a` but never
/// `§1540`, and `154a` matches only `§154a`.
pub fn filter_by_number(sections: Vec<Section>, requested: &str) -> Vec<Section> {
    let want = normalize_token(requested);
    if want.is_empty() {
        return sections;
    }
    let suffixless = want.bytes().all(|b| b.is_ascii_digit());

    sections
        .into_iter()
        .filter(|section| {
            let have = normalize_token(&section.number);
            if have == want {
                return true;
            }
            if suffixless {
                if let Some(rest) = have.strip_prefix(want.as_str()) {
                    let mut chars = rest.chars();
                    return matches!(
                        (chars.next(), chars.next()),
                        (Some(c), None) if c.is_ascii_alphabetic()
                    );
                }
            }
            false
        })
        .collect()
}

/// Join sections back into one display text: `number title`, body, blank
/// line between sections.
pub fn concat_sections(sections: &[Section]) -> String {
    sections
        .iter()
        .map(|section| {
            let mut head = section.number.clone();
            if let Some(title) = &section.title {
                head.push(' ');
                head.push_str(title);
            }
            format!("{head}\n{}", section.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Visible text of the main content region, bounded. The degrade path when
/// every heuristic came up empty.
pub fn fallback_text(html: &str) -> String {
    fallback_text_from(&Html::parse_document(html))
}

pub(crate) fn fallback_text_from(doc: &Html) -> String {
    let root = dom::content_root(doc);
    let text = dom::element_text(root);
    match text.char_indices().nth(FALLBACK_TEXT_LIMIT) {
        Some((at, _)) => text[..at].to_string(),
        None => text,
    }
}
