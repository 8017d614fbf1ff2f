//! Amendment-timeline extraction and normalization.
//!
//! Change views are tabular but loosely structured; rows are recognized by a
//! tolerant selector set and anything without a date cell is dropped rather
//! than raised. Dates come out of the local `D. M. YYYY` form as ISO
//! `YYYY-MM-DD` so callers can sort and filter lexically.

use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};

use super::dom;
use crate::types::{ChangeType, LawChange};

/// Keyword table driving change classification. The lists are data, not
/// logic: classification checks them in fixed precedence (repeal, then new
/// provision, then amendment) and falls through to [`ChangeType::Other`].
#[derive(Debug, Clone)]
pub struct ChangeKeywords {
    pub repeal: Vec<String>,
    pub new_provision: Vec<String>,
    pub amendment: Vec<String>,
}

impl Default for ChangeKeywords {
    fn default() -> Self {
        let list = |words: &[&str]| words.iter().map(|w| (*w).to_string()).collect();
        Self {
            repeal: list(&["zrušen", "repeal"]),
            new_provision: list(&["nový", "doplněn", "new"]),
            amendment: list(&["změn", "novel", "amend"]),
        }
    }
}

impl ChangeKeywords {
    pub fn classify(&self, description: &str) -> ChangeType {
        let lower = description.to_lowercase();
        let hit = |words: &[String]| words.iter().any(|w| lower.contains(w.as_str()));
        if hit(&self.repeal) {
            ChangeType::Repeal
        } else if hit(&self.new_provision) {
            ChangeType::NewProvision
        } else if hit(&self.amendment) {
            ChangeType::Amendment
        } else {
            ChangeType::Other
        }
    }
}

/// Normalize a Czech `D. M. YYYY` date to ISO `YYYY-MM-DD`, zero-padding
/// single digits. Unrecognized formats pass through trimmed, never dropped.
pub fn normalize_date(raw: &str) -> String {
    let re = Regex::new(r"(\d{1,2})\.\s*(\d{1,2})\.\s*(\d{4})").expect("czech date regex is valid");
    match re.captures(raw) {
        Some(caps) => format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[2], &caps[1]),
        None => raw.trim().to_string(),
    }
}

/// `a >= b` on dates. Proper calendar comparison when both sides are ISO;
/// lexical otherwise, which still orders ISO-against-ISO correctly.
fn date_ge(a: &str, b: &str) -> bool {
    let iso = |s| NaiveDate::parse_from_str(s, "%Y-%m-%d");
    match (iso(a), iso(b)) {
        (Ok(a), Ok(b)) => a >= b,
        _ => a >= b,
    }
}

/// Extract change records from a changes/history view. Rows lacking a date
/// cell are skipped; rows at or after `date_from` (when given) are kept.
pub fn extract_changes(
    html: &str,
    date_from: Option<&str>,
    keywords: &ChangeKeywords,
) -> Vec<LawChange> {
    let doc = Html::parse_document(html);
    let rows = Selector::parse(".change-item, .amendment-item, tr").unwrap();
    let date_sel = Selector::parse(".date, time, td:first-child").unwrap();
    let law_sel = Selector::parse(".amending-law, .law-link, td:nth-child(2)").unwrap();
    let desc_sel = Selector::parse(".description, .change-desc, td:nth-child(3)").unwrap();

    let mut changes = Vec::new();
    for row in doc.select(&rows) {
        let date_text = dom::first_text(row, &date_sel);
        if date_text.is_empty() {
            continue;
        }
        let date = normalize_date(&date_text);
        if let Some(from) = date_from {
            if !date_ge(&date, from) {
                continue;
            }
        }

        let amending_law = dom::first_text(row, &law_sel);
        let description = dom::first_text(row, &desc_sel);
        let change_type = keywords.classify(&description);
        changes.push(LawChange {
            date,
            amending_law: if amending_law.is_empty() {
                "Unknown".to_string()
            } else {
                amending_law
            },
            description: if description.is_empty() {
                "Amendment".to_string()
            } else {
                description
            },
            change_type,
        });
    }

    changes
}
