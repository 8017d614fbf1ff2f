//! Markdown rendering of tool outcomes.
//!
//! The core hands back structured data; everything a model actually reads
//! is assembled here. Every successful report names the provider that
//! satisfied it, so fallback answers are recognizable as such.

use sbirka::{
    LawChange, LawDocument, SearchResult, Section, SectionQuery, SourceError, Sourced,
};

/// Documents longer than this render as an overview instead of full text.
const OVERVIEW_THRESHOLD: usize = 50_000;

/// How many section headings the overview lists before eliding the rest.
const OVERVIEW_SECTIONS: usize = 10;

fn source_note<T>(sourced: &Sourced<T>) -> String {
    format!("\n\n---\n*Zdroj/Source: {}*", sourced.provider)
}

pub fn search_results(query: &str, found: &Sourced<Vec<SearchResult>>) -> String {
    if found.value.is_empty() {
        return format!("No results found for query: \"{query}\"{}", source_note(found));
    }

    let entries = found
        .value
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let mut entry = format!(
                "{}. **{}** - {}\n   URL: {}\n   Type: {}",
                i + 1,
                result.code,
                result.title,
                result.url,
                result.doc_type,
            );
            if let Some(year) = result.year {
                entry.push_str(&format!("\n   Year: {year}"));
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Found {} result(s) for \"{query}\":\n\n{entries}{}",
        found.value.len(),
        source_note(found),
    )
}

pub fn law_document(requested_section: Option<&str>, found: &Sourced<LawDocument>) -> String {
    let doc = &found.value;

    // Both providers came back with nothing. The adapters already degraded
    // a missing section to an empty document, so this is the only place a
    // miss becomes visible.
    if doc.is_empty() {
        let text = match requested_section {
            Some(section) => format!("Section {section} not found in law {}.", doc.code),
            None => format!("No content found for law {}.", doc.code),
        };
        return format!("{text}{}", source_note(found));
    }

    let mut text = format!("# {}\n\n", doc.title);
    text.push_str(&format!("**Law Code:** {}\n", doc.code));
    text.push_str(&format!("**URL:** {}\n", doc.url));
    if let Some(date) = &doc.effective_date {
        text.push_str(&format!("**Effective Date:** {date}\n"));
    }
    text.push_str("\n---\n\n");

    match (&doc.sections, requested_section) {
        // Narrowed fetch: the document carries only the matching section(s).
        (Some(sections), Some(_)) if !sections.is_empty() => {
            for section in sections {
                text.push_str(&section_heading(section));
                text.push_str("\n\n");
                text.push_str(&section.text);
                text.push('\n');
            }
        }
        (Some(sections), _) if !sections.is_empty() => {
            text.push_str(&format!("**Sections:** {} total\n\n", sections.len()));
            if doc.full_text.chars().count() > OVERVIEW_THRESHOLD {
                text.push_str(&overview(doc, sections));
            } else {
                text.push_str(&doc.full_text);
            }
        }
        // Unstructured fallback text.
        _ => text.push_str(&doc.full_text),
    }

    text.push_str(&source_note(found));
    text
}

fn overview(doc: &LawDocument, sections: &[Section]) -> String {
    let mut text = String::from("## Overview\n\n");
    text.push_str(&format!(
        "This law contains {} sections. The full text is very long ({} characters).\n\n",
        sections.len(),
        doc.full_text.chars().count(),
    ));
    text.push_str("**Section summary:**\n");
    for section in sections.iter().take(OVERVIEW_SECTIONS) {
        match &section.title {
            Some(title) => text.push_str(&format!("- {}: {title}\n", section.number)),
            None => text.push_str(&format!("- {}\n", section.number)),
        }
    }
    if sections.len() > OVERVIEW_SECTIONS {
        text.push_str(&format!(
            "\n... and {} more sections\n",
            sections.len() - OVERVIEW_SECTIONS
        ));
    }
    text.push_str("\n**Tip:** Use the `section` parameter to retrieve specific sections.\n");
    text
}

fn section_heading(section: &Section) -> String {
    match &section.title {
        Some(title) => format!("## {} - {title}", section.number),
        None => format!("## {}", section.number),
    }
}

pub fn changes_report(
    code: &str,
    date_from: Option<&str>,
    found: &Sourced<Vec<LawChange>>,
) -> String {
    if found.value.is_empty() {
        let since = date_from
            .map(|d| format!(" since {d}"))
            .unwrap_or_default();
        return format!(
            "No changes found for law {code}{since}.{}",
            source_note(found)
        );
    }

    let mut text = format!("# Changes to Law {code}\n\n");
    if let Some(date) = date_from {
        text.push_str(&format!("Showing changes since {date}\n\n"));
    }
    text.push_str(&format!("**Total changes:** {}\n\n", found.value.len()));
    text.push_str("---\n\n");

    for (i, change) in found.value.iter().enumerate() {
        text.push_str(&format!("### {}. {}\n\n", i + 1, change.date));
        text.push_str(&format!("**Amending Law:** {}\n", change.amending_law));
        text.push_str(&format!("**Type:** {}\n", change.change_type));
        text.push_str(&format!("**Description:** {}\n\n", change.description));
    }

    text.push_str(&source_note(found));
    text
}

pub fn section_results(query: &SectionQuery, found: &Sourced<Vec<Section>>) -> String {
    if found.value.is_empty() {
        let description = [
            query.section_number.as_ref().map(|n| format!("section {n}")),
            query.keyword.as_ref().map(|k| format!("keyword \"{k}\"")),
            query.law_code.as_ref().map(|c| format!("in law {c}")),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
        return format!("No sections found for {description}.{}", source_note(found));
    }

    let description = [
        query.section_number.as_ref().map(|n| format!("Section {n}")),
        query.keyword.as_ref().map(|k| format!("Keyword: \"{k}\"")),
        query.law_code.as_ref().map(|c| format!("Law: {c}")),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" | ");

    let mut text = String::from("# Section Search Results\n\n");
    text.push_str(&format!("**Search:** {description}\n"));
    text.push_str(&format!(
        "**Results:** {} section(s) found\n\n",
        found.value.len()
    ));
    text.push_str("---\n\n");

    for (i, section) in found.value.iter().enumerate() {
        text.push_str(&format!("### {}. {}", i + 1, section.number));
        if let Some(title) = &section.title {
            text.push_str(&format!(" - {title}"));
        }
        text.push_str("\n\n");
        text.push_str(&section.text);
        text.push_str("\n\n");
    }

    text.push_str(&source_note(found));
    text
}

/// Render a provider failure as tool-result text. The composite failure
/// lists every attempt in order so the caller sees both causes, not just
/// the last one.
pub fn failure_report(error: &SourceError) -> String {
    match error {
        SourceError::AllSourcesFailed { attempts } => {
            let mut text = String::from("Error: all sources failed.\n\n");
            for (i, (provider, cause)) in attempts.iter().enumerate() {
                text.push_str(&format!("{}. **{provider}**: {cause}\n", i + 1));
            }
            text
        }
        other => format!("Error: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbirka::{ChangeType, DocumentType, Provider};

    fn sourced<T>(value: T) -> Sourced<T> {
        Sourced::new(Provider::ZakonyProLidi, value)
    }

    fn sample_doc(sections: Option<Vec<Section>>, full_text: &str) -> LawDocument {
        LawDocument {
            code: "89/2012".to_string(),
            title: "Občanský zákoník".to_string(),
            full_text: full_text.to_string(),
            url: "https://www.zakonyprolidi.cz/cs/2012-89".to_string(),
            effective_date: Some("1. 1. 2014".to_string()),
            sections,
        }
    }

    fn numbered_section(number: &str) -> Section {
        Section {
            number: number.to_string(),
            title: Some("Nadpis".to_string()),
            text: "Text ustanovení.".to_string(),
        }
    }

    #[test]
    fn search_report_numbers_results_and_names_the_source() {
        let results = vec![SearchResult {
            code: "89/2012".parse().unwrap(),
            title: "Občanský zákoník".to_string(),
            url: "https://www.zakonyprolidi.cz/cs/2012-89".to_string(),
            doc_type: DocumentType::Law,
            year: Some(2012),
        }];
        let text = search_results("občanský zákoník", &sourced(results));
        assert!(text.starts_with("Found 1 result(s) for \"občanský zákoník\":"));
        assert!(text.contains("1. **89/2012** - Občanský zákoník"));
        assert!(text.contains("Year: 2012"));
        assert!(text.contains("Zdroj/Source: zakonyprolidi.cz"));
    }

    #[test]
    fn empty_search_is_not_found_text_not_an_error() {
        let text = search_results("neexistuje", &sourced(Vec::new()));
        assert!(text.starts_with("No results found for query: \"neexistuje\""));
    }

    #[test]
    fn small_document_renders_full_text() {
        let doc = sample_doc(
            Some(vec![numbered_section("§1")]),
            "§1 Nadpis\nText ustanovení.",
        );
        let text = law_document(None, &sourced(doc));
        assert!(text.starts_with("# Občanský zákoník"));
        assert!(text.contains("**Law Code:** 89/2012"));
        assert!(text.contains("**Effective Date:** 1. 1. 2014"));
        assert!(text.contains("**Sections:** 1 total"));
        assert!(text.contains("Text ustanovení."));
        assert!(!text.contains("## Overview"));
    }

    #[test]
    fn long_document_renders_overview_with_first_ten_headings() {
        let sections: Vec<Section> = (1..=30).map(|n| numbered_section(&format!("§{n}"))).collect();
        let doc = sample_doc(Some(sections), &"a".repeat(OVERVIEW_THRESHOLD + 1));
        let text = law_document(None, &sourced(doc));
        assert!(text.contains("## Overview"));
        assert!(text.contains("This law contains 30 sections."));
        assert!(text.contains("- §10: Nadpis"));
        assert!(!text.contains("- §11:"));
        assert!(text.contains("... and 20 more sections"));
        assert!(text.contains("Use the `section` parameter"));
    }

    #[test]
    fn narrowed_document_renders_only_the_section() {
        let doc = sample_doc(Some(vec![numbered_section("§154")]), "§154 Nadpis\nText ustanovení.");
        let text = law_document(Some("154"), &sourced(doc));
        assert!(text.contains("## §154 - Nadpis"));
        assert!(text.contains("Text ustanovení."));
        assert!(!text.contains("**Sections:**"));
    }

    #[test]
    fn missing_section_renders_plain_not_found() {
        let doc = LawDocument {
            code: "89/2012".to_string(),
            title: "89/2012".to_string(),
            full_text: String::new(),
            url: "https://www.zakonyprolidi.cz/cs/2012-89".to_string(),
            effective_date: None,
            sections: None,
        };
        let text = law_document(Some("9999"), &sourced(doc));
        assert!(text.starts_with("Section 9999 not found in law 89/2012."));
    }

    #[test]
    fn changes_report_lists_a_timeline() {
        let changes = vec![LawChange {
            date: "2014-01-01".to_string(),
            amending_law: "303/2013 Sb.".to_string(),
            description: "Novela zákona".to_string(),
            change_type: ChangeType::Amendment,
        }];
        let text = changes_report("89/2012", Some("2013-06-01"), &sourced(changes));
        assert!(text.starts_with("# Changes to Law 89/2012"));
        assert!(text.contains("Showing changes since 2013-06-01"));
        assert!(text.contains("**Total changes:** 1"));
        assert!(text.contains("### 1. 2014-01-01"));
        assert!(text.contains("**Amending Law:** 303/2013 Sb."));
        assert!(text.contains("**Type:** amendment"));
    }

    #[test]
    fn empty_changes_mention_the_bound() {
        let text = changes_report("89/2012", Some("2024-01-01"), &sourced(Vec::new()));
        assert!(text.starts_with("No changes found for law 89/2012 since 2024-01-01."));
    }

    #[test]
    fn section_search_report_shows_the_query_description() {
        let query = SectionQuery {
            section_number: Some("154".to_string()),
            keyword: None,
            law_code: Some("280/2009".to_string()),
        };
        let text = section_results(&query, &sourced(vec![numbered_section("§154")]));
        assert!(text.contains("**Search:** Section 154 | Law: 280/2009"));
        assert!(text.contains("### 1. §154 - Nadpis"));

        let empty = section_results(&query, &sourced(Vec::new()));
        assert!(empty.starts_with("No sections found for section 154 in law 280/2009."));
    }

    #[test]
    fn composite_failure_lists_every_attempt_in_order() {
        let error = SourceError::AllSourcesFailed {
            attempts: vec![
                (Provider::ZakonyProLidi, "HTTP status 503".to_string()),
                (Provider::Kurzy, "request timed out after 10s".to_string()),
            ],
        };
        let text = failure_report(&error);
        assert!(text.starts_with("Error: all sources failed."));
        assert!(text.contains("1. **zakonyprolidi.cz**: HTTP status 503"));
        assert!(text.contains("2. **kurzy.cz**: request timed out after 10s"));
    }
}
