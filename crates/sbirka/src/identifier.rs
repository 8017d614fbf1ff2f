//! Law citation parsing and canonicalization.
//!
//! Czech laws are cited as `number/year` ("89/2012 Sb.") but providers
//! address them as `year-number` or `number-year` path segments. This module
//! owns the mapping so adapters never string-mangle citations themselves.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SourceError;

/// Canonical `{number, year}` identity of a law, independent of any
/// provider's URL convention. Displays as `number/year`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LawIdentifier {
    number: String,
    year: u16,
}

impl LawIdentifier {
    /// Accepts `number/year` or `year-number`. The year is always the
    /// four-digit component, whichever side of the separator it is on.
    pub fn parse(input: &str) -> Result<Self, SourceError> {
        let token = input.trim();
        if let Some((number, year)) = token.split_once('/') {
            return Self::from_parts(number, year, input);
        }
        if let Some((year, number)) = token.split_once('-') {
            return Self::from_parts(number, year, input);
        }
        Err(SourceError::InvalidIdentifier {
            input: input.to_string(),
        })
    }

    pub fn new(number: impl Into<String>, year: u16) -> Result<Self, SourceError> {
        let number = number.into();
        if is_digits(&number) && (1000..=9999).contains(&year) {
            Ok(Self { number, year })
        } else {
            Err(SourceError::InvalidIdentifier {
                input: format!("{number}/{year}"),
            })
        }
    }

    fn from_parts(number: &str, year: &str, original: &str) -> Result<Self, SourceError> {
        let number = number.trim();
        let year = year.trim();
        if !is_digits(number) || year.len() != 4 || !is_digits(year) {
            return Err(SourceError::InvalidIdentifier {
                input: original.to_string(),
            });
        }
        let year = year.parse().map_err(|_| SourceError::InvalidIdentifier {
            input: original.to_string(),
        })?;
        Ok(Self {
            number: number.to_string(),
            year,
        })
    }

    /// Find a citation embedded in free text, e.g. pulling `89/2012` out of
    /// "fetch §154 of 89/2012". Tries the slash form first, then the
    /// `year-number` form.
    pub fn find_in(text: &str) -> Option<Self> {
        let slash = Regex::new(r"(\d+)\s*/\s*(\d{4})\b").expect("slash citation regex is valid");
        if let Some(caps) = slash.captures(text) {
            if let Ok(year) = caps[2].parse() {
                if let Ok(id) = Self::new(&caps[1], year) {
                    return Some(id);
                }
            }
        }
        let dashed = Regex::new(r"\b(\d{4})\s*-\s*(\d+)").expect("dashed citation regex is valid");
        if let Some(caps) = dashed.captures(text) {
            if let Ok(year) = caps[1].parse() {
                if let Ok(id) = Self::new(&caps[2], year) {
                    return Some(id);
                }
            }
        }
        None
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    /// Path segment in `year-number` order, e.g. `2012-89`.
    pub fn year_number(&self) -> String {
        format!("{}-{}", self.year, self.number)
    }

    /// Path segment in `number-year` order, e.g. `89-2012`.
    pub fn number_year(&self) -> String {
        format!("{}-{}", self.number, self.year)
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for LawIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.number, self.year)
    }
}

impl FromStr for LawIdentifier {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for LawIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LawIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_citation_forms_normalize_to_the_same_identity() {
        let slash = LawIdentifier::parse("89/2012").unwrap();
        let dashed = LawIdentifier::parse("2012-89").unwrap();
        assert_eq!(slash, dashed);
        assert_eq!(slash.to_string(), "89/2012");
        assert_eq!(dashed.year_number(), "2012-89");
        assert_eq!(dashed.number_year(), "89-2012");
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let id = LawIdentifier::parse("  182 / 2006 ").unwrap();
        assert_eq!(id.number(), "182");
        assert_eq!(id.year(), 2006);
    }

    #[test]
    fn rejects_malformed_citations() {
        for input in [
            "",
            "zakonik",
            "89/20",       // two-digit year
            "89-2012",     // dashed form is year-first
            "89/2012/1",   // trailing segment
            "a89/2012",
            "89/rok",
        ] {
            assert!(
                LawIdentifier::parse(input).is_err(),
                "{input:?} should not parse"
            );
        }
    }

    #[test]
    fn finds_citation_embedded_in_free_text() {
        let id = LawIdentifier::find_in("fetch §154 of 89/2012 please").unwrap();
        assert_eq!(id.to_string(), "89/2012");

        let id = LawIdentifier::find_in("viz 2006-182, insolvenční zákon").unwrap();
        assert_eq!(id.to_string(), "182/2006");

        assert!(LawIdentifier::find_in("občanský zákoník").is_none());
    }

    #[test]
    fn serde_round_trips_through_the_display_form() {
        let id = LawIdentifier::parse("280/2009").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"280/2009\"");
        let back: LawIdentifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
