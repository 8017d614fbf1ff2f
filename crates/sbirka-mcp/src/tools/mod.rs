//! MCP tool implementations.

pub mod fetch_law;
pub mod get_law_changes;
pub mod registry;
pub mod search_laws;
pub mod search_sections;

pub use registry::ToolRegistry;

use sbirka::SourceError;

use crate::format;
use crate::types::{McpError, McpResult, ToolCallResult};

/// Map a chain failure to the tool outcome. Caller mistakes (bad citation,
/// missing disjunctive parameter) become protocol errors; provider faults
/// become readable `isError` results so the model can see what was tried.
pub(crate) fn failure_result(error: SourceError) -> McpResult<ToolCallResult> {
    match error {
        SourceError::InvalidIdentifier { .. } | SourceError::InvalidRequest(_) => {
            Err(McpError::InvalidParams(error.to_string()))
        }
        other => Ok(ToolCallResult::error(format::failure_report(&other))),
    }
}

/// Normalize a user-supplied section argument. The tool descriptions accept
/// spellings like `"paragraf 100"`; only the token itself goes to the core
/// (which strips any `§` on its own).
pub(crate) fn section_argument(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.get(..8) {
        Some(prefix) if prefix.eq_ignore_ascii_case("paragraf") => {
            trimmed[8..].trim().to_string()
        }
        _ => trimmed.to_string(),
    }
}
