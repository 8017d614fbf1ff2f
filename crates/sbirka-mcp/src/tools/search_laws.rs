//! Tool: search_laws. Full-text law search across the provider chain.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use sbirka::{DocumentType, SearchQuery, SourceChain};

use crate::format;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct SearchLawsParams {
    query: String,
    #[serde(default, rename = "type")]
    doc_type: Option<DocumentType>,
    #[serde(default)]
    year: Option<u16>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "search_laws".to_string(),
        description: Some(
            "Search for Czech laws and legal documents on www.zakonyprolidi.cz. \
             Returns a list of matching documents with their codes, titles, and URLs."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query - can be law code (e.g., \"89/2012\"), section number (e.g., \"§1000\"), abbreviated reference (e.g., \"OZ\"), or law title"
                },
                "type": {
                    "type": "string",
                    "enum": ["law", "treaty", "eu-law", "court-decision"],
                    "description": "Type of document to search for (optional)"
                },
                "year": {
                    "type": "number",
                    "description": "Filter by publication year (optional)"
                },
                "limit": {
                    "type": "number",
                    "description": "Maximum number of results to return (default: 10)",
                    "default": 10
                }
            },
            "required": ["query"]
        }),
    }
}

pub async fn execute(args: Value, chain: &Arc<SourceChain>) -> McpResult<ToolCallResult> {
    let params: SearchLawsParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let query = SearchQuery {
        query: params.query.clone(),
        doc_type: params.doc_type,
        year: params.year,
        limit: params.limit,
    };

    match chain.search(&query).await {
        Ok(found) => Ok(ToolCallResult::text(format::search_results(
            &params.query,
            &found,
        ))),
        Err(e) => super::failure_result(e),
    }
}
