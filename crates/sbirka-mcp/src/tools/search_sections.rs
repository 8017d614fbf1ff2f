//! Tool: search_sections. Locate provisions by number and/or keyword.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use sbirka::{SectionQuery, SourceChain};

use crate::format;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct SearchSectionsParams {
    #[serde(default, rename = "sectionNumber")]
    section_number: Option<String>,
    #[serde(default)]
    keyword: Option<String>,
    #[serde(default, rename = "lawCode")]
    law_code: Option<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "search_sections".to_string(),
        description: Some(
            "Find specific sections or paragraphs across Czech laws using section \
             numbers or keywords. Useful for finding where specific provisions are \
             located."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "sectionNumber": {
                    "type": "string",
                    "description": "Section/paragraph number to search for (e.g., \"§1000\")"
                },
                "keyword": {
                    "type": "string",
                    "description": "Keyword or phrase to search for within sections"
                },
                "lawCode": {
                    "type": "string",
                    "description": "Optional law code to limit search to a specific law (e.g., \"89/2012\")"
                }
            }
        }),
    }
}

pub async fn execute(args: Value, chain: &Arc<SourceChain>) -> McpResult<ToolCallResult> {
    let params: SearchSectionsParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    if params.section_number.is_none() && params.keyword.is_none() {
        return Err(McpError::InvalidParams(
            "At least one of sectionNumber or keyword is required".to_string(),
        ));
    }

    let query = SectionQuery {
        section_number: params
            .section_number
            .as_deref()
            .map(super::section_argument)
            .filter(|s| !s.is_empty()),
        keyword: params.keyword.clone(),
        law_code: params.law_code.clone(),
    };

    match chain.search_sections(&query).await {
        Ok(found) => Ok(ToolCallResult::text(format::section_results(&query, &found))),
        Err(e) => super::failure_result(e),
    }
}
