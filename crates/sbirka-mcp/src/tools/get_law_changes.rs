//! Tool: get_law_changes. Amendment timeline for one law.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use sbirka::SourceChain;

use crate::format;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct GetChangesParams {
    #[serde(rename = "lawCode")]
    law_code: String,
    #[serde(default, rename = "dateFrom")]
    date_from: Option<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_law_changes".to_string(),
        description: Some(
            "Monitor and retrieve changes, amendments, and modifications to a specific \
             Czech law over time. Returns a timeline of all amendments."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "lawCode": {
                    "type": "string",
                    "description": "Law code in format \"number/year\" (e.g., \"89/2012\")"
                },
                "dateFrom": {
                    "type": "string",
                    "description": "Optional start date in ISO format (YYYY-MM-DD) to filter changes from a specific date onwards"
                }
            },
            "required": ["lawCode"]
        }),
    }
}

pub async fn execute(args: Value, chain: &Arc<SourceChain>) -> McpResult<ToolCallResult> {
    let params: GetChangesParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    match chain
        .changes(&params.law_code, params.date_from.as_deref())
        .await
    {
        Ok(found) => Ok(ToolCallResult::text(format::changes_report(
            &params.law_code,
            params.date_from.as_deref(),
            &found,
        ))),
        Err(e) => super::failure_result(e),
    }
}
