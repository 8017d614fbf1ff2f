//! Tool: fetch_law. Retrieve one law's text, whole or narrowed to a section.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use sbirka::SourceChain;

use crate::format;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct FetchLawParams {
    #[serde(rename = "lawCode")]
    law_code: String,
    #[serde(default)]
    section: Option<String>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "fetch_law".to_string(),
        description: Some(
            "Retrieve the full text of a specific Czech law from www.zakonyprolidi.cz. \
             Use this tool when the user asks to get, fetch, show, or read the content of \
             a specific law or section. Responds to both Czech and English queries. \
             Returns the complete law text in current consolidated form (aktuální \
             konsolidované znění), including all sections. Examples: \"načti občanský \
             zákoník\", \"get law 89/2012\", \"dej mi §154 daňového řádu\", \"show me \
             section 1000 of the Civil Code\"."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "lawCode": {
                    "type": "string",
                    "description": "Law code in format \"number/year\" (e.g., \"89/2012\" for Civil Code/občanský zákoník, \"280/2009\" for Tax Code/daňový řád, \"586/1992\" for Income Tax Act/zákon o daních z příjmů)"
                },
                "section": {
                    "type": "string",
                    "description": "Optional specific section/paragraph number to retrieve (e.g., \"§1000\", \"§154\", \"paragraf 100\"). Can include or omit the § symbol."
                }
            },
            "required": ["lawCode"]
        }),
    }
}

pub async fn execute(args: Value, chain: &Arc<SourceChain>) -> McpResult<ToolCallResult> {
    let params: FetchLawParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let section = params
        .section
        .as_deref()
        .map(super::section_argument)
        .filter(|s| !s.is_empty());

    match chain
        .fetch_document(&params.law_code, section.as_deref())
        .await
    {
        Ok(found) => Ok(ToolCallResult::text(format::law_document(
            section.as_deref(),
            &found,
        ))),
        Err(e) => super::failure_result(e),
    }
}
