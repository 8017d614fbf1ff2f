//! Tool registration and dispatch.

use std::sync::Arc;

use serde_json::Value;

use sbirka::SourceChain;

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::{fetch_law, get_law_changes, search_laws, search_sections};

pub struct ToolRegistry;

impl ToolRegistry {
    pub fn list_tools() -> Vec<ToolDefinition> {
        vec![
            search_laws::definition(),
            fetch_law::definition(),
            get_law_changes::definition(),
            search_sections::definition(),
        ]
    }

    pub async fn call(
        name: &str,
        arguments: Option<Value>,
        chain: &Arc<SourceChain>,
    ) -> McpResult<ToolCallResult> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            "search_laws" => search_laws::execute(args, chain).await,
            "fetch_law" => fetch_law::execute(args, chain).await,
            "get_law_changes" => get_law_changes::execute(args, chain).await,
            "search_sections" => search_sections::execute(args, chain).await,
            _ => Err(McpError::ToolNotFound(name.to_string())),
        }
    }
}
