//! Message framing for newline-delimited JSON.

use crate::types::{JsonRpcMessage, McpError, McpResult};

/// Parse a single line of text as a JSON-RPC message.
pub fn parse_message(line: &str) -> McpResult<JsonRpcMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }

    serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))
}

/// Serialize a value to a JSON line (with trailing newline).
pub fn frame_message(value: &serde_json::Value) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::error_codes::PARSE_ERROR;

    #[test]
    fn malformed_and_empty_lines_are_parse_errors() {
        assert_eq!(parse_message("{\"broken\":").unwrap_err().code(), PARSE_ERROR);
        assert_eq!(parse_message("").unwrap_err().code(), PARSE_ERROR);
        assert_eq!(parse_message("   \t ").unwrap_err().code(), PARSE_ERROR);
    }

    #[test]
    fn framing_appends_exactly_one_newline() {
        let framed = frame_message(&serde_json::json!({"jsonrpc": "2.0"})).unwrap();
        assert!(framed.ends_with('\n'));
        assert!(!framed[..framed.len() - 1].contains('\n'));
    }
}
