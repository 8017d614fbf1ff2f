//! Sbirka MCP Server: Czech legal documents over the Model Context Protocol.

pub mod config;
pub mod format;
pub mod protocol;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::{ConfigOverrides, ServerConfig};
pub use protocol::ProtocolHandler;
pub use transport::StdioTransport;
