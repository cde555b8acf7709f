//! MCP tool server exposing the service operations over stdio.

mod server;

pub use server::McpServer;
