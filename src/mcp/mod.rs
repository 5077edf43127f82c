//! MCP transport: bridges the line-delimited JSON protocol to `core::storage`.

mod call_tool_result;
pub mod config;
mod params;
pub mod server;
mod server_impl;
