//! MCP server
//!
//! Exposes the tools over the Model Context Protocol (stdio transport).

mod server;

pub use server::DisciplineService;
