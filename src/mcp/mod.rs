//! MCP server module
//!
//! Exposes the catalog and recommendation tools over the Model Context Protocol.

mod server;

pub use server::NourishService;
