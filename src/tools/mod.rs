//! Nourish Tools module
//!
//! Tool implementations behind the MCP server.

pub mod recipes;
pub mod recommendations;
pub mod status;
