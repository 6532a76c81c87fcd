//! MCP stdio server exposing the SICAP public-procurement registry API
//! as callable tools.

pub mod app;
pub mod constants;
pub mod errors;
pub mod mcp;
pub mod services;
pub mod utils;
