//! Nutri Tools module
//!
//! MCP tool implementations for the nutrition label editor.

pub mod export;
pub mod label;
pub mod render;
pub mod status;
