//! Nutri Library
//!
//! Brazilian nutrition facts label ("INFORMAÇÃO NUTRICIONAL") engine: value
//! formatting, %VD and kJ calculation, nutrient hierarchy, and the label editor
//! exposed over MCP.

pub mod build_info;
pub mod config;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
