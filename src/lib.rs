//! MCP server that sends iMessages and reads macOS Contacts through AppleScript.

pub mod cli;
pub mod clients;
pub mod core;
pub mod domain;
pub mod infra;
pub mod tools;
