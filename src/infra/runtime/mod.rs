pub mod limits;
pub mod mcp_transport;
