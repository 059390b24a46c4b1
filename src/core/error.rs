use rmcp::model::ErrorCode;
use rmcp::ErrorData as McpError;
use thiserror::Error;

use crate::clients::osascript::AutomationError;

/// Request-level failures that surface as protocol errors rather than as
/// `isError` tool results.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Recipient and message are required")]
    MissingSendArgs,
    #[error("Query is required")]
    MissingQuery,
    #[error("Unknown tool")]
    UnknownTool,
    #[error("Unknown resource: {0}")]
    UnknownResource(String),
    #[error("Failed to read contacts: {0}")]
    ReadFailed(#[source] AutomationError),
}

impl From<BridgeError> for McpError {
    fn from(e: BridgeError) -> Self {
        let message = e.to_string();
        match e {
            BridgeError::MissingSendArgs | BridgeError::MissingQuery => {
                McpError::invalid_params(message, None)
            }
            BridgeError::UnknownTool => McpError::new(ErrorCode::METHOD_NOT_FOUND, message, None),
            BridgeError::UnknownResource(uri) => {
                McpError::resource_not_found(message, Some(serde_json::json!({ "uri": uri })))
            }
            BridgeError::ReadFailed(_) => McpError::internal_error(message, None),
        }
    }
}
