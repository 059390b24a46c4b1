use std::str::FromStr;

use rmcp::model::{CallToolResult, Content, JsonObject, ReadResourceResult, ResourceContents};
use serde::Deserialize;
use serde_json::Value;

use crate::clients::osascript::ScriptRunner;
use crate::core::error::BridgeError;
use crate::core::tool::ResourceUri;
use crate::tools::applescript;

/// What `search_contacts` does when `query` is missing or not a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryPolicy {
    /// Reject with an invalid-params error.
    #[default]
    Strict,
    /// Coerce the way a JavaScript `String(value)` would, so a missing query
    /// searches for the text "undefined".
    Legacy,
}

impl FromStr for QueryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(QueryPolicy::Strict),
            "legacy" => Ok(QueryPolicy::Legacy),
            other => Err(format!("unknown query policy: {other}")),
        }
    }
}

fn js_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|i| match i {
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".into(),
    }
}

fn resolve_query(args: Option<&JsonObject>, policy: QueryPolicy) -> Result<String, BridgeError> {
    let raw = args.and_then(|a| a.get("query"));
    match (raw, policy) {
        (Some(Value::String(s)), _) => Ok(s.clone()),
        (_, QueryPolicy::Strict) => Err(BridgeError::MissingQuery),
        (None, QueryPolicy::Legacy) => Ok("undefined".into()),
        (Some(other), QueryPolicy::Legacy) => Ok(js_string(other)),
    }
}

/// `search_contacts`: lower-cases the query and returns the script's JSON text
/// verbatim. Execution failures come back as an `isError` result.
pub async fn search_contacts(
    runner: &dyn ScriptRunner,
    args: Option<&JsonObject>,
    policy: QueryPolicy,
) -> Result<CallToolResult, BridgeError> {
    let query = resolve_query(args, policy)?.to_lowercase();
    tracing::debug!(query = %query, "search_contacts");

    match runner.run(&applescript::search_contacts_script(&query)).await {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(e) => {
            tracing::warn!(error = %e, "contact search failed");
            Ok(CallToolResult::error(vec![Content::text(format!(
                "Search failed: {e}"
            ))]))
        }
    }
}

/// Body of `contacts://all`.
pub async fn read_all_contacts(runner: &dyn ScriptRunner) -> Result<ReadResourceResult, BridgeError> {
    let uri = ResourceUri::AllContacts;
    let text = runner
        .run(&applescript::list_contacts_script())
        .await
        .map_err(BridgeError::ReadFailed)?;

    let mut contents = ResourceContents::text(text, uri.as_str());
    if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
        *mime_type = Some(uri.mime_type().to_string());
    }
    Ok(ReadResourceResult { contents: vec![contents] })
}
