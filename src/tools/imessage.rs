use rmcp::model::{CallToolResult, Content, JsonObject};

use crate::clients::osascript::ScriptRunner;
use crate::core::error::BridgeError;
use crate::tools::applescript;

fn non_empty<'a>(args: Option<&'a JsonObject>, key: &str) -> Option<&'a str> {
    args?.get(key)?.as_str().filter(|s| !s.is_empty())
}

/// `send_imessage`: both fields are checked before anything is spawned. A failed
/// send is reported in the tool result, not as a protocol error.
pub async fn send_imessage(
    runner: &dyn ScriptRunner,
    args: Option<&JsonObject>,
) -> Result<CallToolResult, BridgeError> {
    let (Some(recipient), Some(message)) = (non_empty(args, "recipient"), non_empty(args, "message"))
    else {
        return Err(BridgeError::MissingSendArgs);
    };

    let script = applescript::send_message_script(recipient, message);
    match runner.run(&script).await {
        Ok(_) => {
            tracing::info!(recipient = %recipient, "imessage sent");
            Ok(CallToolResult::success(vec![Content::text(format!(
                "Message sent successfully to {recipient}"
            ))]))
        }
        Err(e) => {
            tracing::warn!(recipient = %recipient, error = %e, "imessage send failed");
            Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to send message: {e}"
            ))]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{args, failing_runner, recording_runner};
    use serde_json::json;

    #[tokio::test]
    async fn it_rejects_missing_fields_without_spawning() {
        let (runner, seen) = recording_runner("");
        for bad in [
            None,
            Some(args(json!({}))),
            Some(args(json!({"recipient": "555-0123"}))),
            Some(args(json!({"message": "hi"}))),
            Some(args(json!({"recipient": "", "message": "hi"}))),
            Some(args(json!({"recipient": "555-0123", "message": ""}))),
            Some(args(json!({"recipient": 5550123, "message": "hi"}))),
        ] {
            let err = send_imessage(&runner, bad.as_ref()).await.unwrap_err();
            assert!(matches!(err, BridgeError::MissingSendArgs));
            assert_eq!(err.to_string(), "Recipient and message are required");
        }
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn it_escapes_the_body_and_confirms() {
        let (runner, seen) = recording_runner("");
        let a = args(json!({"recipient": "555-0123", "message": "Say \"hi\""}));
        let out = send_imessage(&runner, Some(&a)).await.unwrap();

        let scripts = seen.lock().unwrap();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains(r#"Say \"hi\""#));

        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["content"][0]["type"], "text");
        assert_eq!(v["content"][0]["text"], "Message sent successfully to 555-0123");
        assert_ne!(v["isError"], json!(true));
    }

    #[tokio::test]
    async fn it_reports_failures_in_the_result() {
        let runner = failing_runner("Can't get buddy");
        let a = args(json!({"recipient": "nobody", "message": "hi"}));
        let out = send_imessage(&runner, Some(&a)).await.unwrap();
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["isError"], json!(true));
        assert_eq!(
            v["content"][0]["text"],
            "Failed to send message: AppleScript error: Can't get buddy"
        );
    }
}
