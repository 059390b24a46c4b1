//! Static capability catalog. Both the listings and the dispatcher's accepted
//! identifiers come from the enums below, so the two cannot drift apart.

use std::sync::Arc;

use rmcp::model::{AnnotateAble, JsonObject, RawResource, Resource, Tool};
use serde_json::{json, Value};

/// Every tool the server accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    SendImessage,
    SearchContacts,
}

impl ToolName {
    pub const ALL: [ToolName; 2] = [ToolName::SendImessage, ToolName::SearchContacts];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::SendImessage => "send_imessage",
            ToolName::SearchContacts => "search_contacts",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            ToolName::SendImessage => "Send an iMessage to a contact",
            ToolName::SearchContacts => "Search contacts by name",
        }
    }

    pub fn input_schema(self) -> Value {
        match self {
            ToolName::SendImessage => json!({
                "type": "object",
                "properties": {
                    "recipient": {
                        "type": "string",
                        "description": "Phone number or email of the recipient"
                    },
                    "message": {
                        "type": "string",
                        "description": "Message content to send"
                    }
                },
                "required": ["recipient", "message"]
            }),
            ToolName::SearchContacts => json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Name to search for"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    pub fn descriptor(self) -> Tool {
        Tool::new(self.as_str(), self.description(), Arc::new(as_object(self.input_schema())))
    }
}

/// Every resource the server can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceUri {
    AllContacts,
}

impl ResourceUri {
    pub const ALL: [ResourceUri; 1] = [ResourceUri::AllContacts];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceUri::AllContacts => "contacts://all",
        }
    }

    pub fn parse(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == uri)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ResourceUri::AllContacts => "application/json",
        }
    }

    pub fn descriptor(self) -> Resource {
        let (name, description) = match self {
            ResourceUri::AllContacts => {
                ("All Contacts", "List of all contacts in the address book")
            }
        };
        let mut raw = RawResource::new(self.as_str(), name.to_string());
        raw.description = Some(description.to_string());
        raw.mime_type = Some(self.mime_type().to_string());
        raw.no_annotation()
    }
}

fn as_object(v: Value) -> JsonObject {
    match v {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tool_round_trips_through_parse() {
        for t in ToolName::ALL {
            assert_eq!(ToolName::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn parse_rejects_near_misses() {
        assert_eq!(ToolName::parse("unknown_tool"), None);
        assert_eq!(ToolName::parse("Send_iMessage"), None);
        assert_eq!(ToolName::parse(" send_imessage"), None);
        assert_eq!(ResourceUri::parse("contacts://bogus"), None);
        assert_eq!(ResourceUri::parse("CONTACTS://ALL"), None);
    }

    #[test]
    fn schemas_declare_required_fields() {
        let send = ToolName::SendImessage.input_schema();
        assert_eq!(send["required"], json!(["recipient", "message"]));
        let search = ToolName::SearchContacts.input_schema();
        assert_eq!(search["required"], json!(["query"]));
    }

    #[test]
    fn resource_descriptor_serializes_mime_type() {
        let v = serde_json::to_value(ResourceUri::AllContacts.descriptor()).unwrap();
        assert_eq!(v["uri"], "contacts://all");
        assert_eq!(v["mimeType"], "application/json");
        assert_eq!(v["name"], "All Contacts");
    }

    #[test]
    fn tool_descriptor_carries_schema() {
        let v = serde_json::to_value(ToolName::SearchContacts.descriptor()).unwrap();
        assert_eq!(v["name"], "search_contacts");
        assert_eq!(v["inputSchema"]["properties"]["query"]["type"], "string");
    }
}
