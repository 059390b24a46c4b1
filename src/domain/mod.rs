use serde::{Deserialize, Serialize};

/// One entry of the JSON array the contact scripts print. The MCP path passes
/// that text through untouched; only the admin CLI decodes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
}

pub fn parse_contacts(raw: &str) -> Result<Vec<Contact>, serde_json::Error> {
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_script_output() {
        let raw = r#"[{"name":"Marissa \"Mo\" Lee","phones":["555-0123"],"emails":[]},{"name":"Bob","phones":[],"emails":["bob@example.com"]}]"#;
        let contacts = parse_contacts(raw).unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].name, r#"Marissa "Mo" Lee"#);
        assert_eq!(contacts[0].phones, vec!["555-0123"]);
        assert_eq!(contacts[1].emails, vec!["bob@example.com"]);
    }

    #[test]
    fn empty_array_is_no_contacts() {
        assert!(parse_contacts("[]").unwrap().is_empty());
    }

    #[test]
    fn parses_escaped_control_characters() {
        let raw = r#"[{"name":"Ann\nLee","phones":["555\t0123"],"emails":[]}]"#;
        let contacts = parse_contacts(raw).unwrap();
        assert_eq!(contacts[0].name, "Ann\nLee");
        assert_eq!(contacts[0].phones, vec!["555\t0123"]);
    }
}
