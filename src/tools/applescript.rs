//! AppleScript program builders. Every caller-supplied value goes through
//! [`escape`] before it lands inside a string literal; contact fields are
//! escaped at run time by the `escapeText` handler (backslash, quote, CR, LF,
//! tab) so the emitted JSON parses.

/// Make `s` safe inside an AppleScript double-quoted literal.
pub fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

const JSON_HANDLERS: &str = r#"on replaceText(theText, findText, replaceWith)
	set savedDelims to AppleScript's text item delimiters
	set AppleScript's text item delimiters to findText
	set theParts to text items of theText
	set AppleScript's text item delimiters to replaceWith
	set theText to theParts as text
	set AppleScript's text item delimiters to savedDelims
	return theText
end replaceText

on escapeText(theText)
	set theText to theText as text
	set theText to my replaceText(theText, "\\", "\\\\")
	set theText to my replaceText(theText, "\"", "\\\"")
	set theText to my replaceText(theText, return, "\\r")
	set theText to my replaceText(theText, linefeed, "\\n")
	set theText to my replaceText(theText, tab, "\\t")
	return theText
end escapeText

on jsonList(theValues)
	set out to ""
	repeat with v in theValues
		if out is not "" then set out to out & ","
		set out to out & "\"" & my escapeText(contents of v) & "\""
	end repeat
	return "[" & out & "]"
end jsonList"#;

const CONTACT_ENTRY: &str = r#"			set pPhones to value of phones of p
			set pEmails to value of emails of p
			if output is not "" then set output to output & ","
			set output to output & "{\"name\":\"" & my escapeText(pName) & "\",\"phones\":" & my jsonList(pPhones) & ",\"emails\":" & my jsonList(pEmails) & "}""#;

fn contacts_script(escaped_query: Option<&str>) -> String {
    let body = match escaped_query {
        Some(q) => format!("\t\tif pName contains \"{q}\" then\n{CONTACT_ENTRY}\n\t\tend if"),
        None => CONTACT_ENTRY.to_string(),
    };
    format!(
        r#"{JSON_HANDLERS}

tell application "Contacts"
	set output to ""
	repeat with p in every person
		set pName to name of p
		if pName is missing value then set pName to ""
{body}
	end repeat
end tell
return "[" & output & "]""#
    )
}

/// Every contact as a JSON array of `{name, phones, emails}`.
pub fn list_contacts_script() -> String {
    contacts_script(None)
}

/// Contacts whose name contains `query`. The caller decides the casing.
pub fn search_contacts_script(query: &str) -> String {
    contacts_script(Some(&escape(query)))
}

/// Send `message` to `recipient` over the iMessage service.
pub fn send_message_script(recipient: &str, message: &str) -> String {
    format!(
        r#"tell application "Messages"
	set targetService to 1st service whose service type = iMessage
	set targetBuddy to buddy "{recipient}" of targetService
	send "{message}" to targetBuddy
end tell"#,
        recipient = escape(recipient),
        message = escape(message),
    )
}
