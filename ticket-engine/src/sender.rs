use regex::Regex;
use shared_types::EmailAddress;
use std::sync::OnceLock;

fn sender_regex() -> &'static Regex {
    static SENDER: OnceLock<Regex> = OnceLock::new();
    SENDER.get_or_init(|| {
        Regex::new(r#"^(.*?)\s*<\s*([^<>\s]+@[^<>\s]+)\s*>$"#).expect("sender pattern is valid")
    })
}

/// Splits a raw `"Name <email>"` sender into its parts.
/// Bare addresses are accepted; anything without an `@` is rejected.
pub fn parse_sender(raw: &str) -> Option<EmailAddress> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(caps) = sender_regex().captures(raw) {
        let email = caps.get(2)?.as_str().to_string();
        let name = caps
            .get(1)
            .map(|m| m.as_str().trim().trim_matches('"').trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        return Some(EmailAddress { email, name });
    }

    if raw.contains('@') && !raw.contains(char::is_whitespace) {
        return Some(EmailAddress {
            email: raw.to_string(),
            name: None,
        });
    }

    None
}

/// Name shown in ticket lists: the display name, else the address, else the raw header
pub fn sender_label(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "Unknown sender".to_string();
    };
    match parse_sender(raw) {
        Some(EmailAddress {
            name: Some(name), ..
        }) => name,
        Some(EmailAddress { email, .. }) => email,
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_address() {
        let parsed = parse_sender("Priya Nair <priya@acme-industries.com>").unwrap();
        assert_eq!(parsed.email, "priya@acme-industries.com");
        assert_eq!(parsed.name.as_deref(), Some("Priya Nair"));
    }

    #[test]
    fn test_quoted_name() {
        let parsed = parse_sender("\"Sales, ACME\" <sales@acme.com>").unwrap();
        assert_eq!(parsed.name.as_deref(), Some("Sales, ACME"));
    }

    #[test]
    fn test_bare_address() {
        let parsed = parse_sender("orders@acme.com").unwrap();
        assert_eq!(parsed.email, "orders@acme.com");
        assert!(parsed.name.is_none());

        let parsed = parse_sender("<orders@acme.com>").unwrap();
        assert_eq!(parsed.email, "orders@acme.com");
        assert!(parsed.name.is_none());
    }

    #[test]
    fn test_rejects_non_addresses() {
        assert!(parse_sender("").is_none());
        assert!(parse_sender("ACME purchasing").is_none());
        assert_eq!(sender_label(Some("ACME purchasing")), "ACME purchasing");
        assert_eq!(sender_label(None), "Unknown sender");
    }
}
