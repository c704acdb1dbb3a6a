use std::collections::BTreeSet;

use mailparse::MailAddr;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Opaque account (registration) identifier used to look up contact data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recipient given as an account id plus possibly stale contact data.
///
/// The contact blob is a JSON array of contact URIs, e.g.
/// `["mailto:admin@example.com", "tel:+15550100"]`.
///
/// Field names are accepted in lower case, capitalized, or upper case
/// (`id`/`Id`/`ID`), which covers descriptor files exported with either
/// snake-case or Go-style field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientDescriptor {
    #[serde(alias = "Id", alias = "ID")]
    pub id: AccountId,
    #[serde(default, alias = "Contact", alias = "CONTACT")]
    pub contact: Option<serde_json::Value>,
    /// Derived from `contact`; anything supplied in the input is overwritten
    /// during resolution.
    #[serde(default, alias = "Email", alias = "EMAIL")]
    pub email: String,
}

impl RecipientDescriptor {
    pub fn new(id: i64, contact: Option<serde_json::Value>) -> Self {
        Self {
            id: AccountId(id),
            contact,
            email: String::new(),
        }
    }

    /// Replace the contact blob and re-derive `email` from it.
    pub fn refresh(&mut self, contact: Option<serde_json::Value>) {
        self.email = contact
            .as_ref()
            .and_then(email_from_contact)
            .unwrap_or_default();
        self.contact = contact;
    }
}

/// Extract the first `mailto:` address from a contact blob.
///
/// Returns `None` for JSON null, non-arrays, empty arrays, arrays with no
/// `mailto:` entry, or a `mailto:` entry that is blank once trimmed.
pub fn email_from_contact(contact: &serde_json::Value) -> Option<String> {
    let entries = contact.as_array()?;

    entries
        .iter()
        .filter_map(|v| v.as_str())
        .find_map(|uri| uri.strip_prefix("mailto:"))
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
}

/// The ordered list of addresses a run indexes into with its checkpoint.
///
/// Two shapes exist: addresses resolved from descriptors (deduplicated and
/// sorted byte-wise, so offsets are stable across re-resolution) and raw
/// address files (kept in file order, one entry per line, so offsets match
/// line numbers).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destinations(Vec<String>);

impl Destinations {
    /// Build a deduplicated, sorted list. Blank entries are dropped.
    pub fn resolved<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = addresses
            .into_iter()
            .map(Into::into)
            .filter(|a| !a.trim().is_empty())
            .collect();
        Self(set.into_iter().collect())
    }

    /// Split raw text on `\n`, one destination per line.
    ///
    /// Blank lines (including a trailing one left by a final newline) are kept
    /// so that index `n` is always line `n` of the file.
    pub fn from_lines(text: &str) -> Self {
        Self(text.split('\n').map(str::to_string).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// A validated single mailbox, used for the sender address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress {
    display_name: Option<String>,
    address: String,
}

impl EmailAddress {
    /// Parse an RFC 5322 mailbox: `local@domain` or `"Display Name" <local@domain>`.
    ///
    /// Exactly one mailbox is accepted; groups and lists are rejected.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidAddress(input.to_string());

        let list = mailparse::addrparse(input.trim()).map_err(|_| invalid())?;
        let [MailAddr::Single(info)] = list.as_slice() else {
            return Err(invalid());
        };

        match info.addr.split_once('@') {
            Some((local, domain))
                if !local.is_empty()
                    && !domain.is_empty()
                    && !info.addr.chars().any(char::is_whitespace) => {}
            _ => return Err(invalid()),
        }

        Ok(Self {
            display_name: info
                .display_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            address: info.addr.clone(),
        })
    }

    /// The bare `local@domain` part.
    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Renders a header-safe mailbox; the display name is always quoted.
impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.display_name {
            Some(name) => {
                let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "\"{}\" <{}>", escaped, self.address)
            }
            None => write!(f, "{}", self.address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_from_contact_picks_first_mailto() {
        let contact = json!(["tel:+15550100", "mailto:first@example.com", "mailto:second@example.com"]);
        assert_eq!(
            email_from_contact(&contact),
            Some("first@example.com".to_string())
        );
    }

    #[test]
    fn test_email_from_contact_unusable_blobs() {
        assert_eq!(email_from_contact(&json!(null)), None);
        assert_eq!(email_from_contact(&json!([])), None);
        assert_eq!(email_from_contact(&json!({"mailto": "a@x"})), None);
        assert_eq!(email_from_contact(&json!(["tel:+15550100"])), None);
        assert_eq!(email_from_contact(&json!(["mailto:   "])), None);
    }

    #[test]
    fn test_descriptor_deserialize() {
        let input = r#"[
            {"id": 1, "contact": ["mailto:a@example.com"]},
            {"ID": 2, "Contact": null},
            {"id": 3}
        ]"#;
        let descriptors: Vec<RecipientDescriptor> = serde_json::from_str(input).unwrap();
        assert_eq!(descriptors.len(), 3);
        assert_eq!(descriptors[0].id, AccountId(1));
        assert_eq!(descriptors[1].id, AccountId(2));
        assert!(descriptors[1].contact.is_none());
        assert!(descriptors[2].email.is_empty());
    }

    #[test]
    fn test_descriptor_field_casings() {
        let input = r#"[
            {"Id": 4, "CONTACT": ["mailto:d@example.com"], "EMAIL": "d@example.com"},
            {"ID": 5, "Contact": [], "Email": ""}
        ]"#;
        let descriptors: Vec<RecipientDescriptor> = serde_json::from_str(input).unwrap();
        assert_eq!(descriptors[0].id, AccountId(4));
        assert_eq!(descriptors[0].contact, Some(json!(["mailto:d@example.com"])));
        assert_eq!(descriptors[0].email, "d@example.com");
        assert_eq!(descriptors[1].id, AccountId(5));
    }

    #[test]
    fn test_refresh_overwrites_email() {
        let mut d = RecipientDescriptor::new(7, None);
        d.email = "stale@example.com".to_string();
        d.refresh(Some(json!(["mailto:fresh@example.com"])));
        assert_eq!(d.email, "fresh@example.com");

        d.refresh(Some(json!([])));
        assert_eq!(d.email, "");
    }

    #[test]
    fn test_resolved_destinations_sorted_and_deduplicated() {
        let d = Destinations::resolved(["b@x", "a@x", "a@x", " ", ""]);
        assert_eq!(d.as_slice(), ["a@x", "b@x"]);
    }

    #[test]
    fn test_from_lines_keeps_line_numbers() {
        let d = Destinations::from_lines("a@x\n\nb@x\n");
        assert_eq!(d.as_slice(), ["a@x", "", "b@x", ""]);
        assert_eq!(d.len(), 4);
    }

    #[test]
    fn test_email_address_parse() {
        let bare = EmailAddress::parse("noreply@example.com").unwrap();
        assert_eq!(bare.address(), "noreply@example.com");
        assert_eq!(bare.to_string(), "noreply@example.com");

        let named = EmailAddress::parse("Ops <ops@example.com>").unwrap();
        assert_eq!(named.address(), "ops@example.com");
        assert_eq!(named.to_string(), "\"Ops\" <ops@example.com>");

        for bad in ["", "nobody", "@example.com", "a@", "a@example.com, b@example.com"] {
            assert!(EmailAddress::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_quoted_display_name_stays_one_mailbox() {
        let named = EmailAddress::parse("\"Ops, Team\" <ops@example.com>").unwrap();
        assert_eq!(named.address(), "ops@example.com");

        let rendered = named.to_string();
        assert_eq!(rendered, "\"Ops, Team\" <ops@example.com>");

        let reparsed = mailparse::addrparse(&rendered).unwrap();
        assert_eq!(reparsed.len(), 1);
        assert_eq!(EmailAddress::parse(&rendered).unwrap(), named);
    }

    #[test]
    fn test_single_label_domain_accepted() {
        let local = EmailAddress::parse("ops@mailhost").unwrap();
        assert_eq!(local.address(), "ops@mailhost");
        assert_eq!(local.to_string(), "ops@mailhost");
    }
}
