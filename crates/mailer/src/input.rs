//! Loading the recipient and body files.

use std::path::Path;

use anyhow::Context;

use bulkmail_common::types::{Destinations, RecipientDescriptor};

/// Recipients as read from `--to-file`, before any resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipients {
    /// One address per line, used as-is.
    Addresses(Destinations),
    /// Account descriptors still to be resolved against the contact store.
    Descriptors(Vec<RecipientDescriptor>),
}

pub fn load_recipients(path: &Path, emails: bool) -> anyhow::Result<Recipients> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Reading {}", path.display()))?;

    if emails {
        return Ok(Recipients::Addresses(Destinations::from_lines(&text)));
    }

    let descriptors = serde_json::from_str(&text)
        .with_context(|| format!("Unmarshaling {}", path.display()))?;
    Ok(Recipients::Descriptors(descriptors))
}

pub fn load_body(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use bulkmail_common::types::AccountId;
    use tempfile::NamedTempFile;

    use super::*;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_address_file_keeps_every_line() {
        let file = file_with("a@example.com\nb@example.com\n\n");
        let recipients = load_recipients(file.path(), true).unwrap();

        match recipients {
            Recipients::Addresses(d) => {
                assert_eq!(d.as_slice(), ["a@example.com", "b@example.com", "", ""]);
            }
            other => panic!("unexpected recipients: {other:?}"),
        }
    }

    #[test]
    fn test_descriptor_file() {
        let file = file_with(r#"[{"id": 10, "contact": ["mailto:a@example.com"]}, {"id": 11, "contact": null}]"#);
        let recipients = load_recipients(file.path(), false).unwrap();

        match recipients {
            Recipients::Descriptors(d) => {
                assert_eq!(d.len(), 2);
                assert_eq!(d[0].id, AccountId(10));
                assert_eq!(d[1].contact, None);
            }
            other => panic!("unexpected recipients: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_descriptor_file() {
        let file = file_with("a@example.com\n");
        let err = load_recipients(file.path(), false).unwrap_err();
        assert!(err.to_string().starts_with("Unmarshaling"));
    }

    #[test]
    fn test_missing_files() {
        let missing = Path::new("/nonexistent/bulkmail/to.txt");
        assert!(load_recipients(missing, true).is_err());
        assert!(load_body(missing).is_err());
    }

    #[test]
    fn test_body_read_whole() {
        let file = file_with("Hello,\n\nWe will be down tonight.\n");
        assert_eq!(
            load_body(file.path()).unwrap(),
            "Hello,\n\nWe will be down tonight.\n"
        );
    }
}
