//! Shared key allocation for storage backends.
//!
//! Key format: `notes/{uuidv7}{ext}`. The UUIDv7 component makes keys
//! time-ordered and globally unique without coordination; the extension is
//! carried over (lowercased) from the declared attachment name so served
//! content keeps a sensible content type.

use uuid::Uuid;

/// Fixed namespace prefix for all ingested documents.
pub const NOTES_PREFIX: &str = "notes";

/// Allocate a fresh, globally-unique storage key for a document.
///
/// The extension (final `.`-suffix) of `filename` is preserved in lowercase;
/// a name with no extension yields a bare key.
pub fn allocate_note_key(filename: &str) -> String {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default();
    format!("{}/{}{}", NOTES_PREFIX, Uuid::now_v7(), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_live_under_the_notes_prefix() {
        let key = allocate_note_key("Lecture Notes.HTML");
        assert!(key.starts_with("notes/"));
        assert!(key.ends_with(".html"));
    }

    #[test]
    fn test_keys_are_unique() {
        assert_ne!(allocate_note_key("a.html"), allocate_note_key("a.html"));
    }

    #[test]
    fn test_extensionless_name() {
        let key = allocate_note_key("README");
        assert!(key.starts_with("notes/"));
        assert!(!key.contains('.'));
    }
}
