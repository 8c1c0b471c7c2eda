//! Reference (URI) helpers.

/// Extract the storage scheme from a reference.
///
/// The scheme is the leading run of ASCII letters and hyphens before
/// `://`, matched case-insensitively and returned lowercased. References
/// without the `scheme://` pattern have no scheme; adapter resolution for
/// them fails at first access.
pub fn scheme_of(reference: &str) -> Option<String> {
    let (head, _) = reference.split_once("://")?;
    if head.is_empty() || !head.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
        return None;
    }
    Some(head.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_scheme() {
        assert_eq!(scheme_of("https://example.com/doc"), Some("https".into()));
    }

    #[test]
    fn extracts_hyphenated_scheme_lowercased() {
        assert_eq!(
            scheme_of("In-Memory://fixtures/hotel"),
            Some("in-memory".into())
        );
    }

    #[test]
    fn no_separator_means_no_scheme() {
        assert_eq!(scheme_of("example.com/doc"), None);
        assert_eq!(scheme_of(""), None);
    }

    #[test]
    fn invalid_scheme_characters_rejected() {
        assert_eq!(scheme_of("ht tp://x"), None);
        assert_eq!(scheme_of("h2tp://x"), None);
        assert_eq!(scheme_of("://x"), None);
    }
}
