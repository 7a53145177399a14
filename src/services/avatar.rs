use sha2::{Digest, Sha256};

/// Deterministic Gravatar URL for an email address.
///
/// Gravatar hashes the trimmed, lowercased address, so the same account
/// always resolves to the same picture. Addresses without a Gravatar fall
/// back to a generated identicon.
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let hash = hasher.finalize();

    format!("https://www.gravatar.com/avatar/{:x}?d=identicon", hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let canonical = gravatar_url("ada@example.com");
        assert_eq!(gravatar_url("  ADA@Example.COM  "), canonical);
    }

    #[test]
    fn distinct_addresses_get_distinct_urls() {
        assert_ne!(gravatar_url("ada@example.com"), gravatar_url("grace@example.com"));
    }

    #[test]
    fn url_has_hex_digest_and_fallback() {
        let url = gravatar_url("ada@example.com");
        let rest = url.strip_prefix("https://www.gravatar.com/avatar/").unwrap();
        let digest = rest.strip_suffix("?d=identicon").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
