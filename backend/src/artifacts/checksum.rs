//! Checksum calculation for artifact fingerprints.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 checksum of raw artifact bytes.
///
/// # Arguments
/// * `content` - Bytes exactly as read from disk
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn calculate_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    hex::encode(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let content = br#"{"mean": [40.7, -73.9]}"#;
        assert_eq!(calculate_checksum(content), calculate_checksum(content));
    }

    #[test]
    fn test_different_content_different_checksum() {
        let checksum1 = calculate_checksum(br#"{"intercept": 1.0}"#);
        let checksum2 = calculate_checksum(br#"{"intercept": 2.0}"#);
        assert_ne!(checksum1, checksum2);
    }

    #[test]
    fn test_checksum_is_hex_sha256() {
        let checksum = calculate_checksum(b"");
        assert_eq!(checksum.len(), 64);
        assert_eq!(
            checksum,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
