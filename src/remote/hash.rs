//! Content hashing for the in-memory store.
//!
//! Revisions only need to be opaque and change whenever the content
//! changes, so a SHA256 over a git-style blob header is enough. They are
//! not comparable with the SHA-1 blob ids GitHub returns.

use sha2::{Digest, Sha256};

/// Compute the revision id for a file body.
///
/// The `blob <len>\0` prefix mirrors git's object framing so an empty
/// file still has a distinct, stable id.
#[must_use]
pub fn content_sha(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_sha_deterministic() {
        let a = content_sha("## A\n- x\n");
        let b = content_sha("## A\n- x\n");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // SHA256 produces 64 hex chars
    }

    #[test]
    fn test_content_sha_changes_with_content() {
        assert_ne!(content_sha("## A\n- x\n"), content_sha("## A\n- y\n"));
    }

    #[test]
    fn test_empty_content_has_sha() {
        assert_eq!(content_sha("").len(), 64);
    }
}
