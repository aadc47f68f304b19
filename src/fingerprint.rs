// src/fingerprint.rs
//! Content and identity keys.
//!
//! - `strict_fingerprint`: hash of the normalized `title + " " + description`; the
//!   cluster key used for exact-duplicate detection.
//! - `identity_key`: hash of the raw `url_source_published_at_title`; the stable
//!   upsert key handed to persistence.
//!
//! Both are SHA-256 truncated to 128 bits (32 hex chars).

use sha2::{Digest, Sha256};
use std::fmt::Write as _;

use crate::ingest::Article;
use crate::text::normalize_text;

const DIGEST_BYTES: usize = 16;

/// 128-bit hex digest of `text`.
pub fn digest128(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(DIGEST_BYTES * 2);
    for b in digest.iter().take(DIGEST_BYTES) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// The text a cluster is matched on: `title + " " + description`, unnormalized.
pub fn core_text(title: &str, description: &str) -> String {
    format!("{} {}", title, description)
}

/// Strict content fingerprint over the normalized core text.
pub fn strict_fingerprint(title: &str, description: &str) -> String {
    digest128(&normalize_text(&core_text(title, description)))
}

/// Identity key over raw (non-normalized) reconciled field values.
pub fn identity_key(article: &Article) -> String {
    let base = format!(
        "{}_{}_{}_{}",
        article.url, article.source, article.published_at, article.title
    );
    digest128(&base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn art(title: &str, url: &str, source: &str, published_at: &str) -> Article {
        Article {
            title: title.into(),
            url: url.into(),
            source: source.into(),
            published_at: published_at.into(),
            ..Article::default()
        }
    }

    #[test]
    fn digest_is_fixed_length_hex() {
        let d = digest128("anything");
        assert_eq!(d.len(), 32);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(d, digest128("anything"));
    }

    #[test]
    fn strict_fingerprint_ignores_case_and_punctuation() {
        let a = strict_fingerprint("Rocket Launch!", "ISRO succeeds.");
        let b = strict_fingerprint("rocket   launch", "isro SUCCEEDS");
        assert_eq!(a, b);
        assert_ne!(a, strict_fingerprint("Rocket launch", "ISRO fails"));
    }

    #[test]
    fn identity_key_uses_raw_fields() {
        let a = art("Title", "https://x/1", "BBC", "2025-09-01T10:00:00Z");
        let b = art("title", "https://x/1", "BBC", "2025-09-01T10:00:00Z");
        // Raw values: case differences produce distinct identities.
        assert_ne!(identity_key(&a), identity_key(&b));
        assert_eq!(identity_key(&a), identity_key(&a.clone()));
    }

    #[test]
    fn identity_key_ignores_non_identity_fields() {
        let a = art("T", "u", "s", "p");
        let mut b = a.clone();
        b.description = "different body".into();
        b.fetched_at = "2025-01-01T00:00:00".into();
        assert_eq!(identity_key(&a), identity_key(&b));
    }
}
