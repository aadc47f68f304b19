// src/similarity.rs
//! Jaccard similarity over normalized word sets.

use crate::text::tokens;

/// `|A ∩ B| / |A ∪ B|` over the token sets of both texts.
/// Returns 0.0 when either side has no tokens, so two empty texts never match.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let set_a = tokens(a);
    let set_b = tokens(b);
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let inter = set_a.intersection(&set_b).count() as f64;
    let union = set_a.union(&set_b).count() as f64;
    inter / union
}
