// src/text.rs
//! Text canonicalization shared by fingerprinting, similarity and keyword matching.
//!
//! Every comparison in the engine goes through [`normalize_text`]; if two call sites
//! normalized differently, an exact fingerprint hit and a Jaccard hit could disagree
//! about the same pair of texts.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashSet;

/// Lowercase, drop everything outside `[a-z0-9\s]`, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) Lowercase (Unicode-aware; non-ASCII letters are dropped in step 2)
    let lowered = s.to_lowercase();

    // 2) Strip everything that is not an ASCII letter, digit or whitespace
    static RE_STRIP: OnceCell<Regex> = OnceCell::new();
    let re_strip = RE_STRIP.get_or_init(|| Regex::new(r"[^a-z0-9\s]").expect("strip regex"));
    let stripped = re_strip.replace_all(&lowered, "");

    // 3) Collapse whitespace + trim
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Distinct whitespace-separated tokens of the normalized text.
pub fn tokens(s: &str) -> HashSet<String> {
    normalize_text(s)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
