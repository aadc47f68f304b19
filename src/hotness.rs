// src/hotness.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::HotnessThresholds;

/// Three-level label derived from the 0–100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hotness {
    Hot,
    Medium,
    Low,
}

impl Hotness {
    pub fn as_str(self) -> &'static str {
        match self {
            Hotness::Hot => "Hot",
            Hotness::Medium => "Medium",
            Hotness::Low => "Low",
        }
    }
}

impl fmt::Display for Hotness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HotnessThresholds {
    pub fn classify(&self, score: u8) -> Hotness {
        if score >= self.hot {
            Hotness::Hot
        } else if score >= self.medium {
            Hotness::Medium
        } else {
            Hotness::Low
        }
    }
}

/// Classify with the default cutoffs (70 / 40).
pub fn classify(score: u8) -> Hotness {
    HotnessThresholds::default().classify(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_exact() {
        assert_eq!(classify(0), Hotness::Low);
        assert_eq!(classify(39), Hotness::Low);
        assert_eq!(classify(40), Hotness::Medium);
        assert_eq!(classify(69), Hotness::Medium);
        assert_eq!(classify(70), Hotness::Hot);
        assert_eq!(classify(100), Hotness::Hot);
    }

    #[test]
    fn custom_cutoffs() {
        let t = HotnessThresholds { hot: 50, medium: 50 };
        assert_eq!(t.classify(49), Hotness::Low);
        assert_eq!(t.classify(50), Hotness::Hot);
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(serde_json::to_string(&Hotness::Medium).unwrap(), "\"Medium\"");
        assert_eq!(Hotness::Hot.to_string(), "Hot");
    }
}
