use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use studio_core::Category;

/// Hard cap on snippets kept per user.
pub const MAX_MEMORIES_PER_USER: usize = 10;
/// Snippets scoring below this are never stored.
pub const MIN_SCORE_THRESHOLD: f64 = 2.0;
/// How many snippets a read returns.
pub const READ_WINDOW: usize = 5;
/// Token-set overlap at or above which a candidate is a near-duplicate.
pub const DUPLICATE_OVERLAP: f64 = 0.8;
/// Minimum trimmed length of a storable snippet, in characters.
pub const MIN_CONTENT_CHARS: usize = 5;

const BASE_SCORE: f64 = 3.0;
const PRODUCT_BONUS: f64 = 0.5;
const ACTION_BONUS: f64 = 0.5;
const FILLER_PENALTY: f64 = 0.5;
const LONG_BONUS: f64 = 0.3;
const SHORT_PENALTY: f64 = 0.5;
const LONG_CHARS: usize = 50;
const SHORT_CHARS: usize = 20;

const ACTION_WORDS: &[&str] = &[
    "build",
    "create",
    "implement",
    "design",
    "develop",
    "want",
    "need",
    "goal",
];

const FILLER_PHRASES: &[&str] = &["user wants", "user is interested", "general interest"];

/// A durable fact about a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySnippet {
    pub content: String,
    #[serde(default = "default_score")]
    pub score: f64,
    #[serde(with = "studio_core::timestamp", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub category: Category,
    /// Filled from `content` on load when absent.
    #[serde(default)]
    pub content_hash: String,
}

fn default_score() -> f64 {
    BASE_SCORE
}

impl MemorySnippet {
    pub fn new(content: impl Into<String>, score: f64, category: Category) -> Self {
        let content = content.into();
        Self {
            content_hash: content_hash(&content),
            content,
            score,
            created_at: Utc::now(),
            category,
        }
    }

    /// Snippet upgraded from the legacy plain-string format.
    pub fn legacy(content: impl Into<String>) -> Self {
        Self::new(content, BASE_SCORE, Category::General)
    }
}

/// Stable fingerprint of normalized content: the first 12 hex digits of the
/// MD5 of the lower-cased, trimmed text.
pub fn content_hash(content: &str) -> String {
    let normalized = content.trim().to_lowercase();
    let digest = format!("{:x}", Md5::digest(normalized.as_bytes()));
    digest[..12].to_string()
}

/// Shared lowercase tokens divided by the size of the larger token set.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let left: HashSet<String> = a.to_lowercase().split_whitespace().map(String::from).collect();
    let right: HashSet<String> = b.to_lowercase().split_whitespace().map(String::from).collect();
    let larger = left.len().max(right.len());
    if larger == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / larger as f64
}

/// Deterministic salience heuristic, clamped to `[1, 5]`.
pub fn score_content(content: &str, category: Category) -> f64 {
    let lower = content.to_lowercase();
    let len = content.chars().count();
    let mut score = BASE_SCORE;

    if category == Category::Product {
        score += PRODUCT_BONUS;
    }
    if ACTION_WORDS.iter().any(|w| lower.contains(w)) {
        score += ACTION_BONUS;
    }
    if FILLER_PHRASES.iter().any(|p| lower.contains(p)) {
        score -= FILLER_PENALTY;
    }
    if len > LONG_CHARS {
        score += LONG_BONUS;
    }
    if len < SHORT_CHARS {
        score -= SHORT_PENALTY;
    }

    score.clamp(1.0, 5.0)
}

/// Drop low scorers, order by `(score desc, created_at desc)`, keep the top ten.
pub(crate) fn prune(memories: &mut Vec<MemorySnippet>) {
    memories.retain(|m| m.score >= MIN_SCORE_THRESHOLD);
    memories.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    memories.truncate(MAX_MEMORIES_PER_USER);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_hash_is_normalized() {
        assert_eq!(content_hash("  Likes Rust "), content_hash("likes rust"));
        assert_eq!(content_hash("likes rust").len(), 12);
        assert_ne!(content_hash("likes rust"), content_hash("likes go"));
    }

    #[test]
    fn test_hash_matches_md5_prefix() {
        // md5("hello") = 5d41402abc4b2a76b9719d911017c592
        assert_eq!(content_hash("Hello"), "5d41402abc4b");
    }

    #[test]
    fn test_overlap_uses_larger_set() {
        assert_eq!(token_overlap("a b c d", "a b c d"), 1.0);
        assert_eq!(token_overlap("a b c d", "a b"), 0.5);
        assert_eq!(token_overlap("", ""), 0.0);
        assert_eq!(token_overlap("A B", "a b"), 1.0);
    }

    #[test]
    fn test_prune_orders_and_bounds() {
        let now = Utc::now();
        let mut memories: Vec<MemorySnippet> = (0..14)
            .map(|i| {
                let mut m = MemorySnippet::new(format!("fact{i}"), 2.0 + (i % 4) as f64 * 0.5, Category::General);
                m.created_at = now + Duration::seconds(i);
                m
            })
            .collect();
        memories.push(MemorySnippet::new("weak", 1.5, Category::General));
        prune(&mut memories);

        assert_eq!(memories.len(), MAX_MEMORIES_PER_USER);
        assert!(memories.iter().all(|m| m.score >= MIN_SCORE_THRESHOLD));
        assert!(memories.windows(2).all(|w| w[0].score >= w[1].score));
        // Highest score ties break on recency.
        assert_eq!(memories[0].content, "fact11");
        assert_eq!(memories[1].content, "fact7");
    }
}
