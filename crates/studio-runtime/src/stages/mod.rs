//! Stage functions. Each reads the current state and returns a partial
//! update; none of them mutates the state directly.

pub mod answer;
pub mod context;
pub mod memory;
pub mod product;
pub mod research;
pub mod retrieve;
pub mod video;
pub mod write;

use studio_core::Passage;

/// `[DOC 1] text` blocks for the first `limit` passages.
pub(crate) fn doc_blocks(passages: &[Passage], limit: usize) -> String {
    passages
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, p)| format!("[DOC {}] {}", i + 1, p.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
