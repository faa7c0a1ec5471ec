use async_trait::async_trait;
use std::collections::HashSet;
use studio_core::{Passage, Result};

/// Source of relevant passages for a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Up to `k` passages, most relevant first.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>>;
}

/// A corpus held in memory, ranked by query-term overlap.
///
/// Always returns `min(k, len)` passages, the way a vector store does; ties
/// keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRetriever {
    passages: Vec<Passage>,
}

impl InMemoryRetriever {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self { passages }
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn push(&mut self, passage: Passage) {
        self.passages.push(passage);
    }

    /// Split a document into overlapping chunks and index each one.
    pub fn add_document(&mut self, source: &str, text: &str, chunk_size: usize, overlap: usize) {
        for chunk in chunk_text(text, chunk_size, overlap) {
            self.passages.push(Passage::new(chunk, source));
        }
    }

    /// Index timestamped transcript lines, grouping consecutive lines into
    /// chunks of roughly `chunk_size` characters. Each chunk keeps the
    /// timestamp of its first line.
    pub fn add_transcript(&mut self, source: &str, lines: &[(f64, String)], chunk_size: usize) {
        let mut current = String::new();
        let mut start = None;
        for (ts, text) in lines {
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            if start.is_none() {
                start = Some(*ts);
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(text);
            if current.chars().count() >= chunk_size {
                self.flush_transcript(source, &mut current, &mut start);
            }
        }
        self.flush_transcript(source, &mut current, &mut start);
    }

    fn flush_transcript(&mut self, source: &str, current: &mut String, start: &mut Option<f64>) {
        if let Some(ts) = start.take() {
            let text = std::mem::take(current);
            self.passages.push(Passage::new(text, source).with_timestamp(ts));
        }
    }
}

#[async_trait]
impl Retriever for InMemoryRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>> {
        let terms = terms(query);
        let mut scored: Vec<(usize, &Passage)> = self
            .passages
            .iter()
            .map(|p| {
                let words = terms_of(&p.text);
                (terms.iter().filter(|t| words.contains(*t)).count(), p)
            })
            .collect();
        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().take(k).map(|(_, p)| p.clone()).collect())
    }
}

fn terms(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    terms_iter(text).filter(|t| seen.insert(t.clone())).collect()
}

fn terms_of(text: &str) -> HashSet<String> {
    terms_iter(text).collect()
}

fn terms_iter(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .map(str::to_lowercase)
}

/// Character windows of `size` with `overlap` characters shared between
/// neighbours. An overlap not smaller than `size` is treated as zero.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || size == 0 {
        return Vec::new();
    }
    let step = if overlap < size { size - overlap } else { size };
    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        let chunk = chunk.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}
