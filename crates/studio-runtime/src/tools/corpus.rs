//! Tools backed by the retriever: document lookup for docs mode and the
//! transcript tools for video mode.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use studio_core::{Passage, Result, Tool};
use studio_llm::ChatModel;

use super::clip;
use crate::prompts;
use crate::retriever::Retriever;

const CORPUS_K: usize = 8;
const TRANSCRIPT_K: usize = 8;
const LOOKUP_K: usize = 15;
const SUMMARY_K: usize = 10;
const CHAPTER_K: usize = 10;
/// Passages farther than this from the requested time are dropped.
const LOOKUP_WINDOW_SECS: f64 = 120.0;

/// `[5m07s]` for a passage's start time.
fn stamp(passage: &Passage) -> String {
    let ts = passage.timestamp.unwrap_or(0.0).max(0.0);
    let minutes = (ts / 60.0) as u64;
    let seconds = (ts % 60.0) as u64;
    format!("[{minutes}m{seconds:02}s]")
}

// ── corpus_retriever ───────────────────────────────────────────

pub struct CorpusRetrieverTool {
    retriever: Arc<dyn Retriever>,
}

impl CorpusRetrieverTool {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for CorpusRetrieverTool {
    fn name(&self) -> &str {
        "corpus_retriever"
    }

    fn description(&self) -> &str {
        "Fetch relevant passages from the user's indexed documents. Input: a search query."
    }

    async fn call(&self, input: &str) -> Result<String> {
        let passages = self.retriever.retrieve(input, CORPUS_K).await?;
        if passages.is_empty() {
            return Ok("No documents found in the corpus.".into());
        }
        Ok(passages
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let source = if p.source.is_empty() {
                    format!("doc_{}", i + 1)
                } else {
                    p.source.clone()
                };
                format!("[{}] {}\n{}", i + 1, source, p.text)
            })
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

// ── transcript_search ──────────────────────────────────────────

pub struct TranscriptSearchTool {
    retriever: Arc<dyn Retriever>,
}

impl TranscriptSearchTool {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for TranscriptSearchTool {
    fn name(&self) -> &str {
        "transcript_search"
    }

    fn description(&self) -> &str {
        "Search the video transcript for a topic, keyword, or concept. Returns timestamped segments."
    }

    async fn call(&self, input: &str) -> Result<String> {
        let passages = self.retriever.retrieve(input, TRANSCRIPT_K).await?;
        if passages.is_empty() {
            return Ok("No matching transcript segments found.".into());
        }
        Ok(passages
            .iter()
            .map(|p| format!("{} {}", stamp(p), clip(&p.text, 300)))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

// ── timestamp_lookup ───────────────────────────────────────────

static MINUTES: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d+)\s*m").ok());
static SECONDS: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(\d+)\s*s").ok());

/// Seconds from `"5:30"`, `"1:02:03"`, `"5m30s"`, `"5 min"`, or `"330"`.
pub fn parse_timestamp(raw: &str) -> Option<u64> {
    let text = raw.trim().to_lowercase();
    if text.contains(':') {
        let parts = text
            .split(':')
            .map(|p| p.trim().parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;
        return match parts.as_slice() {
            [m, s] => clock_seconds(0, *m, *s),
            [h, m, s] => clock_seconds(*h, *m, *s),
            _ => None,
        };
    }
    if text.contains('m') {
        let minutes = capture_number(&MINUTES, &text);
        let seconds = capture_number(&SECONDS, &text);
        if minutes.is_none() && seconds.is_none() {
            return None;
        }
        return clock_seconds(0, minutes.unwrap_or(0), seconds.unwrap_or(0));
    }
    text.trim_end_matches('s').trim().parse().ok()
}

/// `None` when the total does not fit in a `u64`.
fn clock_seconds(hours: u64, minutes: u64, seconds: u64) -> Option<u64> {
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

fn capture_number(re: &Option<Regex>, text: &str) -> Option<u64> {
    re.as_ref()?
        .captures(text)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

pub struct TimestampLookupTool {
    retriever: Arc<dyn Retriever>,
}

impl TimestampLookupTool {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for TimestampLookupTool {
    fn name(&self) -> &str {
        "timestamp_lookup"
    }

    fn description(&self) -> &str {
        "Look up what the video says around a time. Input: '5:30', '5m30s', or seconds like '330'."
    }

    async fn call(&self, input: &str) -> Result<String> {
        let Some(target) = parse_timestamp(input) else {
            return Ok(format!(
                "Could not parse timestamp: {input}. Use format like '5:30' or '5m30s'."
            ));
        };

        let query = format!("content at {target} seconds");
        let nearby: Vec<String> = self
            .retriever
            .retrieve(&query, LOOKUP_K)
            .await?
            .iter()
            .filter(|p| (p.timestamp.unwrap_or(0.0) - target as f64).abs() < LOOKUP_WINDOW_SECS)
            .take(5)
            .map(|p| format!("{} {}", stamp(p), clip(&p.text, 400)))
            .collect();

        if nearby.is_empty() {
            return Ok(format!("No content found near timestamp {target}s."));
        }
        Ok(nearby.join("\n\n"))
    }
}

// ── video_summarizer ───────────────────────────────────────────

pub struct VideoSummarizerTool {
    retriever: Arc<dyn Retriever>,
    model: ChatModel,
}

impl VideoSummarizerTool {
    pub fn new(retriever: Arc<dyn Retriever>, model: ChatModel) -> Self {
        Self { retriever, model }
    }
}

#[async_trait]
impl Tool for VideoSummarizerTool {
    fn name(&self) -> &str {
        "video_summarizer"
    }

    fn description(&self) -> &str {
        "Summarize what the video says about a topic. Input: the topic or concept."
    }

    async fn call(&self, input: &str) -> Result<String> {
        let passages = self.retriever.retrieve(input, SUMMARY_K).await?;
        if passages.is_empty() {
            return Ok("No content found to summarize.".into());
        }
        let transcript = passages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.model
            .invoke(&prompts::summarize_transcript(input, &transcript))
            .await
    }
}

// ── chapter_search ─────────────────────────────────────────────

pub struct ChapterSearchTool {
    retriever: Arc<dyn Retriever>,
}

impl ChapterSearchTool {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for ChapterSearchTool {
    fn name(&self) -> &str {
        "chapter_search"
    }

    fn description(&self) -> &str {
        "Find the sections of the video that discuss a topic."
    }

    async fn call(&self, input: &str) -> Result<String> {
        let passages = self.retriever.retrieve(input, CHAPTER_K).await?;
        if passages.is_empty() {
            return Ok("No chapters found matching this topic.".into());
        }

        // One entry per minute of video.
        let mut seen = HashSet::new();
        let chapters: Vec<String> = passages
            .iter()
            .filter_map(|p| {
                let minute = (p.timestamp.unwrap_or(0.0).max(0.0) / 60.0) as u64;
                seen.insert(minute)
                    .then(|| format!("[{minute}m00s] {}...", clip(&p.text, 150)))
            })
            .take(8)
            .collect();

        Ok(format!("Relevant sections:\n{}", chapters.join("\n")))
    }
}
