use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level task category selecting which stage sequence executes.
///
/// Tags that do not name a known mode are kept verbatim in
/// [`Mode::Unrecognized`] so the router can degrade them to the default
/// branch instead of rejecting the request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mode {
    #[default]
    Docs,
    Video,
    Product,
    Research,
    Unrecognized(String),
}

impl Mode {
    /// The four modes with a dedicated branch.
    pub const KNOWN: [Mode; 4] = [Mode::Docs, Mode::Video, Mode::Product, Mode::Research];

    pub fn as_str(&self) -> &str {
        match self {
            Mode::Docs => "docs",
            Mode::Video => "video",
            Mode::Product => "product",
            Mode::Research => "research",
            Mode::Unrecognized(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Mode::Unrecognized(_))
    }
}

impl From<&str> for Mode {
    fn from(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "docs" => Mode::Docs,
            "video" => Mode::Video,
            "product" => Mode::Product,
            "research" => Mode::Research,
            _ => Mode::Unrecognized(tag.to_string()),
        }
    }
}

impl From<String> for Mode {
    fn from(tag: String) -> Self {
        Mode::from(tag.as_str())
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Question intent, classified for docs requests only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Code,
    News,
    General,
}

impl Intent {
    /// Interpret a free-form classifier reply. Anything that is not exactly
    /// one of the labels counts as `General`.
    pub fn from_label(label: &str) -> Self {
        let cleaned = label
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        match cleaned.as_str() {
            "code" => Intent::Code,
            "news" => Intent::News,
            _ => Intent::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Code => "code",
            Intent::News => "news",
            Intent::General => "general",
        }
    }
}

/// Category attached to a memory snippet. Unknown categories found on disk
/// load as `General`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Docs,
    Video,
    Product,
    Research,
    #[default]
    #[serde(other)]
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Docs => "docs",
            Category::Video => "video",
            Category::Product => "product",
            Category::Research => "research",
            Category::General => "general",
        }
    }
}

impl From<&Mode> for Category {
    fn from(mode: &Mode) -> Self {
        match mode {
            Mode::Docs => Category::Docs,
            Mode::Video => Category::Video,
            Mode::Product => Category::Product,
            Mode::Research => Category::Research,
            Mode::Unrecognized(_) => Category::General,
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docs" => Ok(Category::Docs),
            "video" => Ok(Category::Video),
            "product" => Ok(Category::Product),
            "research" => Ok(Category::Research),
            "general" => Ok(Category::General),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chunk of source material returned by a retriever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Start offset in seconds, for transcript chunks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl Passage {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            page: None,
            timestamp: None,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_timestamp(mut self, seconds: f64) -> Self {
        self.timestamp = Some(seconds);
        self
    }
}
