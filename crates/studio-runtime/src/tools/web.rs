//! Web research: search, page scraping, price extraction, and encyclopedia
//! lookups.
//!
//! The tools in this module never fail a tool loop on network trouble; they
//! report it as text so the model can work around it.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use studio_config::schema::WebConfig;
use studio_core::{Result, StudioError, Tool};
use tracing::{debug, info, warn};

use super::clip;

const DUCKDUCKGO_URL: &str = "https://html.duckduckgo.com/html/";
const BING_URL: &str = "https://www.bing.com/search";
const WIKIPEDIA_API: &str = "https://en.wikipedia.org/w/api.php";
const SNIPPET_CHARS: usize = 180;
const WIKIPEDIA_MAX_CHARS: usize = 4000;

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Network access used by the web tools.
#[async_trait]
pub trait WebResearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;

    /// Fetch a page and reduce it to readable text.
    async fn scrape(&self, url: &str) -> Result<String>;

    /// Short encyclopedia summaries for a query.
    async fn wikipedia(&self, query: &str) -> Result<String>;
}

// ── HTTP implementation ────────────────────────────────────────

/// DuckDuckGo's HTML endpoint with Bing as fallback, plain HTTP scraping, and
/// the Wikipedia API.
pub struct HttpWebResearch {
    client: reqwest::Client,
    max_results: usize,
    scrape_max_chars: usize,
}

impl HttpWebResearch {
    pub fn new(config: &WebConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| StudioError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            max_results: config.max_results,
            scrape_max_chars: config.scrape_max_chars,
        })
    }

    async fn get_html(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| web_error(url, e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StudioError::ToolExecution {
                tool: "web".into(),
                reason: format!("HTTP {} for {url}", status.as_u16()),
            });
        }
        resp.text().await.map_err(|e| web_error(url, e))
    }
}

fn web_error(url: &str, e: reqwest::Error) -> StudioError {
    let reason = if e.is_timeout() {
        format!("Request timed out for {url}")
    } else {
        e.to_string()
    };
    StudioError::ToolExecution {
        tool: "web".into(),
        reason,
    }
}

#[async_trait]
impl WebResearch for HttpWebResearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        info!(query, "web search");
        let mut hits = match self
            .get_html(DUCKDUCKGO_URL, &[("q", query), ("kl", "us-en")])
            .await
        {
            Ok(html) => parse_duckduckgo(&html),
            Err(e) => {
                warn!(error = %e, "duckduckgo search failed");
                Vec::new()
            }
        };

        if hits.is_empty() {
            debug!(query, "no duckduckgo results, trying bing");
            let html = self.get_html(BING_URL, &[("q", query), ("count", "8")]).await?;
            hits = parse_bing(&html);
        }

        hits.truncate(self.max_results);
        Ok(hits)
    }

    async fn scrape(&self, url: &str) -> Result<String> {
        info!(url, "scraping page");
        let html = self.get_html(url, &[]).await?;
        Ok(extract_page(&html, url, self.scrape_max_chars))
    }

    async fn wikipedia(&self, query: &str) -> Result<String> {
        let resp = self
            .client
            .get(WIKIPEDIA_API)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", "3"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exlimit", "3"),
            ])
            .send()
            .await
            .map_err(|e| web_error(WIKIPEDIA_API, e))?;
        let data: Value = resp.json().await.map_err(|e| web_error(WIKIPEDIA_API, e))?;
        Ok(format_wikipedia(&data))
    }
}

// ── Parsing ────────────────────────────────────────────────────

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Text of an element with whitespace collapsed.
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// DuckDuckGo wraps result links in a redirect; pull the real target out.
fn resolve_duckduckgo_href(href: &str) -> Option<String> {
    if href.starts_with("http") && !href.contains("duckduckgo.com/l/") {
        return Some(href.to_string());
    }
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };
    let parsed = url::Url::parse(&absolute).ok()?;
    parsed
        .query_pairs()
        .find(|(k, _)| k == "uddg")
        .map(|(_, v)| v.into_owned())
        .filter(|v| v.starts_with("http"))
}

fn parse_results(
    html: &str,
    result_css: &str,
    link_css: &str,
    snippet_css: &str,
    resolve: fn(&str) -> Option<String>,
) -> Vec<SearchHit> {
    let (Some(result_sel), Some(link_sel), Some(snippet_sel)) =
        (selector(result_css), selector(link_css), selector(snippet_css))
    else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    document
        .select(&result_sel)
        .take(8)
        .filter_map(|result| {
            let link = result.select(&link_sel).next()?;
            let url = resolve(link.value().attr("href")?)?;
            let snippet = result
                .select(&snippet_sel)
                .next()
                .map(|s| clip(&element_text(&s), SNIPPET_CHARS).to_string())
                .unwrap_or_default();
            Some(SearchHit {
                title: element_text(&link),
                url,
                snippet,
            })
        })
        .collect()
}

pub fn parse_duckduckgo(html: &str) -> Vec<SearchHit> {
    parse_results(html, ".result", "a.result__a", ".result__snippet", resolve_duckduckgo_href)
}

pub fn parse_bing(html: &str) -> Vec<SearchHit> {
    parse_results(html, "li.b_algo", "h2 a", ".b_caption p", |href| {
        href.starts_with("http").then(|| href.to_string())
    })
}

const SHOP_HOSTS: [&str; 6] = ["amazon", "flipkart", "ebay", "walmart", "bestbuy", "croma"];
const PRICE_SELECTORS: [&str; 6] = [
    ".a-price-whole",
    ".a-offscreen",
    "._30jeq3",
    ".price",
    ".product-price",
    "[data-price]",
];
const SKIPPED_ANCESTORS: [&str; 7] = ["script", "style", "noscript", "iframe", "svg", "nav", "footer"];

static CURRENCY: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"[₹$€£]\s*[\d,]+").ok());

fn in_skipped_block(element: &ElementRef) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|e| SKIPPED_ANCESTORS.contains(&e.name()))
    })
}

/// Reduce a page to title, headings, and body text, cut to `max_chars`.
pub fn extract_page(html: &str, url: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    let title = selector("title")
        .and_then(|sel| document.select(&sel).next().map(|t| element_text(&t)))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "No title".to_string());

    let mut out = vec![format!("📄 **{title}**\n🔗 {url}\n")];

    let lower_url = url.to_lowercase();
    if SHOP_HOSTS.iter().any(|h| lower_url.contains(h)) {
        let mut prices: Vec<String> = Vec::new();
        for css in PRICE_SELECTORS {
            let Some(sel) = selector(css) else { continue };
            for el in document.select(&sel).take(5) {
                let text = element_text(&el);
                let looks_like_price = CURRENCY.as_ref().is_some_and(|re| re.is_match(&text));
                if looks_like_price && !prices.contains(&text) {
                    prices.push(text);
                }
            }
        }
        if !prices.is_empty() {
            prices.truncate(4);
            out.push(format!("\n💰 **Prices:** {}", prices.join(", ")));
        }
    }

    let main = selector("article, main, .content, #content, .post-content")
        .and_then(|sel| document.select(&sel).next())
        .or_else(|| selector("body").and_then(|sel| document.select(&sel).next()))
        .unwrap_or_else(|| document.root_element());

    if let Some(sel) = selector("h1, h2") {
        for heading in main.select(&sel).filter(|h| !in_skipped_block(h)).take(5) {
            let text = element_text(&heading);
            if text.chars().count() > 5 {
                out.push(format!("\n## {text}"));
            }
        }
    }

    let mut seen = HashSet::new();
    let mut paragraphs = Vec::new();
    if let Some(sel) = selector("p, li") {
        for el in main.select(&sel).filter(|e| !in_skipped_block(e)).take(25) {
            let text = element_text(&el);
            if text.chars().count() <= 20 {
                continue;
            }
            let key = clip(&text.to_lowercase(), 50).to_string();
            if seen.insert(key) {
                paragraphs.push(text);
            }
        }
    }
    paragraphs.truncate(20);
    out.push(format!("\n**Content:**\n{}", paragraphs.join("\n")));

    clip(&out.join("\n"), max_chars).to_string()
}

fn format_wikipedia(data: &Value) -> String {
    let Some(pages) = data["query"]["pages"].as_object() else {
        return "No good Wikipedia Search Result was found".to_string();
    };
    let mut pages: Vec<&Value> = pages.values().collect();
    pages.sort_by_key(|p| p["index"].as_u64().unwrap_or(u64::MAX));

    let summaries: Vec<String> = pages
        .iter()
        .filter_map(|p| {
            let title = p["title"].as_str()?;
            let extract = p["extract"].as_str().unwrap_or("").trim();
            Some(format!("Page: {title}\nSummary: {extract}"))
        })
        .collect();
    if summaries.is_empty() {
        return "No good Wikipedia Search Result was found".to_string();
    }
    clip(&summaries.join("\n\n"), WIKIPEDIA_MAX_CHARS).to_string()
}

// ── Tools ──────────────────────────────────────────────────────

pub struct WebSearchTool {
    web: Arc<dyn WebResearch>,
}

impl WebSearchTool {
    pub fn new(web: Arc<dyn WebResearch>) -> Self {
        Self { web }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the internet. Input: search query. Output: titles, URLs, and snippets. \
         Use this first, then scrape the best one or two URLs."
    }

    async fn call(&self, input: &str) -> Result<String> {
        let hits = match self.web.search(input).await {
            Ok(hits) => hits,
            Err(e) => return Ok(format!("Search error: {e}")),
        };
        if hits.is_empty() {
            return Ok(format!("No results found for: {input}"));
        }
        let mut out = format!("🔍 Found {} results:\n\n", hits.len());
        for (i, hit) in hits.iter().enumerate() {
            out.push_str(&format!(
                "{}. **{}**\n   URL: {}\n   {}\n\n",
                i + 1,
                hit.title,
                hit.url,
                hit.snippet
            ));
        }
        Ok(out)
    }
}

pub struct WebScrapeTool {
    web: Arc<dyn WebResearch>,
}

impl WebScrapeTool {
    pub fn new(web: Arc<dyn WebResearch>) -> Self {
        Self { web }
    }
}

#[async_trait]
impl Tool for WebScrapeTool {
    fn name(&self) -> &str {
        "web_scrape"
    }

    fn description(&self) -> &str {
        "Extract the main content of a webpage. Input: URL. Output: title, headings, and text. \
         Use after web_search."
    }

    async fn call(&self, input: &str) -> Result<String> {
        let url = input.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Ok("Error: URL must start with http:// or https://".into());
        }
        match self.web.scrape(url).await {
            Ok(text) => Ok(text),
            Err(StudioError::ToolExecution { reason, .. }) => Ok(format!("Error: {reason}")),
            Err(e) => Ok(format!("Error scraping {url}: {e}")),
        }
    }
}

static PRICE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"₹\s*[\d,]+(?:\.\d{2})?",
        r"(?i)Rs\.?\s*[\d,]+(?:\.\d{2})?",
        r"\$\s*[\d,]+(?:\.\d{2})?",
        r"€\s*[\d,]+(?:\.\d{2})?",
        r"£\s*[\d,]+(?:\.\d{2})?",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Every price mention in `text`, in pattern order, without repeats.
pub fn extract_prices(text: &str) -> Vec<String> {
    let mut prices: Vec<String> = Vec::new();
    for re in PRICE_PATTERNS.iter() {
        for m in re.find_iter(text) {
            let found = m.as_str().to_string();
            if !prices.contains(&found) {
                prices.push(found);
            }
        }
    }
    prices
}

pub struct PriceExtractorTool;

#[async_trait]
impl Tool for PriceExtractorTool {
    fn name(&self) -> &str {
        "price_extractor"
    }

    fn description(&self) -> &str {
        "Extract prices from text. Input: text containing prices. Output: the prices found."
    }

    async fn call(&self, input: &str) -> Result<String> {
        let prices = extract_prices(input);
        if prices.is_empty() {
            return Ok("No prices found in the text.".into());
        }
        let mut out = String::from("💰 **Prices Found:**\n");
        for (i, price) in prices.iter().take(10).enumerate() {
            out.push_str(&format!("{}. {price}\n", i + 1));
        }
        Ok(out)
    }
}

pub struct WikipediaTool {
    web: Arc<dyn WebResearch>,
}

impl WikipediaTool {
    pub fn new(web: Arc<dyn WebResearch>) -> Self {
        Self { web }
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Search Wikipedia for general or world knowledge. Input: a search query."
    }

    async fn call(&self, input: &str) -> Result<String> {
        match self.web.wikipedia(input).await {
            Ok(text) => Ok(text),
            Err(e) => Ok(format!("Wikipedia error: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FakeWeb {
        hits: Vec<SearchHit>,
        fail: bool,
    }

    #[async_trait]
    impl WebResearch for FakeWeb {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
            if self.fail {
                return Err(StudioError::ToolExecution {
                    tool: "web".into(),
                    reason: "offline".into(),
                });
            }
            Ok(self.hits.clone())
        }
        async fn scrape(&self, url: &str) -> Result<String> {
            if self.fail {
                return Err(StudioError::ToolExecution {
                    tool: "web".into(),
                    reason: format!("HTTP 404 for {url}"),
                });
            }
            Ok(format!("scraped {url}"))
        }
        async fn wikipedia(&self, _query: &str) -> Result<String> {
            Ok("Page: Rust\nSummary: a language".into())
        }
    }

    fn web(fail: bool) -> Arc<dyn WebResearch> {
        Arc::new(FakeWeb {
            hits: vec![SearchHit {
                title: "Rust".into(),
                url: "https://www.rust-lang.org".into(),
                snippet: "A language empowering everyone".into(),
            }],
            fail,
        })
    }

    #[test]
    fn test_parse_duckduckgo_resolves_redirects() {
        let html = r#"<html><body>
            <div class="result">
              <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fa&rut=x">Example A</a>
              <a class="result__snippet">First   snippet</a>
            </div>
            <div class="result">
              <a class="result__a" href="https://example.org/b">Example B</a>
            </div>
            <div class="result">
              <a class="result__a" href="/relative">Dropped</a>
            </div>
        </body></html>"#;
        let hits = parse_duckduckgo(html);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://example.com/a");
        assert_eq!(hits[0].snippet, "First snippet");
        assert_eq!(hits[1].title, "Example B");
        assert_eq!(hits[1].snippet, "");
    }

    #[test]
    fn test_parse_bing() {
        let html = r#"<ol><li class="b_algo"><h2><a href="https://docs.rs">Docs.rs</a></h2>
            <div class="b_caption"><p>Rust documentation host</p></div></li></ol>"#;
        let hits = parse_bing(html);
        assert_eq!(hits, vec![SearchHit {
            title: "Docs.rs".into(),
            url: "https://docs.rs".into(),
            snippet: "Rust documentation host".into(),
        }]);
    }

    #[test]
    fn test_extract_page_keeps_main_content() {
        let html = r#"<html><head><title>Phone Review</title><script>var x = 1;</script></head>
            <body>
              <nav><p>Home | Products | Contact us today please</p></nav>
              <main>
                <h1>The Best Phone of the Year</h1>
                <p>This phone has an excellent camera and battery.</p>
                <p>This phone has an excellent camera and battery.</p>
                <p>short</p>
                <li>Price drops are expected around the holidays.</li>
              </main>
              <footer><p>Copyright notice for the whole website here</p></footer>
            </body></html>"#;
        let text = extract_page(html, "https://reviews.example.com/phone", 6000);
        assert!(text.starts_with("📄 **Phone Review**\n🔗 https://reviews.example.com/phone"));
        assert!(text.contains("## The Best Phone of the Year"));
        assert_eq!(text.matches("excellent camera").count(), 1);
        assert!(text.contains("Price drops are expected"));
        assert!(!text.contains("short"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("Contact us"));
    }

    #[test]
    fn test_extract_page_truncates() {
        let body = "<p>".to_string() + &"word ".repeat(2000) + "</p>";
        let text = extract_page(&format!("<html><body>{body}</body></html>"), "https://x.io", 500);
        assert_eq!(text.chars().count(), 500);
    }

    #[test]
    fn test_extract_page_shop_prices() {
        let html = r#"<html><body><span class="a-offscreen">₹1,299</span>
            <main><p>A long enough description of the product on sale.</p></main></body></html>"#;
        let text = extract_page(html, "https://www.amazon.in/dp/B0", 6000);
        assert!(text.contains("💰 **Prices:** ₹1,299"));
    }

    #[test]
    fn test_extract_prices() {
        let prices = extract_prices("Now ₹ 49,999 (was RS. 54,999.00), or $599.99 / €549 / £499 / $599.99");
        assert_eq!(prices, vec!["₹ 49,999", "RS. 54,999.00", "$599.99", "€549", "£499"]);
        assert!(extract_prices("no money here").is_empty());
    }

    #[tokio::test]
    async fn test_price_tool_messages() {
        let tool = PriceExtractorTool;
        assert_eq!(tool.call("free").await.unwrap(), "No prices found in the text.");
        let out = tool.call("$10 and $20").await.unwrap();
        assert_eq!(out, "💰 **Prices Found:**\n1. $10\n2. $20\n");
    }

    #[tokio::test]
    async fn test_search_tool_formats_and_reports_errors() {
        let out = WebSearchTool::new(web(false)).call("rust").await.unwrap();
        assert!(out.starts_with("🔍 Found 1 results:"));
        assert!(out.contains("URL: https://www.rust-lang.org"));

        let err = WebSearchTool::new(web(true)).call("rust").await.unwrap();
        assert!(err.starts_with("Search error:"));

        let empty = WebSearchTool::new(Arc::new(FakeWeb { hits: vec![], fail: false }));
        assert_eq!(empty.call("zzz").await.unwrap(), "No results found for: zzz");
    }

    #[tokio::test]
    async fn test_scrape_tool_validates_url() {
        let tool = WebScrapeTool::new(web(false));
        assert_eq!(
            tool.call("example.com").await.unwrap(),
            "Error: URL must start with http:// or https://"
        );
        assert_eq!(tool.call(" https://a.io ").await.unwrap(), "scraped https://a.io");
        let failing = WebScrapeTool::new(web(true));
        assert_eq!(failing.call("https://a.io").await.unwrap(), "Error: HTTP 404 for https://a.io");
    }

    #[test]
    fn test_format_wikipedia_orders_by_index() {
        let data = json!({"query": {"pages": {
            "2": {"index": 2, "title": "Rust (fungus)", "extract": "A plant disease."},
            "1": {"index": 1, "title": "Rust (programming language)", "extract": "A language."}
        }}});
        let text = format_wikipedia(&data);
        assert!(text.starts_with("Page: Rust (programming language)\nSummary: A language."));
        assert_eq!(format_wikipedia(&json!({})), "No good Wikipedia Search Result was found");
    }
}
