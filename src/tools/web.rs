//! Web search by scraping DuckDuckGo's HTML results page.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{decode_args, Tool, ToolContext, ToolError, ToolName, ToolOutput};

/// Returned when the page has no snippets.
pub const NO_RESULTS: &str = "No results found.";

/// Returned for any network, status or body failure.
pub const SEARCH_ERROR: &str =
    "Error performing search. Please check your network or search provider configuration.";

const MAX_SNIPPETS: usize = 3;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub struct WebSearch {
    client: reqwest::Client,
    search_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct SearchArgs {
    #[serde(default)]
    query: String,
}

impl WebSearch {
    pub fn new(search_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            search_url: search_url.into(),
        })
    }

    /// Search and format up to three snippets. Failures become [`SEARCH_ERROR`].
    pub async fn search(&self, query: &str) -> String {
        match self.fetch(query).await {
            Ok(html) => {
                let snippets = extract_snippets(&html);
                tracing::debug!(query, found = snippets.len(), "Web search finished");
                if snippets.is_empty() {
                    NO_RESULTS.to_string()
                } else {
                    snippets.join("\n\n")
                }
            }
            Err(e) => {
                tracing::warn!("Search error for {:?}: {}", query, e);
                SEARCH_ERROR.to_string()
            }
        }
    }

    async fn fetch(&self, query: &str) -> Result<String, reqwest::Error> {
        let url = format!("{}?q={}", self.search_url, urlencoding::encode(query));
        self.client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl Tool for WebSearch {
    fn name(&self) -> ToolName {
        ToolName::Search
    }

    fn description(&self) -> &str {
        "Search for information on the web. Use this when the user asks for current events, facts, or explicitly requests a search."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let args: SearchArgs = decode_args(self.name(), args)?;
        Ok(ToolOutput::text(self.search(&args.query).await))
    }
}

static SNIPPET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a[^>]*class="[^"]*result__snippet[^"]*"[^>]*>(.*?)</a>"#)
        .expect("snippet pattern is valid")
});

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Extract at most three plain-text snippets from a results page.
pub fn extract_snippets(html: &str) -> Vec<String> {
    SNIPPET_PATTERN
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|inner| html_decode(TAG_PATTERN.replace_all(inner.as_str(), "").trim()))
        .take(MAX_SNIPPETS)
        .collect()
}

/// Basic HTML entity decoding.
fn html_decode(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_regex, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ctx() -> ToolContext {
        ToolContext {
            owner_id: "admin-1".to_string(),
            model: "openai/gpt-4o".to_string(),
        }
    }

    fn results_page(snippets: &[&str]) -> String {
        snippets
            .iter()
            .map(|s| {
                format!(
                    r##"<div class="result"><a class="result__snippet" href="#">{}</a></div>"##,
                    s
                )
            })
            .collect()
    }

    #[test]
    fn extracts_and_strips_markup() {
        let html = r#"
            <div class="result">
              <a rel="nofollow" class="result__snippet" href="/l/?u=1">The <b>Rust</b> book &amp; more</a>
            </div>"#;
        assert_eq!(extract_snippets(html), vec!["The Rust book & more"]);
    }

    #[test]
    fn caps_at_three_snippets() {
        let html = results_page(&["one", "two", "three", "four"]);
        assert_eq!(extract_snippets(&html), vec!["one", "two", "three"]);
    }

    #[test]
    fn page_without_snippets_yields_nothing() {
        assert!(extract_snippets("<html><body>No results</body></html>").is_empty());
    }

    #[tokio::test]
    async fn search_returns_joined_snippets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "teacher training"))
            .and(header_regex("user-agent", r"^Mozilla/5\.0 .*Chrome/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(results_page(&["First result snippet", "Second result snippet"])),
            )
            .mount(&server)
            .await;

        let tool = WebSearch::new(format!("{}/html/", server.uri())).unwrap();
        let output = tool
            .execute(json!({"query": "teacher training"}), &ctx())
            .await
            .unwrap();
        assert_eq!(output.content, "First result snippet\n\nSecond result snippet");
        assert!(output.canvas.is_none());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].headers["user-agent"], USER_AGENT);
    }

    #[tokio::test]
    async fn search_without_matches_reports_no_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>No results</body></html>"))
            .mount(&server)
            .await;

        let tool = WebSearch::new(server.uri()).unwrap();
        assert_eq!(tool.search("nothing found").await, NO_RESULTS);
    }

    #[tokio::test]
    async fn missing_query_is_passed_through_as_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", ""))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let tool = WebSearch::new(server.uri()).unwrap();
        let output = tool.execute(json!({}), &ctx()).await.unwrap();
        assert_eq!(output.content, NO_RESULTS);
    }

    #[tokio::test]
    async fn http_error_status_becomes_error_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let tool = WebSearch::new(server.uri()).unwrap();
        assert_eq!(tool.search("x").await, SEARCH_ERROR);
    }

    #[tokio::test]
    async fn network_failure_becomes_error_text() {
        // Nothing listens on port 9 (discard) in the test environment.
        let tool = WebSearch::new("http://127.0.0.1:9/html/").unwrap();
        let output = tool.execute(json!({"query": "x"}), &ctx()).await.unwrap();
        assert_eq!(output.content, SEARCH_ERROR);
    }
}
