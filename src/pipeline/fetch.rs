//! Shared HTTP plumbing and the web-search adapter.

use crate::config::PipelineConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::pipeline::traits::{OpenedPage, SearchHit, SearchOptions, WebSearchTool};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

const PAGE_TEXT_MAX_CHARS: usize = 20_000;

pub fn http_client(config: &PipelineConfig) -> ProviderResult<Client> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.provider_timeout)
        .build()
        .map_err(|e| ProviderError::Transport(e.to_string()))
}

pub(crate) fn endpoint_url(base: &str, params: &[(&str, &str)]) -> ProviderResult<Url> {
    Url::parse_with_params(base, params).map_err(|e| ProviderError::Malformed(e.to_string()))
}

/// GET and decode JSON. `None` on 404.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: Url,
) -> ProviderResult<Option<T>> {
    debug!(%url, "GET");
    let resp = client.get(url).send().await?;
    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !resp.status().is_success() {
        return Err(ProviderError::Status(resp.status().as_u16()));
    }
    let body = resp
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Malformed(e.to_string()))?;
    Ok(Some(body))
}

/// Crude HTML to text: drops scripts, styles and tags, collapses whitespace.
pub fn html_to_text(html: &str) -> String {
    static BLOCKS: OnceLock<Regex> = OnceLock::new();
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let blocks = BLOCKS.get_or_init(|| {
        Regex::new(r"(?is)<(script|style|noscript)[^>]*>.*?</(script|style|noscript)>")
            .expect("static regex")
    });
    let tags = TAGS.get_or_init(|| Regex::new(r"(?s)<[^>]+>").expect("static regex"));
    let stripped = blocks.replace_all(html, " ");
    let stripped = tags.replace_all(&stripped, " ");
    stripped
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// SearxNG-compatible JSON search endpoint.
pub struct SearxSearch {
    client: Client,
    endpoint: String,
}

impl SearxSearch {
    pub fn new(config: &PipelineConfig) -> ProviderResult<Self> {
        let endpoint = config
            .endpoints
            .search
            .clone()
            .ok_or(ProviderError::NotConfigured("search endpoint"))?;
        Ok(Self {
            client: http_client(config)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn time_range(days: u32) -> &'static str {
        match days {
            0..=1 => "day",
            2..=7 => "week",
            8..=31 => "month",
            _ => "year",
        }
    }
}

#[derive(Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Deserialize)]
struct SearxResult {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, rename = "publishedDate")]
    published_date: Option<String>,
}

#[async_trait]
impl WebSearchTool for SearxSearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> ProviderResult<Vec<SearchHit>> {
        let mut params = vec![("q", query), ("format", "json")];
        if let Some(days) = options.recency_days {
            params.push(("time_range", Self::time_range(days)));
        }
        let url = endpoint_url(&format!("{}/search", self.endpoint), &params)?;
        let resp: Option<SearxResponse> = get_json(&self.client, url).await?;
        let hits = resp
            .map(|r| r.results)
            .unwrap_or_default()
            .into_iter()
            .take(options.max.max(1))
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                snippet: r.content.filter(|c| !c.trim().is_empty()),
                publish_date_iso: r.published_date,
            })
            .collect();
        Ok(hits)
    }

    async fn open_url(&self, url: &str) -> ProviderResult<OpenedPage> {
        debug!(url, "open");
        let resp = self.client.get(url).send().await?;
        let final_url = resp.url().to_string();
        if !resp.status().is_success() {
            return Ok(OpenedPage {
                ok: false,
                final_url,
                text: None,
            });
        }
        let body = resp.text().await?;
        let text: String = html_to_text(&body).chars().take(PAGE_TEXT_MAX_CHARS).collect();
        Ok(OpenedPage {
            ok: true,
            final_url,
            text: (!text.is_empty()).then_some(text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_is_flattened() {
        let html = "<html><head><style>p{}</style></head><body><p>Ungargasse&nbsp;5</p>\n<script>x()</script><b>1871</b></body></html>";
        assert_eq!(html_to_text(html), "Ungargasse 5 1871");
    }

    #[test]
    fn search_requires_endpoint() {
        let cfg = PipelineConfig::default();
        assert!(matches!(
            SearxSearch::new(&cfg),
            Err(ProviderError::NotConfigured(_))
        ));
    }
}
