//! Tavily 搜索客户端
//!
//! 调用 `POST {base_url}/search`，只取 `results` 数组中的
//! `title` / `url` / `content` / `score` 字段。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::error::{ResearchError, ResearchResult};
use crate::search::{SearchEngine, SearchHit};

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: Option<f64>,
}

/// Tavily 搜索客户端
#[derive(Clone)]
pub struct TavilyClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    search_depth: String,
}

impl TavilyClient {
    pub fn new(config: &SearchConfig) -> ResearchResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ResearchError::config(format!("无法创建搜索HTTP客户端: {}", e)))?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            search_depth: config.search_depth.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

/// 把响应转换为搜索结果：丢弃没有URL的条目，缺失标题时用URL代替，截断到 `max_results`
fn into_hits(response: TavilySearchResponse, max_results: usize) -> Vec<SearchHit> {
    response
        .results
        .into_iter()
        .filter_map(|row| {
            let url = row.url.trim().to_string();
            if url.is_empty() {
                return None;
            }
            let title = match row.title.trim() {
                "" => url.clone(),
                title => title.to_string(),
            };
            Some(SearchHit {
                title,
                url,
                excerpt: row.content.trim().to_string(),
                score: row.score,
            })
        })
        .take(max_results)
        .collect()
}

#[async_trait]
impl SearchEngine for TavilyClient {
    async fn search(&self, query: &str, max_results: usize) -> ResearchResult<Vec<SearchHit>> {
        let body = TavilySearchRequest {
            query,
            search_depth: &self.search_depth,
            max_results,
            include_answer: false,
            include_raw_content: false,
        };

        debug!(query = %query, max_results, "Searching via Tavily");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ResearchError::search_call(format!("tavily 请求失败: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ResearchError::search_call(format!(
                "tavily 返回状态 {}: {}",
                status, text
            )));
        }

        let payload: TavilySearchResponse = response
            .json()
            .await
            .map_err(|e| ResearchError::search_call(format!("tavily 响应解析失败: {}", e)))?;

        let hits = into_hits(payload, max_results);
        info!(query = %query, count = hits.len(), "Tavily search completed");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> TavilySearchResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_into_hits_maps_fields() {
        let response = parse(
            r#"{
                "query": "fasting",
                "results": [
                    {"title": "Fasting and metabolism", "url": "https://example.org/a", "content": "Study summary", "score": 0.91},
                    {"title": "", "url": "https://example.org/b", "content": "  No title here  "}
                ]
            }"#,
        );

        let hits = into_hits(response, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Fasting and metabolism");
        assert_eq!(hits[0].score, Some(0.91));
        assert_eq!(hits[1].title, "https://example.org/b");
        assert_eq!(hits[1].excerpt, "No title here");
        assert_eq!(hits[1].score, None);
    }

    #[test]
    fn test_into_hits_skips_missing_url_and_caps() {
        let response = parse(
            r#"{"results": [
                {"title": "no url", "content": "x"},
                {"title": "one", "url": "https://a.example", "content": "1"},
                {"title": "two", "url": "https://b.example", "content": "2"},
                {"title": "three", "url": "https://c.example", "content": "3"}
            ]}"#,
        );

        let hits = into_hits(response, 2);
        let urls: Vec<_> = hits.iter().map(|h| h.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_missing_results_is_empty() {
        let hits = into_hits(parse(r#"{"answer": null}"#), 5);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = SearchConfig {
            api_base_url: "https://api.tavily.com/".to_string(),
            ..Default::default()
        };
        let client = TavilyClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "https://api.tavily.com/search");
    }
}
