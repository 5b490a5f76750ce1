//! 兼容 Tavily `/search` 接口的调研客户端

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ResearchImage, ResearchProvider, ResearchQuery, ResearchReport, ResearchResult};
use crate::config::ResearchConfig;
use crate::error::ProviderError;

#[derive(Clone)]
pub struct WebResearchClient {
    config: ResearchConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: String,
    search_depth: &'a str,
    max_results: usize,
    include_answer: bool,
    include_images: bool,
    include_image_descriptions: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchResult>,
    #[serde(default)]
    images: Vec<SearchImage>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    content: String,
    #[serde(default)]
    raw_content: Option<String>,
}

/// 图片可能是纯URL，也可能带描述
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchImage {
    Url(String),
    Described {
        url: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<SearchResponse> for ResearchReport {
    fn from(response: SearchResponse) -> Self {
        Self {
            answer: response.answer.unwrap_or_default(),
            results: response
                .results
                .into_iter()
                .map(|r| ResearchResult {
                    content: r.content,
                    raw_content: r.raw_content,
                })
                .collect(),
            images: response
                .images
                .into_iter()
                .map(|image| match image {
                    SearchImage::Url(url) => ResearchImage {
                        url,
                        description: None,
                    },
                    SearchImage::Described { url, description } => {
                        ResearchImage { url, description }
                    }
                })
                .filter(|image| !image.url.trim().is_empty())
                .collect(),
        }
    }
}

impl WebResearchClient {
    pub fn new(config: ResearchConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/search", self.config.api_base_url.trim_end_matches('/'))
    }

    pub(crate) fn parse_response(body: &str) -> Result<ResearchReport, ProviderError> {
        let response: SearchResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(response.into())
    }
}

#[async_trait]
impl ResearchProvider for WebResearchClient {
    async fn research(&self, query: &ResearchQuery) -> Result<ResearchReport, ProviderError> {
        if self.config.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "research.api_key (TRAVELPEN_RESEARCH_API_KEY)".to_string(),
            ));
        }

        let request = SearchRequest {
            api_key: &self.config.api_key,
            query: query.query_text(),
            search_depth: &self.config.search_depth,
            max_results: self.config.max_results,
            include_answer: true,
            include_images: self.config.include_images,
            include_image_descriptions: self.config.include_images,
            include_raw_content: false,
        };
        let body =
            serde_json::to_string(&request).map_err(|e| ProviderError::Request(e.to_string()))?;

        let response = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.config.timeout_seconds)
                } else {
                    ProviderError::Request(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(ProviderError::Status { status, body: text });
        }

        Self::parse_response(&text)
    }
}
