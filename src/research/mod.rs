//! 调研服务 - 根据主题返回排序后的资料片段、汇总回答与相关图片

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

mod web;

pub use web::WebResearchClient;

/// 调研请求
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResearchQuery {
    pub topic: String,
    /// 目的地限定，例如 "Portugal"
    pub destination: Option<String>,
}

impl ResearchQuery {
    pub fn new(topic: impl Into<String>, destination: Option<String>) -> Self {
        Self {
            topic: topic.into(),
            destination: destination.filter(|d| !d.trim().is_empty()),
        }
    }

    /// 发往搜索服务的查询文本
    pub fn query_text(&self) -> String {
        match &self.destination {
            Some(destination) => format!("{} {}", self.topic.trim(), destination.trim()),
            None => self.topic.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResearchResult {
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "rawContent")]
    pub raw_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResearchImage {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// 调研结果
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResearchReport {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub results: Vec<ResearchResult>,
    #[serde(default)]
    pub images: Vec<ResearchImage>,
}

impl ResearchReport {
    pub fn is_empty(&self) -> bool {
        self.answer.trim().is_empty() && self.results.is_empty()
    }

    /// 格式化为prompt中的调研材料
    pub fn format_for_prompt(&self, max_snippets: usize, max_snippet_chars: usize) -> String {
        let mut content = String::from("### Research notes\n");
        if !self.answer.trim().is_empty() {
            content.push_str(&format!("Summary: {}\n\n", self.answer.trim()));
        }

        for (i, result) in self
            .results
            .iter()
            .filter(|r| !r.content.trim().is_empty())
            .take(max_snippets)
            .enumerate()
        {
            content.push_str(&format!(
                "{}. {}\n",
                i + 1,
                truncate_chars(result.content.trim(), max_snippet_chars)
            ));
        }

        if !self.images.is_empty() {
            content.push_str("\n### Available images\n");
            for image in &self.images {
                match &image.description {
                    Some(description) if !description.trim().is_empty() => {
                        content.push_str(&format!("- {} ({})\n", image.url, description.trim()))
                    }
                    _ => content.push_str(&format!("- {}\n", image.url)),
                }
            }
        }
        content.push('\n');
        content
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated.trim_end())
}

/// 调研服务抽象，便于在测试中注入替身
#[async_trait]
pub trait ResearchProvider: Send + Sync {
    async fn research(&self, query: &ResearchQuery) -> Result<ResearchReport, ProviderError>;
}
