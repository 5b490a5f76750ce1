//! 测试用的脚本化外部服务，不访问网络

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use tokio::sync::Notify;

use crate::config::Config;
use crate::error::ProviderError;
use crate::llm::{GenerationProvider, GenerationRequest};
use crate::research::{ResearchProvider, ResearchQuery, ResearchReport, ResearchResult};

/// 按请求标记依次返回预设结果
#[derive(Debug, Default)]
pub struct ScriptedGenerationProvider {
    scripts: Mutex<HashMap<String, VecDeque<Result<String, ProviderError>>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为标记追加一个成功响应
    pub fn push(&self, tag: &str, response: &str) -> &Self {
        self.push_result(tag, Ok(response.to_string()))
    }

    /// 为标记追加一个失败响应
    pub fn push_error(&self, tag: &str, error: ProviderError) -> &Self {
        self.push_result(tag, Err(error))
    }

    fn push_result(&self, tag: &str, result: Result<String, ProviderError>) -> &Self {
        self.scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(tag.to_string())
            .or_default()
            .push_back(result);
        self
    }

    /// 指定标记收到的请求数
    pub fn call_count(&self, tag: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|r| r.tag == tag)
            .count()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedGenerationProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        self.scripts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&request.tag)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| {
                Err(ProviderError::Request(format!(
                    "no scripted response for `{}`",
                    request.tag
                )))
            })
    }
}

/// 调用开始后挂起，直到测试放行，用于模拟慢请求
#[derive(Debug, Default)]
pub struct GatedGenerationProvider {
    inner: ScriptedGenerationProvider,
    started: Notify,
    release: Notify,
}

impl GatedGenerationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self) -> &ScriptedGenerationProvider {
        &self.inner
    }

    /// 等待一次生成调用开始
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// 放行一次挂起的调用
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl GenerationProvider for GatedGenerationProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.started.notify_one();
        self.release.notified().await;
        self.inner.generate(request).await
    }
}

/// 固定返回同一份调研结果
#[derive(Debug, Default)]
pub struct StaticResearchProvider {
    report: ResearchReport,
}

impl StaticResearchProvider {
    pub fn new(report: ResearchReport) -> Self {
        Self { report }
    }

    /// 带一条资料片段的调研结果
    pub fn with_snippet(answer: &str, snippet: &str) -> Self {
        Self::new(ResearchReport {
            answer: answer.to_string(),
            results: vec![ResearchResult {
                content: snippet.to_string(),
                raw_content: None,
            }],
            images: vec![],
        })
    }
}

#[async_trait]
impl ResearchProvider for StaticResearchProvider {
    async fn research(&self, _query: &ResearchQuery) -> Result<ResearchReport, ProviderError> {
        Ok(self.report.clone())
    }
}

/// 总是失败的调研服务
#[derive(Debug, Default)]
pub struct FailingResearchProvider;

#[async_trait]
impl ResearchProvider for FailingResearchProvider {
    async fn research(&self, _query: &ResearchQuery) -> Result<ResearchReport, ProviderError> {
        Err(ProviderError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        })
    }
}

/// 所有路径都落在指定目录下的配置，调研缓存关闭
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config {
        draft_path: dir.join("draft.json"),
        output_path: dir.join("posts"),
        ..Config::default()
    };
    config.cache.enabled = false;
    config.cache.cache_dir = dir.join("cache");
    config
}
