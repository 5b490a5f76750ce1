use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use travelpen::config::Config;
use travelpen::error::ProviderError;
use travelpen::llm::{GenerationProvider, GenerationRequest};
use travelpen::research::{ResearchProvider, ResearchQuery, ResearchReport, ResearchResult};

/// 按请求标记依次返回预设的模型输出
#[derive(Default)]
pub struct ScriptedGenerationProvider {
    scripts: Mutex<HashMap<String, VecDeque<String>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGenerationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, tag: &str, response: &str) -> &Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(tag.to_string())
            .or_default()
            .push_back(response.to_string());
        self
    }

    pub fn call_count(&self, tag: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|t| *t == tag).count()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedGenerationProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(request.tag.clone());
        self.scripts
            .lock()
            .unwrap()
            .get_mut(&request.tag)
            .and_then(|queue| queue.pop_front())
            .ok_or_else(|| ProviderError::Request(format!("nothing scripted for {}", request.tag)))
    }
}

/// 固定返回一条资料片段
pub struct StaticResearchProvider {
    report: ResearchReport,
}

impl StaticResearchProvider {
    pub fn with_snippet(answer: &str, snippet: &str) -> Self {
        Self {
            report: ResearchReport {
                answer: answer.to_string(),
                results: vec![ResearchResult {
                    content: snippet.to_string(),
                    raw_content: None,
                }],
                images: vec![],
            },
        }
    }
}

#[async_trait]
impl ResearchProvider for StaticResearchProvider {
    async fn research(&self, _query: &ResearchQuery) -> Result<ResearchReport, ProviderError> {
        Ok(self.report.clone())
    }
}

/// 草稿与输出都放在临时目录，调研缓存关闭
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
