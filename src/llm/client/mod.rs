//! LLM客户端 - 基于rig的文本生成实现

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

use crate::config::LLMConfig;
use crate::error::ProviderError;
use crate::llm::{GenerationProvider, GenerationRequest};

mod providers;

use providers::{AgentSettings, ProviderClient};

/// LLM客户端
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    client: ProviderClient,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = ProviderClient::new(&config)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl GenerationProvider for LLMClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        if self.config.api_key.is_empty() && self.config.provider != crate::config::LLMProvider::Ollama {
            return Err(ProviderError::NotConfigured(
                "缺少 LLM API KEY (llm.api_key 或 TRAVELPEN_LLM_API_KEY)".to_string(),
            ));
        }

        let agent = self
            .client
            .agent(&AgentSettings::for_request(&self.config, request));
        let prompt = request.user_text();

        tracing::debug!(
            tag = %request.tag,
            provider = %self.config.provider,
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            "调用模型服务"
        );

        let timeout = Duration::from_secs(self.config.timeout_seconds);
        match tokio::time::timeout(timeout, agent.prompt(&prompt)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                tracing::warn!(tag = %request.tag, error = %e, "调用模型服务出错");
                Err(e)
            }
            Err(_) => {
                tracing::warn!(tag = %request.tag, timeout_seconds = self.config.timeout_seconds, "调用模型服务超时");
                Err(ProviderError::Timeout(self.config.timeout_seconds))
            }
        }
    }
}
