//! rig 后端适配：按配置创建客户端，按单次请求构建 Agent

use rig::{agent::Agent, client::CompletionClient, completion::Prompt};

use crate::config::{LLMConfig, LLMProvider};
use crate::error::ProviderError;
use crate::llm::{GenerationRequest, ResponseFormat};

const JSON_ONLY_INSTRUCTION: &str =
    "Respond with valid JSON only. Do not wrap it in markdown fences and do not add commentary.";

/// 单次请求的 Agent 参数
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub preamble: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u64,
}

impl AgentSettings {
    /// system 消息作为 preamble，JSON 请求追加格式约束
    pub fn for_request(config: &LLMConfig, request: &GenerationRequest) -> Self {
        let system = request.system_text();
        let preamble = match request.format {
            ResponseFormat::Text => system,
            ResponseFormat::Json if system.is_empty() => JSON_ONLY_INSTRUCTION.to_string(),
            ResponseFormat::Json => format!("{}\n\n{}", system, JSON_ONLY_INSTRUCTION),
        };
        Self {
            preamble,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens.into(),
        }
    }
}

/// 把 preamble、温度和 token 上限应用到任意后端的 AgentBuilder
macro_rules! configured_agent {
    ($builder:expr, $settings:expr) => {
        $builder
            .preamble(&$settings.preamble)
            .max_tokens($settings.max_tokens)
            .temperature($settings.temperature)
            .build()
    };
}

/// 已配置的模型后端
#[derive(Clone)]
pub enum ProviderClient {
    OpenAI(rig::providers::openai::Client),
    Moonshot(rig::providers::moonshot::Client),
    DeepSeek(rig::providers::deepseek::Client),
    Mistral(rig::providers::mistral::Client),
    OpenRouter(rig::providers::openrouter::Client),
    Anthropic(rig::providers::anthropic::Client),
    Ollama(rig::providers::ollama::Client),
}

impl ProviderClient {
    pub fn new(config: &LLMConfig) -> Result<Self, ProviderError> {
        let key = config.api_key.as_str();
        let client = match config.provider {
            LLMProvider::OpenAI => ProviderClient::OpenAI(
                rig::providers::openai::Client::builder(key)
                    .base_url(&config.api_base_url)
                    .build(),
            ),
            LLMProvider::Moonshot => ProviderClient::Moonshot(
                rig::providers::moonshot::Client::builder(key)
                    .base_url(&config.api_base_url)
                    .build(),
            ),
            LLMProvider::DeepSeek => ProviderClient::DeepSeek(
                rig::providers::deepseek::Client::builder(key)
                    .base_url(&config.api_base_url)
                    .build(),
            ),
            LLMProvider::Mistral => {
                ProviderClient::Mistral(rig::providers::mistral::Client::builder(key).build())
            }
            LLMProvider::OpenRouter => {
                ProviderClient::OpenRouter(rig::providers::openrouter::Client::builder(key).build())
            }
            LLMProvider::Anthropic => ProviderClient::Anthropic(
                rig::providers::anthropic::ClientBuilder::new(key)
                    .build()
                    .map_err(|e| ProviderError::NotConfigured(e.to_string()))?,
            ),
            LLMProvider::Ollama => {
                ProviderClient::Ollama(rig::providers::ollama::Client::builder().build())
            }
        };
        Ok(client)
    }

    pub fn agent(&self, settings: &AgentSettings) -> ProviderAgent {
        let model = settings.model.as_str();
        match self {
            // OpenAI 兼容网关大多只实现 chat completions 接口
            ProviderClient::OpenAI(client) => ProviderAgent::OpenAI(configured_agent!(
                client
                    .completion_model(model)
                    .completions_api()
                    .into_agent_builder(),
                settings
            )),
            ProviderClient::Moonshot(client) => {
                ProviderAgent::Moonshot(configured_agent!(client.agent(model), settings))
            }
            ProviderClient::DeepSeek(client) => {
                ProviderAgent::DeepSeek(configured_agent!(client.agent(model), settings))
            }
            ProviderClient::Mistral(client) => {
                ProviderAgent::Mistral(configured_agent!(client.agent(model), settings))
            }
            ProviderClient::OpenRouter(client) => {
                ProviderAgent::OpenRouter(configured_agent!(client.agent(model), settings))
            }
            ProviderClient::Anthropic(client) => {
                ProviderAgent::Anthropic(configured_agent!(client.agent(model), settings))
            }
            ProviderClient::Ollama(client) => {
                ProviderAgent::Ollama(configured_agent!(client.agent(model), settings))
            }
        }
    }
}

pub enum ProviderAgent {
    OpenAI(Agent<rig::providers::openai::CompletionModel>),
    Mistral(Agent<rig::providers::mistral::CompletionModel>),
    OpenRouter(Agent<rig::providers::openrouter::CompletionModel>),
    Anthropic(Agent<rig::providers::anthropic::completion::CompletionModel>),
    Moonshot(Agent<rig::providers::moonshot::CompletionModel>),
    DeepSeek(Agent<rig::providers::deepseek::CompletionModel>),
    Ollama(Agent<rig::providers::ollama::CompletionModel<reqwest::Client>>),
}

impl ProviderAgent {
    /// 单轮请求，返回模型的原始文本
    pub async fn prompt(&self, prompt: &str) -> Result<String, ProviderError> {
        let result = match self {
            ProviderAgent::OpenAI(agent) => agent.prompt(prompt).await,
            ProviderAgent::Moonshot(agent) => agent.prompt(prompt).await,
            ProviderAgent::DeepSeek(agent) => agent.prompt(prompt).await,
            ProviderAgent::Mistral(agent) => agent.prompt(prompt).await,
            ProviderAgent::OpenRouter(agent) => agent.prompt(prompt).await,
            ProviderAgent::Anthropic(agent) => agent.prompt(prompt).await,
            ProviderAgent::Ollama(agent) => agent.prompt(prompt).await,
        };
        result.map_err(|e| ProviderError::Request(e.to_string()))
    }
}
