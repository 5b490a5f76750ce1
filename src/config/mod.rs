use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::i18n::TargetLanguage;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "moonshot")]
    Moonshot,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "mistral")]
    Mistral,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Moonshot => write!(f, "moonshot"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Mistral => write!(f, "mistral"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "moonshot" => Ok(LLMProvider::Moonshot),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "mistral" => Ok(LLMProvider::Mistral),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 草稿文件路径，刷新/重启后从这里恢复
    pub draft_path: PathBuf,

    /// 发布输出目录
    pub output_path: PathBuf,

    /// 生成内容的目标语言
    pub target_language: TargetLanguage,

    /// 站点配置
    pub site: SiteConfig,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 调研服务配置
    pub research: ResearchConfig,

    /// 缓存配置
    pub cache: CacheConfig,

    /// 各阶段生成参数
    pub generation: GenerationConfig,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// 站点配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SiteConfig {
    /// 站点自身域名，SEO检查时不计入外部链接
    pub domain: String,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 模型名称
    pub model: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,
}

/// 调研服务配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ResearchConfig {
    pub api_key: String,

    pub api_base_url: String,

    /// 每次调研返回的最大结果数
    pub max_results: usize,

    pub include_images: bool,

    /// basic 或 advanced
    pub search_depth: String,

    pub timeout_seconds: u64,

    /// prompt中单条资料的最大字符数
    pub max_snippet_chars: usize,
}

/// 缓存配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    /// 是否启用缓存
    pub enabled: bool,

    /// 缓存目录
    pub cache_dir: PathBuf,

    /// 缓存过期时间（小时）
    pub expire_hours: u64,
}

/// 生成参数
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GenerationConfig {
    /// 标题/描述的候选数量，最多4个
    pub candidate_count: usize,

    /// 每次生成的FAQ条数
    pub faq_count: usize,

    /// 每个章节的目标字数
    pub section_words: usize,
}

/// 标题/描述候选数量上限
pub const MAX_CANDIDATES: usize = 4;

impl GenerationConfig {
    pub fn effective_candidate_count(&self) -> usize {
        self.candidate_count.clamp(1, MAX_CANDIDATES)
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            draft_path: PathBuf::from(".travelpen/draft.json"),
            output_path: PathBuf::from("./travelpen.posts"),
            target_language: TargetLanguage::default(),
            site: SiteConfig::default(),
            llm: LLMConfig::default(),
            research: ResearchConfig::default(),
            cache: CacheConfig::default(),
            generation: GenerationConfig::default(),
            verbose: false,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: String::from("example.com"),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::default(),
            api_key: std::env::var("TRAVELPEN_LLM_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.openai.com/v1"),
            model: String::from("gpt-4o-mini"),
            max_tokens: 4096,
            temperature: 0.7,
            timeout_seconds: 120,
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("TRAVELPEN_RESEARCH_API_KEY").unwrap_or_default(),
            api_base_url: String::from("https://api.tavily.com"),
            max_results: 5,
            include_images: true,
            search_depth: String::from("advanced"),
            timeout_seconds: 60,
            max_snippet_chars: 1200,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_dir: PathBuf::from(".travelpen/cache"),
            expire_hours: 72,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            candidate_count: MAX_CANDIDATES,
            faq_count: 5,
            section_words: 350,
        }
    }
}
