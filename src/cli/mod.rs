use crate::config::{Config, LLMProvider};
use crate::i18n::TargetLanguage;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
pub mod runner;

pub use commands::WizardCommand;
pub use runner::{AutoOptions, Wizard, run, run_auto};

/// 默认配置文件名，位于当前目录
pub const DEFAULT_CONFIG_FILE: &str = "travelpen.toml";

/// travelpen - 由Rust与AI驱动的旅行博客写作向导
#[derive(Parser, Debug)]
#[command(name = "travelpen")]
#[command(
    about = "AI-assisted travel blog writer. Walks a post through title, description, slug, tags, outline, section content and FAQs, then scores it against an SEO checklist."
)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// 配置文件路径
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 草稿文件路径
    #[arg(short, long, global = true)]
    pub draft_path: Option<PathBuf>,

    /// 发布输出目录
    #[arg(short, long, global = true)]
    pub output_path: Option<PathBuf>,

    /// 是否启用详细日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// LLM Provider (openai, moonshot, deepseek, mistral, openrouter, anthropic, ollama)
    #[arg(long, global = true)]
    pub llm_provider: Option<String>,

    /// 模型名称
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// LLM API基地址
    #[arg(long, global = true)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY
    #[arg(long, global = true)]
    pub llm_api_key: Option<String>,

    /// 调研服务 API KEY
    #[arg(long, global = true)]
    pub research_api_key: Option<String>,

    /// 目标语言 (en, zh, ja, ko, de, fr, es, it)
    #[arg(long, global = true)]
    pub target_language: Option<String>,

    /// 站点域名，SEO检查时区分内外部链接
    #[arg(long, global = true)]
    pub site_domain: Option<String>,

    /// 是否禁用调研缓存
    #[arg(long, global = true)]
    pub no_cache: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// 交互式向导（默认）
    Wizard,

    /// 查看当前草稿
    Status,

    /// 对当前草稿做SEO检查
    Score,

    /// 放弃当前草稿
    Discard,

    /// 自动完成所有阶段，每一步采用第一个候选，然后发布
    Auto {
        /// 文章主题
        #[arg(long)]
        topic: String,

        /// 调研时附加的目的地限定
        #[arg(long)]
        destination_qualifier: Option<String>,

        /// 分类ID
        #[arg(long)]
        category: String,

        /// 目的地ID
        #[arg(long)]
        destination: String,
    },
}

impl Args {
    /// 要执行的子命令，未指定时进入交互式向导
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Wizard)
    }

    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(config_path) => Config::from_file(config_path)
                .with_context(|| format!("无法读取配置文件 {:?}", config_path))?,
            None => {
                let default_config_path = std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join(DEFAULT_CONFIG_FILE);
                if default_config_path.exists() {
                    Config::from_file(&default_config_path).with_context(|| {
                        format!("无法读取默认配置文件 {:?}", default_config_path)
                    })?
                } else {
                    Config::default()
                }
            }
        };

        if let Some(draft_path) = self.draft_path {
            config.draft_path = draft_path;
        }
        if let Some(output_path) = self.output_path {
            config.output_path = output_path;
        }

        // 覆盖LLM配置
        if let Some(provider_str) = self.llm_provider {
            config.llm.provider = provider_str
                .parse::<LLMProvider>()
                .map_err(anyhow::Error::msg)?;
        }
        if let Some(model) = self.model {
            config.llm.model = model;
        }
        if let Some(llm_api_base_url) = self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url;
        }
        if let Some(llm_api_key) = self.llm_api_key {
            config.llm.api_key = llm_api_key;
        }
        if let Some(research_api_key) = self.research_api_key {
            config.research.api_key = research_api_key;
        }

        if let Some(target_language_str) = self.target_language {
            match target_language_str.parse::<TargetLanguage>() {
                Ok(target_language) => config.target_language = target_language,
                Err(_) => eprintln!(
                    "⚠️ 警告: 未知的目标语言: {}，使用 {}",
                    target_language_str, config.target_language
                ),
            }
        }

        if let Some(site_domain) = self.site_domain {
            config.site.domain = site_domain;
        }

        if self.no_cache {
            config.cache.enabled = false;
        }
        config.verbose = config.verbose || self.verbose;

        Ok(config)
    }
}

#[cfg(test)]
mod tests;
