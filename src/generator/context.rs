use std::sync::Arc;

use anyhow::Result;

use crate::{
    cache::CacheManager,
    config::Config,
    error::ProviderError,
    llm::{GenerationProvider, LLMClient},
    research::{ResearchProvider, ResearchQuery, ResearchReport, WebResearchClient},
};

const RESEARCH_CACHE_CATEGORY: &str = "research";

/// 生成器上下文，持有外部服务的注入实例
#[derive(Clone)]
pub struct GeneratorContext {
    /// 配置
    pub config: Config,
    /// 文本生成服务
    pub generation: Arc<dyn GenerationProvider>,
    /// 调研服务
    pub research: Arc<dyn ResearchProvider>,
    /// 调研结果缓存
    pub cache_manager: Arc<CacheManager>,
}

impl GeneratorContext {
    /// 按配置创建真实的服务客户端
    pub fn new(config: Config) -> Result<Self> {
        let generation = Arc::new(LLMClient::new(config.llm.clone())?);
        let research = Arc::new(WebResearchClient::new(config.research.clone())?);
        Ok(Self::with_providers(config, generation, research))
    }

    /// 使用外部提供的服务实例
    pub fn with_providers(
        config: Config,
        generation: Arc<dyn GenerationProvider>,
        research: Arc<dyn ResearchProvider>,
    ) -> Self {
        let cache_manager = Arc::new(CacheManager::new(config.cache.clone()));
        Self {
            config,
            generation,
            research,
            cache_manager,
        }
    }

    /// 带缓存的调研，缓存读写失败只记录日志，不影响调研本身
    pub async fn research_cached(
        &self,
        query: &ResearchQuery,
    ) -> Result<ResearchReport, ProviderError> {
        let cache_key = format!(
            "{}|{}|{}",
            query.query_text(),
            self.config.research.search_depth,
            self.config.research.max_results
        );

        match self
            .cache_manager
            .get::<ResearchReport>(RESEARCH_CACHE_CATEGORY, &cache_key)
            .await
        {
            Ok(Some(report)) => {
                tracing::debug!(query = %query.query_text(), "调研缓存命中");
                return Ok(report);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "读取调研缓存失败"),
        }

        let report = self.research.research(query).await?;
        if let Err(e) = self
            .cache_manager
            .set(RESEARCH_CACHE_CATEGORY, &cache_key, &report)
            .await
        {
            tracing::warn!(error = %e, "写入调研缓存失败");
        }
        Ok(report)
    }
}
