//! 流水线错误分类

use thiserror::Error;

use crate::generator::pipeline::stage::{GenerationTarget, Stage};

/// 外部服务（调研/生成）调用错误
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    #[error("请求失败: {0}")]
    Request(String),

    #[error("请求超时 ({0}秒)")]
    Timeout(u64),

    #[error("服务返回错误状态 {status}: {body}")]
    Status { status: u16, body: String },

    #[error("响应解析失败: {0}")]
    Decode(String),

    #[error("服务未配置: {0}")]
    NotConfigured(String),
}

/// 推进/选择等操作的前置条件不满足，属于界面层拒绝，不改变任何状态
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationFailure {
    #[error("请先填写主题")]
    MissingTopic,

    #[error("请先选择标题")]
    MissingTitle,

    #[error("请先选择描述")]
    MissingDescription,

    #[error("slug 与 SEO slug 都不能为空")]
    MissingSlugs,

    #[error("至少需要一个标签和一个关键词")]
    MissingTagsOrKeywords,

    #[error("大纲不能为空")]
    EmptyOutline,

    #[error("以下章节尚未生成内容: {pending:?}")]
    SectionsIncomplete { pending: Vec<usize> },

    #[error("FAQ 数量不足: 当前 {have} 条，至少需要 {need} 条")]
    NotEnoughFaqs { have: usize, need: usize },

    #[error("当前处于 {current} 阶段，无法操作 {expected} 阶段")]
    WrongStage { expected: Stage, current: Stage },

    #[error("已经是最后一个阶段")]
    NoNextStage,

    #[error("只能回退到更早的阶段 (当前 {current}, 目标 {target})")]
    InvalidRetreat { current: Stage, target: Stage },

    #[error("{0} 正在生成中，请等待结果返回")]
    AlreadyInFlight(GenerationTarget),

    #[error("{0} 阶段没有可用的候选结果")]
    NoCandidates(Stage),

    #[error("候选序号 {index} 超出范围 (共 {len} 个)")]
    CandidateOutOfRange { index: usize, len: usize },

    #[error("章节序号 {index} 超出范围 (共 {len} 个章节)")]
    SectionOutOfRange { index: usize, len: usize },

    #[error("{0} 阶段没有生成器")]
    NothingToGenerate(Stage),

    #[error("输入内容不能为空")]
    EmptyValue,

    #[error("以下标题与现有大纲重复: {0:?}")]
    DuplicateHeadings(Vec<String>),
}

/// 发布网关拒绝保存
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PersistenceFailure {
    #[error("缺少分类")]
    MissingCategory,

    #[error("缺少目的地")]
    MissingDestination,

    #[error("slug `{0}` 已被占用")]
    DuplicateSlug(String),

    #[error("存储失败: {0}")]
    Storage(String),
}

/// 流水线错误
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("调研失败: {0}")]
    Research(#[source] ProviderError),

    #[error("{stage} 阶段生成失败: {reason}")]
    Generation { stage: Stage, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("发布失败: {0}")]
    Persistence(#[from] PersistenceFailure),

    #[error("草稿存储失败: {0}")]
    Store(#[source] anyhow::Error),
}

impl PipelineError {
    pub fn generation(stage: Stage, reason: impl Into<String>) -> Self {
        PipelineError::Generation {
            stage,
            reason: reason.into(),
        }
    }

    /// 是否可以通过“重新生成”恢复
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::Research(_) | PipelineError::Generation { .. }
        )
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
