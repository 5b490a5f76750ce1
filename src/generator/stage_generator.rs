use async_trait::async_trait;

use crate::error::{PipelineError, PipelineResult};
use crate::generator::context::GeneratorContext;
use crate::generator::pipeline::stage::Stage;
use crate::llm::{ChatMessage, GenerationRequest, ResponseFormat};
use crate::research::ResearchQuery;

/// Prompt模板配置
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// 系统提示词
    pub system_prompt: String,
    /// 开头的说明性指令
    pub opening_instruction: String,
    /// 结尾的强调性指令
    pub closing_instruction: String,
    /// 期望的响应格式
    pub format: ResponseFormat,
}

/// 单个向导阶段的生成器
///
/// 默认的 [`StageGenerator::generate`] 依次完成：按需调研、构建带角色的消息、调用生成服务、解析结果。
#[async_trait]
pub trait StageGenerator: Send + Sync {
    /// 生成所需的草稿子集
    type Input: Send + Sync;
    type Output: Send;

    fn stage(&self) -> Stage;

    /// 生成请求的标记
    fn tag(&self) -> &'static str {
        self.stage().key()
    }

    fn prompt_template(&self, context: &GeneratorContext) -> PromptTemplate;

    /// 需要先调研时返回查询
    fn research_query(&self, _input: &Self::Input) -> Option<ResearchQuery> {
        None
    }

    /// 阶段相关的prompt主体
    fn user_prompt(&self, input: &Self::Input, context: &GeneratorContext) -> String;

    fn parse(&self, raw: &str, input: &Self::Input) -> Result<Self::Output, String>;

    /// 生成失败时的兜底结果，默认没有
    fn fallback(&self, _input: &Self::Input, _reason: &str) -> Option<Self::Output> {
        None
    }

    async fn generate(
        &self,
        context: &GeneratorContext,
        input: &Self::Input,
    ) -> PipelineResult<Self::Output> {
        let stage = self.stage();
        tracing::info!(stage = %stage, "开始生成");

        // 1. 调研
        let research_notes = match self.research_query(input) {
            Some(query) => {
                let report = context
                    .research_cached(&query)
                    .await
                    .map_err(PipelineError::Research)?;
                if report.is_empty() {
                    None
                } else {
                    Some(report.format_for_prompt(
                        context.config.research.max_results,
                        context.config.research.max_snippet_chars,
                    ))
                }
            }
            None => None,
        };

        // 2. 构建prompt，并附加目标语言指令
        let template = self.prompt_template(context);
        let system_prompt = format!(
            "{}\n\n{}",
            template.system_prompt,
            context.config.target_language.prompt_instruction()
        );

        let mut user_prompt = String::new();
        user_prompt.push_str(&template.opening_instruction);
        user_prompt.push_str("\n\n");
        if let Some(notes) = research_notes {
            user_prompt.push_str("## Research material\n");
            user_prompt.push_str(&notes);
        }
        user_prompt.push_str(&self.user_prompt(input, context));
        user_prompt.push_str("\n\n");
        user_prompt.push_str(&template.closing_instruction);

        let request = GenerationRequest::new(self.tag(), template.format)
            .with_message(ChatMessage::system(system_prompt))
            .with_message(ChatMessage::user(user_prompt));

        // 3. 调用生成服务
        let raw = match context.generation.generate(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                let reason = e.to_string();
                return match self.fallback(input, &reason) {
                    Some(output) => Ok(output),
                    None => {
                        tracing::warn!(stage = %stage, error = %reason, "生成失败");
                        Err(PipelineError::generation(stage, reason))
                    }
                };
            }
        };

        // 4. 解析
        match self.parse(&raw, input) {
            Ok(output) => {
                tracing::info!(stage = %stage, "生成完成");
                Ok(output)
            }
            Err(reason) => match self.fallback(input, &reason) {
                Some(output) => Ok(output),
                None => {
                    tracing::warn!(stage = %stage, error = %reason, "解析生成结果失败");
                    Err(PipelineError::generation(stage, reason))
                }
            },
        }
    }
}
