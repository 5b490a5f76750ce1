use async_trait::async_trait;

use crate::generator::context::GeneratorContext;
use crate::generator::parse::parse_candidate_lines;
use crate::generator::pipeline::stage::Stage;
use crate::generator::stage_generator::{PromptTemplate, StageGenerator};
use crate::llm::ResponseFormat;

use super::topic_line;

#[derive(Debug, Clone)]
pub struct DescriptionInput {
    pub topic: String,
    pub destination: Option<String>,
    pub title: String,
}

/// 描述候选生成
#[derive(Default)]
pub struct DescriptionGenerator;

#[async_trait]
impl StageGenerator for DescriptionGenerator {
    type Input = DescriptionInput;
    type Output = Vec<String>;

    fn stage(&self) -> Stage {
        Stage::Description
    }

    fn prompt_template(&self, context: &GeneratorContext) -> PromptTemplate {
        let count = context.config.generation.effective_candidate_count();
        PromptTemplate {
            system_prompt: "You write meta descriptions for travel blog posts. They are specific, inviting and never clickbait.".to_string(),
            opening_instruction: format!("Write {} alternative meta descriptions for the post below.", count),
            closing_instruction: format!(
                "Return exactly {} descriptions, one per line, without numbering or quotes. Each should be 150 to 160 characters long.",
                count
            ),
            format: ResponseFormat::Text,
        }
    }

    fn user_prompt(&self, input: &Self::Input, _context: &GeneratorContext) -> String {
        format!(
            "{}\nTitle: {}",
            topic_line(&input.topic, input.destination.as_deref()),
            input.title.trim()
        )
    }

    fn parse(&self, raw: &str, _input: &Self::Input) -> Result<Self::Output, String> {
        let descriptions = parse_candidate_lines(raw, crate::config::MAX_CANDIDATES);
        if descriptions.is_empty() {
            Err("没有得到任何描述".to_string())
        } else {
            Ok(descriptions)
        }
    }
}
