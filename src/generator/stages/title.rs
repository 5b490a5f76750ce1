use async_trait::async_trait;

use crate::generator::context::GeneratorContext;
use crate::generator::parse::parse_candidate_lines;
use crate::generator::pipeline::stage::Stage;
use crate::generator::stage_generator::{PromptTemplate, StageGenerator};
use crate::llm::ResponseFormat;

use super::topic_line;

#[derive(Debug, Clone)]
pub struct TitleInput {
    pub topic: String,
    pub destination: Option<String>,
}

/// 标题候选生成
#[derive(Default)]
pub struct TitleGenerator;

#[async_trait]
impl StageGenerator for TitleGenerator {
    type Input = TitleInput;
    type Output = Vec<String>;

    fn stage(&self) -> Stage {
        Stage::Title
    }

    fn prompt_template(&self, context: &GeneratorContext) -> PromptTemplate {
        let count = context.config.generation.effective_candidate_count();
        PromptTemplate {
            system_prompt: "You are an experienced travel editor who writes click-worthy, honest blog post titles optimised for search engines.".to_string(),
            opening_instruction: format!("Suggest {} alternative titles for a travel blog post.", count),
            closing_instruction: format!(
                "Return exactly {} titles, one per line, without numbering or quotes. Aim for 50 to 60 characters each.",
                count
            ),
            format: ResponseFormat::Text,
        }
    }

    fn user_prompt(&self, input: &Self::Input, _context: &GeneratorContext) -> String {
        topic_line(&input.topic, input.destination.as_deref())
    }

    fn parse(&self, raw: &str, _input: &Self::Input) -> Result<Self::Output, String> {
        let titles = parse_candidate_lines(raw, crate::config::MAX_CANDIDATES);
        if titles.is_empty() {
            Err("没有得到任何标题".to_string())
        } else {
            Ok(titles)
        }
    }
}
