use async_trait::async_trait;

use crate::generator::context::GeneratorContext;
use crate::generator::parse::{strip_code_fence, strip_leading_heading};
use crate::generator::pipeline::stage::Stage;
use crate::generator::stage_generator::{PromptTemplate, StageGenerator};
use crate::llm::ResponseFormat;
use crate::research::ResearchQuery;

use super::topic_line;

#[derive(Debug, Clone)]
pub struct SectionInput {
    pub topic: String,
    pub destination: Option<String>,
    pub title: String,
    pub keywords: Vec<String>,
    /// 章节在大纲中的序号
    pub index: usize,
    pub heading: String,
    pub subheadings: Vec<String>,
    /// 完整大纲，避免各章节内容重复
    pub outline: Vec<String>,
}

/// 单个章节的正文生成
#[derive(Default)]
pub struct SectionGenerator;

#[async_trait]
impl StageGenerator for SectionGenerator {
    type Input = SectionInput;
    type Output = String;

    fn stage(&self) -> Stage {
        Stage::Content
    }

    fn tag(&self) -> &'static str {
        "section"
    }

    fn prompt_template(&self, context: &GeneratorContext) -> PromptTemplate {
        PromptTemplate {
            system_prompt: "You are a travel writer. You write vivid, accurate and useful HTML article sections.".to_string(),
            opening_instruction: "Write one section of the travel post below.".to_string(),
            closing_instruction: format!(
                "Write about {} words of HTML using <p>, <h3>, <ul>, <li>, <strong> and <a> tags. Do not repeat the section heading and do not wrap the answer in markdown.",
                context.config.generation.section_words
            ),
            format: ResponseFormat::Text,
        }
    }

    fn research_query(&self, input: &Self::Input) -> Option<ResearchQuery> {
        Some(ResearchQuery::new(
            format!("{} {}", input.topic.trim(), input.heading.trim()),
            input.destination.clone(),
        ))
    }

    fn user_prompt(&self, input: &Self::Input, _context: &GeneratorContext) -> String {
        let mut prompt = format!(
            "{}\nTitle: {}\nKeywords: {}\n\nFull outline:\n",
            topic_line(&input.topic, input.destination.as_deref()),
            input.title.trim(),
            input.keywords.join(", ")
        );
        for (i, heading) in input.outline.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, heading));
        }
        prompt.push_str(&format!(
            "\nSection to write ({}): {}\n",
            input.index + 1,
            input.heading.trim()
        ));
        if !input.subheadings.is_empty() {
            prompt.push_str(&format!("Cover these sub-points: {}\n", input.subheadings.join("; ")));
        }
        prompt
    }

    fn parse(&self, raw: &str, _input: &Self::Input) -> Result<Self::Output, String> {
        let html = strip_leading_heading(strip_code_fence(raw));
        if html.is_empty() {
            Err("章节内容为空".to_string())
        } else {
            Ok(html.to_string())
        }
    }
}
