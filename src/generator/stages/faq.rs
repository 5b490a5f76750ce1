use async_trait::async_trait;
use serde::Deserialize;

use crate::draft::Faq;
use crate::generator::context::GeneratorContext;
use crate::generator::parse::parse_json;
use crate::generator::pipeline::stage::Stage;
use crate::generator::stage_generator::{PromptTemplate, StageGenerator};
use crate::llm::ResponseFormat;
use crate::research::ResearchQuery;

use super::topic_line;

#[derive(Deserialize)]
#[serde(untagged)]
enum FaqPayload {
    Wrapped { faqs: Vec<Faq> },
    Bare(Vec<Faq>),
}

#[derive(Debug, Clone)]
pub struct FaqInput {
    pub topic: String,
    pub destination: Option<String>,
    pub title: String,
    pub headings: Vec<String>,
}

/// FAQ生成，先调研再生成
#[derive(Default)]
pub struct FaqGenerator;

#[async_trait]
impl StageGenerator for FaqGenerator {
    type Input = FaqInput;
    type Output = Vec<Faq>;

    fn stage(&self) -> Stage {
        Stage::Faqs
    }

    fn prompt_template(&self, context: &GeneratorContext) -> PromptTemplate {
        PromptTemplate {
            system_prompt: "You answer the practical questions travellers ask before a trip.".to_string(),
            opening_instruction: "Write frequently asked questions for the travel post below.".to_string(),
            closing_instruction: format!(
                "Return a JSON array of {} objects with the fields \"question\" and \"answer\". Answers are two or three sentences of plain text.",
                context.config.generation.faq_count.max(crate::draft::MIN_FAQS)
            ),
            format: ResponseFormat::Json,
        }
    }

    fn research_query(&self, input: &Self::Input) -> Option<ResearchQuery> {
        Some(ResearchQuery::new(
            format!("{} travel tips questions", input.topic.trim()),
            input.destination.clone(),
        ))
    }

    fn user_prompt(&self, input: &Self::Input, _context: &GeneratorContext) -> String {
        format!(
            "{}\nTitle: {}\nSections: {}",
            topic_line(&input.topic, input.destination.as_deref()),
            input.title.trim(),
            input.headings.join(" | ")
        )
    }

    fn parse(&self, raw: &str, _input: &Self::Input) -> Result<Self::Output, String> {
        let faqs = match parse_json::<FaqPayload>(raw)? {
            FaqPayload::Wrapped { faqs } => faqs,
            FaqPayload::Bare(faqs) => faqs,
        };
        let faqs: Vec<Faq> = faqs
            .into_iter()
            .map(|faq| Faq::new(faq.question.trim(), faq.answer.trim()))
            .filter(|faq| !faq.question.is_empty() && !faq.answer.is_empty())
            .collect();
        if faqs.is_empty() {
            Err("没有得到任何FAQ".to_string())
        } else {
            Ok(faqs)
        }
    }
}
