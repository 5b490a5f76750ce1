use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::draft::{OutlineSection, normalize_heading};
use crate::generator::context::GeneratorContext;
use crate::generator::parse::{json_schema_instruction, parse_json};
use crate::generator::pipeline::stage::Stage;
use crate::generator::stage_generator::{PromptTemplate, StageGenerator};
use crate::llm::ResponseFormat;
use crate::research::ResearchQuery;

use super::topic_line;

/// 大纲中的一项
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OutlineItem {
    /// section heading rendered as an H2
    #[serde(alias = "heading")]
    pub h2: String,
    /// optional H3 sub-points of the section
    #[serde(default, alias = "subheadings")]
    pub h3: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OutlinePayload {
    Wrapped { outline: Vec<OutlineItem> },
    Bare(Vec<OutlineItem>),
}

#[derive(Debug, Clone)]
pub struct OutlineInput {
    pub topic: String,
    pub destination: Option<String>,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
}

/// 大纲生成，先调研再生成
#[derive(Default)]
pub struct OutlineGenerator;

#[async_trait]
impl StageGenerator for OutlineGenerator {
    type Input = OutlineInput;
    type Output = Vec<OutlineSection>;

    fn stage(&self) -> Stage {
        Stage::Outline
    }

    fn prompt_template(&self, _context: &GeneratorContext) -> PromptTemplate {
        PromptTemplate {
            system_prompt: "You plan well-structured, practical travel articles.".to_string(),
            opening_instruction: "Draft the outline of the travel post below using the research material.".to_string(),
            closing_instruction: format!(
                "Return a JSON array of sections. Each item looks like this:\n{}\nPlan 5 to 8 sections with distinct headings.",
                json_schema_instruction::<OutlineItem>()
            ),
            format: ResponseFormat::Json,
        }
    }

    fn research_query(&self, input: &Self::Input) -> Option<ResearchQuery> {
        Some(ResearchQuery::new(input.topic.clone(), input.destination.clone()))
    }

    fn user_prompt(&self, input: &Self::Input, _context: &GeneratorContext) -> String {
        format!(
            "{}\nTitle: {}\nDescription: {}\nKeywords: {}",
            topic_line(&input.topic, input.destination.as_deref()),
            input.title.trim(),
            input.description.trim(),
            input.keywords.join(", ")
        )
    }

    fn parse(&self, raw: &str, _input: &Self::Input) -> Result<Self::Output, String> {
        let items = match parse_json::<OutlinePayload>(raw)? {
            OutlinePayload::Wrapped { outline } => outline,
            OutlinePayload::Bare(items) => items,
        };

        let mut seen = HashSet::new();
        let sections: Vec<OutlineSection> = items
            .into_iter()
            .filter(|item| !item.h2.trim().is_empty())
            .filter(|item| seen.insert(normalize_heading(&item.h2)))
            .map(|item| {
                let subheadings = item
                    .h3
                    .into_iter()
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty())
                    .collect();
                OutlineSection::new(item.h2.trim(), subheadings)
            })
            .collect();

        if sections.is_empty() {
            Err("大纲为空".to_string())
        } else {
            Ok(sections)
        }
    }
}
