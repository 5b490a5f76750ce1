use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::generator::context::GeneratorContext;
use crate::generator::parse::{json_schema_instruction, parse_json};
use crate::generator::pipeline::stage::Stage;
use crate::generator::stage_generator::{PromptTemplate, StageGenerator};
use crate::llm::ResponseFormat;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TagSet {
    /// short category-like tags, e.g. "temples"
    pub tags: Vec<String>,
    /// search keywords readers would type, e.g. "kyoto autumn itinerary"
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TagsInput {
    pub title: String,
    pub description: String,
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| item.trim().trim_start_matches('#').trim().to_string())
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

/// 标签与关键词生成
#[derive(Default)]
pub struct TagsGenerator;

#[async_trait]
impl StageGenerator for TagsGenerator {
    type Input = TagsInput;
    type Output = TagSet;

    fn stage(&self) -> Stage {
        Stage::Tags
    }

    fn prompt_template(&self, _context: &GeneratorContext) -> PromptTemplate {
        PromptTemplate {
            system_prompt: "You are an SEO specialist for a travel publication.".to_string(),
            opening_instruction: "Propose tags and search keywords for the post below.".to_string(),
            closing_instruction: format!(
                "{}\nGive 3 to 8 tags and 3 to 8 keywords.",
                json_schema_instruction::<TagSet>()
            ),
            format: ResponseFormat::Json,
        }
    }

    fn user_prompt(&self, input: &Self::Input, _context: &GeneratorContext) -> String {
        format!(
            "Title: {}\nDescription: {}",
            input.title.trim(),
            input.description.trim()
        )
    }

    fn parse(&self, raw: &str, _input: &Self::Input) -> Result<Self::Output, String> {
        let set: TagSet = parse_json(raw)?;
        let tags = clean_list(set.tags);
        let keywords = clean_list(set.keywords);
        if tags.is_empty() || keywords.is_empty() {
            return Err("标签和关键词都不能为空".to_string());
        }
        Ok(TagSet { tags, keywords })
    }
}
