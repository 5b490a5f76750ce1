use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::generator::context::GeneratorContext;
use crate::generator::parse::{json_schema_instruction, parse_json};
use crate::generator::pipeline::stage::Stage;
use crate::generator::stage_generator::{PromptTemplate, StageGenerator};
use crate::llm::ResponseFormat;

/// slug 最大长度
pub const SLUG_MAX_CHARS: usize = 60;
/// SEO slug 最大长度
pub const SEO_SLUG_MAX_CHARS: usize = 80;

const SEO_SLUG_SUFFIX: &str = "-travel-guide";
const EMPTY_SLUG: &str = "travel-post";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlugPair {
    /// URL-safe slug, lowercase words joined by hyphens, at most 60 characters
    pub slug: String,
    /// longer keyword-rich variant, at most 80 characters
    #[serde(alias = "seo_slug")]
    pub seo_slug: String,
}

/// slug 阶段的候选，标记是否由兜底规则生成
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugCandidate {
    pub pair: SlugPair,
    pub fallback_applied: bool,
}

#[derive(Debug, Clone)]
pub struct SlugInput {
    pub title: String,
}

/// 把任意文本转换为 slug：小写、非字母数字折叠为单个连字符、截断到指定长度
pub fn slugify_with_limit(text: &str, max_chars: usize) -> String {
    let joined = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let truncated: String = joined.chars().take(max_chars).collect();
    truncated.trim_end_matches('-').to_string()
}

pub fn slugify(text: &str) -> String {
    slugify_with_limit(text, SLUG_MAX_CHARS)
}

pub fn seo_slug_for(slug: &str) -> String {
    slugify_with_limit(&format!("{}{}", slug, SEO_SLUG_SUFFIX), SEO_SLUG_MAX_CHARS)
}

fn fallback_pair(title: &str) -> SlugPair {
    let mut slug = slugify(title);
    if slug.is_empty() {
        slug = EMPTY_SLUG.to_string();
    }
    let seo_slug = seo_slug_for(&slug);
    SlugPair { slug, seo_slug }
}

/// slug 生成
#[derive(Default)]
pub struct SlugGenerator;

#[async_trait]
impl StageGenerator for SlugGenerator {
    type Input = SlugInput;
    type Output = SlugCandidate;

    fn stage(&self) -> Stage {
        Stage::Slug
    }

    fn prompt_template(&self, _context: &GeneratorContext) -> PromptTemplate {
        PromptTemplate {
            system_prompt: "You create URL slugs for a travel blog.".to_string(),
            opening_instruction: "Create a short slug and a longer SEO slug for the post title below.".to_string(),
            closing_instruction: format!(
                "{}\nUse lowercase ASCII words separated by hyphens. The slug has at most {} characters, the SEO slug at most {}.",
                json_schema_instruction::<SlugPair>(),
                SLUG_MAX_CHARS,
                SEO_SLUG_MAX_CHARS
            ),
            format: ResponseFormat::Json,
        }
    }

    fn user_prompt(&self, input: &Self::Input, _context: &GeneratorContext) -> String {
        format!("Title: {}", input.title.trim())
    }

    fn parse(&self, raw: &str, _input: &Self::Input) -> Result<Self::Output, String> {
        let pair: SlugPair = parse_json(raw)?;
        let slug = slugify_with_limit(&pair.slug, SLUG_MAX_CHARS);
        let seo_slug = slugify_with_limit(&pair.seo_slug, SEO_SLUG_MAX_CHARS);
        if slug.is_empty() || seo_slug.is_empty() {
            return Err("slug 为空".to_string());
        }
        Ok(SlugCandidate {
            pair: SlugPair { slug, seo_slug },
            fallback_applied: false,
        })
    }

    fn fallback(&self, input: &Self::Input, reason: &str) -> Option<Self::Output> {
        let pair = fallback_pair(&input.title);
        tracing::warn!(
            event = "slug_fallback_applied",
            reason,
            slug = %pair.slug,
            seo_slug = %pair.seo_slug,
            "slug 生成失败，已根据标题生成"
        );
        Some(SlugCandidate {
            pair,
            fallback_applied: true,
        })
    }
}
