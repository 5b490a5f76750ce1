use serde::{Deserialize, Serialize};

use crate::draft::{Draft, Faq, OutlineSection};
use crate::error::{PipelineResult, ValidationFailure};
use crate::generator::context::GeneratorContext;
use crate::generator::pipeline::stage::{GenerationTarget, Stage};
use crate::generator::stage_generator::StageGenerator;
use crate::generator::stages::{
    DescriptionGenerator, DescriptionInput, FaqGenerator, FaqInput, OutlineGenerator,
    OutlineInput, SectionGenerator, SectionInput, SlugCandidate, SlugGenerator, SlugInput,
    TagSet, TagsGenerator, TagsInput, TitleGenerator, TitleInput,
};

/// 某个阶段当前的候选结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "camelCase")]
pub enum StageCandidates {
    Titles(Vec<String>),
    Descriptions(Vec<String>),
    Slugs(SlugCandidate),
    Tags(TagSet),
    Outline(Vec<OutlineSection>),
    Faqs(Vec<Faq>),
}

impl StageCandidates {
    pub fn stage(&self) -> Stage {
        match self {
            StageCandidates::Titles(_) => Stage::Title,
            StageCandidates::Descriptions(_) => Stage::Description,
            StageCandidates::Slugs(_) => Stage::Slug,
            StageCandidates::Tags(_) => Stage::Tags,
            StageCandidates::Outline(_) => Stage::Outline,
            StageCandidates::Faqs(_) => Stage::Faqs,
        }
    }

    /// 可供选择的候选数量，整组结果的阶段只有一个候选
    pub fn len(&self) -> usize {
        match self {
            StageCandidates::Titles(items) | StageCandidates::Descriptions(items) => items.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 便于展示的候选文本
    pub fn display_lines(&self) -> Vec<String> {
        match self {
            StageCandidates::Titles(items) | StageCandidates::Descriptions(items) => {
                items.clone()
            }
            StageCandidates::Slugs(candidate) => {
                let mut line = format!(
                    "slug: {} | seo slug: {}",
                    candidate.pair.slug, candidate.pair.seo_slug
                );
                if candidate.fallback_applied {
                    line.push_str(" (根据标题生成)");
                }
                vec![line]
            }
            StageCandidates::Tags(set) => vec![format!(
                "tags: {} | keywords: {}",
                set.tags.join(", "),
                set.keywords.join(", ")
            )],
            StageCandidates::Outline(sections) => vec![
                sections
                    .iter()
                    .map(|s| s.heading.as_str())
                    .collect::<Vec<_>>()
                    .join(" / "),
            ],
            StageCandidates::Faqs(faqs) => vec![
                faqs.iter()
                    .map(|f| f.question.as_str())
                    .collect::<Vec<_>>()
                    .join(" / "),
            ],
        }
    }
}

/// 一次生成的结果
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    Candidates(StageCandidates),
    SectionContent { index: usize, html: String },
}

/// 按生成目标分派到具体生成器的请求，输入取自草稿
#[derive(Debug, Clone)]
pub enum StageRequest {
    Title(TitleInput),
    Description(DescriptionInput),
    Slug(SlugInput),
    Tags(TagsInput),
    Outline(OutlineInput),
    Section(SectionInput),
    Faqs(FaqInput),
}

impl StageRequest {
    /// 从草稿中截取生成所需的字段
    pub fn from_draft(target: GenerationTarget, draft: &Draft) -> Result<Self, ValidationFailure> {
        if draft.topic.trim().is_empty() {
            return Err(ValidationFailure::MissingTopic);
        }
        let topic = draft.topic.clone();
        let destination = draft.destination.clone();

        let request = match (target.stage, target.section) {
            (Stage::Title, _) => StageRequest::Title(TitleInput { topic, destination }),
            (Stage::Description, _) => StageRequest::Description(DescriptionInput {
                topic,
                destination,
                title: draft.selected_title.clone(),
            }),
            (Stage::Slug, _) => StageRequest::Slug(SlugInput {
                title: draft.selected_title.clone(),
            }),
            (Stage::Tags, _) => StageRequest::Tags(TagsInput {
                title: draft.selected_title.clone(),
                description: draft.selected_description.clone(),
            }),
            (Stage::Outline, _) => StageRequest::Outline(OutlineInput {
                topic,
                destination,
                title: draft.selected_title.clone(),
                description: draft.selected_description.clone(),
                keywords: draft.keywords.clone(),
            }),
            (Stage::Content, Some(index)) => {
                let section =
                    draft
                        .outline
                        .get(index)
                        .ok_or(ValidationFailure::SectionOutOfRange {
                            index,
                            len: draft.outline.len(),
                        })?;
                StageRequest::Section(SectionInput {
                    topic,
                    destination,
                    title: draft.selected_title.clone(),
                    keywords: draft.keywords.clone(),
                    index,
                    heading: section.heading.clone(),
                    subheadings: section.subheadings.clone(),
                    outline: draft.headings(),
                })
            }
            (Stage::Faqs, _) => StageRequest::Faqs(FaqInput {
                topic,
                destination,
                title: draft.selected_title.clone(),
                headings: draft.headings(),
            }),
            (stage @ (Stage::Content | Stage::Review), _) => {
                return Err(ValidationFailure::NothingToGenerate(stage));
            }
        };
        Ok(request)
    }

    /// 调用对应的生成器
    pub async fn execute(&self, context: &GeneratorContext) -> PipelineResult<StageOutput> {
        let output = match self {
            StageRequest::Title(input) => StageOutput::Candidates(StageCandidates::Titles(
                TitleGenerator.generate(context, input).await?,
            )),
            StageRequest::Description(input) => {
                StageOutput::Candidates(StageCandidates::Descriptions(
                    DescriptionGenerator.generate(context, input).await?,
                ))
            }
            StageRequest::Slug(input) => StageOutput::Candidates(StageCandidates::Slugs(
                SlugGenerator.generate(context, input).await?,
            )),
            StageRequest::Tags(input) => StageOutput::Candidates(StageCandidates::Tags(
                TagsGenerator.generate(context, input).await?,
            )),
            StageRequest::Outline(input) => StageOutput::Candidates(StageCandidates::Outline(
                OutlineGenerator.generate(context, input).await?,
            )),
            StageRequest::Section(input) => StageOutput::SectionContent {
                index: input.index,
                html: SectionGenerator.generate(context, input).await?,
            },
            StageRequest::Faqs(input) => StageOutput::Candidates(StageCandidates::Faqs(
                FaqGenerator.generate(context, input).await?,
            )),
        };
        Ok(output)
    }
}
