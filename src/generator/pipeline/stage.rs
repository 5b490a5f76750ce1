use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::draft::{Draft, MIN_FAQS};
use crate::error::ValidationFailure;

/// 向导阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Stage {
    Title = 1,
    Description = 2,
    Slug = 3,
    Tags = 4,
    Outline = 5,
    Content = 6,
    Faqs = 7,
    Review = 8,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Title,
        Stage::Description,
        Stage::Slug,
        Stage::Tags,
        Stage::Outline,
        Stage::Content,
        Stage::Faqs,
        Stage::Review,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    fn index(self) -> usize {
        self as usize - 1
    }

    pub fn from_number(number: u8) -> Option<Stage> {
        Self::ALL.get((number as usize).checked_sub(1)?).copied()
    }

    pub fn next(self) -> Option<Stage> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Stage> {
        Self::from_number(self.number().checked_sub(1)?)
    }

    /// 用于日志、调研缓存与生成请求标记
    pub fn key(self) -> &'static str {
        match self {
            Stage::Title => "title",
            Stage::Description => "description",
            Stage::Slug => "slug",
            Stage::Tags => "tags",
            Stage::Outline => "outline",
            Stage::Content => "content",
            Stage::Faqs => "faqs",
            Stage::Review => "review",
        }
    }

    pub fn from_key(key: &str) -> Option<Stage> {
        let key = key.trim().to_lowercase();
        if let Ok(number) = key.parse::<u8>() {
            return Self::from_number(number);
        }
        Self::ALL.iter().copied().find(|stage| stage.key() == key)
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Stage::Title => "Title",
            Stage::Description => "Description",
            Stage::Slug => "Slug",
            Stage::Tags => "Tags",
            Stage::Outline => "Outline",
            Stage::Content => "Content",
            Stage::Faqs => "FAQs",
            Stage::Review => "Review",
        };
        write!(f, "{}({})", label, self.number())
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> Self {
        stage.number()
    }
}

impl TryFrom<u8> for Stage {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Stage::from_number(value).ok_or_else(|| format!("invalid stage number: {}", value))
    }
}

/// 一次生成请求的目标；正文阶段按章节区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationTarget {
    pub stage: Stage,
    pub section: Option<usize>,
}

impl GenerationTarget {
    pub fn stage(stage: Stage) -> Self {
        Self {
            stage,
            section: None,
        }
    }

    pub fn section(index: usize) -> Self {
        Self {
            stage: Stage::Content,
            section: Some(index),
        }
    }
}

impl Display for GenerationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.section {
            Some(index) => write!(f, "{} 第{}节", self.stage, index + 1),
            None => write!(f, "{}", self.stage),
        }
    }
}

type Requirement = fn(&Draft) -> Result<(), ValidationFailure>;

/// 离开各阶段的前置条件，按阶段序号索引
const EXIT_REQUIREMENTS: [Requirement; 8] = [
    title_selected,
    description_selected,
    slugs_present,
    tags_present,
    outline_present,
    sections_written,
    faqs_ready,
    ready_to_publish,
];

fn non_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

fn title_selected(draft: &Draft) -> Result<(), ValidationFailure> {
    if non_blank(&draft.selected_title) {
        Ok(())
    } else {
        Err(ValidationFailure::MissingTitle)
    }
}

fn description_selected(draft: &Draft) -> Result<(), ValidationFailure> {
    if non_blank(&draft.selected_description) {
        Ok(())
    } else {
        Err(ValidationFailure::MissingDescription)
    }
}

fn slugs_present(draft: &Draft) -> Result<(), ValidationFailure> {
    if non_blank(&draft.slug) && non_blank(&draft.seo_slug) {
        Ok(())
    } else {
        Err(ValidationFailure::MissingSlugs)
    }
}

fn tags_present(draft: &Draft) -> Result<(), ValidationFailure> {
    let has_tag = draft.tags.iter().any(|t| non_blank(t));
    let has_keyword = draft.keywords.iter().any(|k| non_blank(k));
    if has_tag && has_keyword {
        Ok(())
    } else {
        Err(ValidationFailure::MissingTagsOrKeywords)
    }
}

fn outline_present(draft: &Draft) -> Result<(), ValidationFailure> {
    if draft.outline.is_empty() {
        Err(ValidationFailure::EmptyOutline)
    } else {
        Ok(())
    }
}

fn sections_written(draft: &Draft) -> Result<(), ValidationFailure> {
    outline_present(draft)?;
    let pending = draft.incomplete_sections();
    if pending.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailure::SectionsIncomplete { pending })
    }
}

fn faqs_ready(draft: &Draft) -> Result<(), ValidationFailure> {
    let have = draft
        .faqs
        .iter()
        .filter(|faq| non_blank(&faq.question) && non_blank(&faq.answer))
        .count();
    if have >= MIN_FAQS {
        Ok(())
    } else {
        Err(ValidationFailure::NotEnoughFaqs {
            have,
            need: MIN_FAQS,
        })
    }
}

fn ready_to_publish(draft: &Draft) -> Result<(), ValidationFailure> {
    EXIT_REQUIREMENTS[..Stage::Review.index()]
        .iter()
        .try_for_each(|requirement| requirement(draft))
}

/// 校验能否离开指定阶段
pub fn check_exit(stage: Stage, draft: &Draft) -> Result<(), ValidationFailure> {
    EXIT_REQUIREMENTS[stage.index()](draft)
}

/// 校验能否进入指定阶段：之前所有阶段的出口条件都必须满足
pub fn check_entry(stage: Stage, draft: &Draft) -> Result<(), ValidationFailure> {
    EXIT_REQUIREMENTS[..stage.index()]
        .iter()
        .try_for_each(|requirement| requirement(draft))
}

/// 草稿实际可以到达的最远阶段
pub fn furthest_reachable(draft: &Draft) -> Stage {
    Stage::ALL
        .iter()
        .copied()
        .take_while(|stage| check_entry(*stage, draft).is_ok())
        .last()
        .unwrap_or(Stage::Title)
}
