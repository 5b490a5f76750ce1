use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::generator::pipeline::stage::Stage;

pub mod store;

pub use store::{DraftStore, FileDraftStore, MemoryDraftStore};

/// 持久化前 FAQ 的最少条数
pub const MIN_FAQS: usize = 3;

/// 单个章节的生成状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    #[default]
    Pending,
    Generating,
    Done,
    Failed,
}

impl std::fmt::Display for SectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionStatus::Pending => write!(f, "pending"),
            SectionStatus::Generating => write!(f, "generating"),
            SectionStatus::Done => write!(f, "done"),
            SectionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// 大纲中的一个章节，正文按章节逐个填充
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutlineSection {
    pub heading: String,
    #[serde(default)]
    pub subheadings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub status: SectionStatus,
}

impl OutlineSection {
    pub fn new(heading: impl Into<String>, subheadings: Vec<String>) -> Self {
        Self {
            heading: heading.into(),
            subheadings,
            content: None,
            status: SectionStatus::Pending,
        }
    }

    pub fn has_content(&self) -> bool {
        self.content
            .as_deref()
            .map(|c| !c.trim().is_empty())
            .unwrap_or(false)
    }

    /// 用于去重比较的标题
    pub fn heading_key(&self) -> String {
        normalize_heading(&self.heading)
    }
}

pub fn normalize_heading(heading: &str) -> String {
    heading
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

impl Faq {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// 贯穿整个流水线的草稿聚合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub current_stage: Stage,
    #[serde(default)]
    pub topic: String,
    /// 调研时附加的目的地限定
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default)]
    pub selected_title: String,
    #[serde(default)]
    pub selected_description: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub seo_slug: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub outline: Vec<OutlineSection>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}

impl Draft {
    pub fn new() -> Self {
        Self {
            current_stage: Stage::Title,
            topic: String::new(),
            destination: None,
            selected_title: String::new(),
            selected_description: String::new(),
            slug: String::new(),
            seo_slug: String::new(),
            tags: Vec::new(),
            keywords: Vec::new(),
            outline: Vec::new(),
            faqs: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.topic.trim().is_empty() && self.selected_title.trim().is_empty()
    }

    /// 尚未完成正文的章节序号
    pub fn incomplete_sections(&self) -> Vec<usize> {
        self.outline
            .iter()
            .enumerate()
            .filter(|(_, section)| !section.has_content())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn headings(&self) -> Vec<String> {
        self.outline.iter().map(|s| s.heading.clone()).collect()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// 替换大纲，标题相同的章节保留已生成的正文
    pub fn replace_outline(&mut self, outline: Vec<OutlineSection>) {
        let previous = std::mem::take(&mut self.outline);
        self.outline = outline
            .into_iter()
            .map(|mut section| {
                let key = section.heading_key();
                match previous
                    .iter()
                    .find(|old| old.heading_key() == key && old.has_content())
                {
                    Some(old) => {
                        section.content = old.content.clone();
                        section.status = SectionStatus::Done;
                    }
                    None => {
                        section.content = None;
                        section.status = SectionStatus::Pending;
                    }
                }
                section
            })
            .collect();
    }
}
