//! 文档组装：把草稿投影为一份HTML正文和元数据

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::draft::{Draft, Faq};
use crate::error::ValidationFailure;
use crate::i18n::TargetLanguage;
use crate::utils::html::escape;

pub mod publisher;

pub use publisher::{DiskPublisher, PersistenceGateway, PostId, PostStatus, PublishRequest};

/// 组装后的文档，只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledDocument {
    pub html: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub seo_slug: String,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub faqs: Vec<Faq>,
    /// schema.org FAQPage 结构化数据
    pub faq_schema: Value,
}

/// 文档组装器
pub struct DocumentAssembler {
    language: TargetLanguage,
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new(TargetLanguage::default())
    }
}

impl DocumentAssembler {
    pub fn new(language: TargetLanguage) -> Self {
        Self { language }
    }

    /// 按大纲顺序拼接各章节，最后追加FAQ区块
    pub fn assemble(&self, draft: &Draft) -> Result<AssembledDocument, ValidationFailure> {
        let pending = draft.incomplete_sections();
        if !pending.is_empty() {
            return Err(ValidationFailure::SectionsIncomplete { pending });
        }

        let mut html = String::new();
        for section in &draft.outline {
            html.push_str(&format!("<h2>{}</h2>\n", escape(section.heading.trim())));
            html.push_str(section.content.as_deref().unwrap_or_default().trim());
            html.push('\n');
        }
        if !draft.faqs.is_empty() {
            html.push_str(&self.render_faqs(&draft.faqs));
        }

        Ok(AssembledDocument {
            html,
            metadata: DocumentMetadata {
                title: draft.selected_title.clone(),
                description: draft.selected_description.clone(),
                slug: draft.slug.clone(),
                seo_slug: draft.seo_slug.clone(),
                tags: draft.tags.clone(),
                keywords: draft.keywords.clone(),
                faqs: draft.faqs.clone(),
                faq_schema: faq_schema(&draft.faqs),
            },
        })
    }

    fn render_faqs(&self, faqs: &[Faq]) -> String {
        let mut block = String::from(
            "<section class=\"faq\" itemscope itemtype=\"https://schema.org/FAQPage\">\n",
        );
        block.push_str(&format!("<h2>{}</h2>\n", escape(self.language.faq_heading())));
        for faq in faqs {
            block.push_str(
                "<div itemscope itemprop=\"mainEntity\" itemtype=\"https://schema.org/Question\">\n",
            );
            block.push_str(&format!(
                "<h3 itemprop=\"name\">{}</h3>\n",
                escape(faq.question.trim())
            ));
            block.push_str(
                "<div itemscope itemprop=\"acceptedAnswer\" itemtype=\"https://schema.org/Answer\">\n",
            );
            block.push_str(&format!(
                "<p itemprop=\"text\">{}</p>\n",
                escape(faq.answer.trim())
            ));
            block.push_str("</div>\n</div>\n");
        }
        block.push_str("</section>\n");
        block
    }
}

/// 使用默认语言组装
pub fn assemble(draft: &Draft) -> Result<AssembledDocument, ValidationFailure> {
    DocumentAssembler::default().assemble(draft)
}

fn faq_schema(faqs: &[Faq]) -> Value {
    let entities: Vec<Value> = faqs
        .iter()
        .map(|faq| {
            json!({
                "@type": "Question",
                "name": faq.question.trim(),
                "acceptedAnswer": {
                    "@type": "Answer",
                    "text": faq.answer.trim(),
                },
            })
        })
        .collect();
    json!({
        "@context": "https://schema.org",
        "@type": "FAQPage",
        "mainEntity": entities,
    })
}
