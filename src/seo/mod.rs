//! SEO检查：对组装后的文档打分并给出改进建议，纯函数，无外部状态

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::generator::outlet::AssembledDocument;
use crate::utils::html::{find_tags, strip_tags};

pub const TITLE_LENGTH: RangeInclusive<usize> = 50..=60;
pub const DESCRIPTION_LENGTH: RangeInclusive<usize> = 150..=160;
pub const MIN_H2: usize = 5;
pub const MAX_SCORE: u32 = 100;

const TITLE_POINTS: u32 = 10;
const DESCRIPTION_POINTS: u32 = 10;
const SLUG_MATCH_POINTS: u32 = 5;
const POINTS_PER_H2: u32 = 5;
const H2_BONUS_POINTS: u32 = 10;
const IMAGE_ALT_POINTS: u32 = 10;
const KEYWORD_POINTS: u32 = 10;
const INTERNAL_LINK_POINTS: u32 = 5;
const EXTERNAL_LINK_POINTS: u32 = 5;

/// 打分所需的元数据
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeoMetadata {
    pub title: String,
    pub description: String,
    pub slug: String,
    pub seo_slug: String,
    pub keywords: Vec<String>,
    /// 站点自身域名，指向它的绝对链接不算外部链接
    pub site_domain: String,
}

impl SeoMetadata {
    pub fn from_document(document: &AssembledDocument, site_domain: &str) -> Self {
        let metadata = &document.metadata;
        Self {
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            slug: metadata.slug.clone(),
            seo_slug: metadata.seo_slug.clone(),
            keywords: metadata.keywords.clone(),
            site_domain: site_domain.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeoRule {
    TitleLength,
    DescriptionLength,
    HeadingCount,
    ImageAlt,
    KeywordPresence,
    MissingKeyword,
    InternalLink,
    ExternalLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub rule: SeoRule,
    pub message: String,
}

impl Recommendation {
    fn new(rule: SeoRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoReport {
    pub score: u32,
    pub recommendations: Vec<Recommendation>,
}

impl SeoReport {
    pub fn messages(&self) -> Vec<&str> {
        self.recommendations
            .iter()
            .map(|r| r.message.as_str())
            .collect()
    }

    pub fn has_rule(&self, rule: SeoRule) -> bool {
        self.recommendations.iter().any(|r| r.rule == rule)
    }
}

/// 逐条规则累计得分，总分封顶100；建议与得分独立，每条未满足的规则都会列出
pub fn score(document: &AssembledDocument, metadata: &SeoMetadata) -> SeoReport {
    let mut points = 0u32;
    let mut recommendations = Vec::new();

    let title_len = metadata.title.trim().chars().count();
    if TITLE_LENGTH.contains(&title_len) {
        points += TITLE_POINTS;
    } else {
        recommendations.push(Recommendation::new(
            SeoRule::TitleLength,
            format!(
                "Title is {} characters long; keep it between {} and {} characters",
                title_len,
                TITLE_LENGTH.start(),
                TITLE_LENGTH.end()
            ),
        ));
    }

    let description_len = metadata.description.trim().chars().count();
    if DESCRIPTION_LENGTH.contains(&description_len) {
        points += DESCRIPTION_POINTS;
    } else {
        recommendations.push(Recommendation::new(
            SeoRule::DescriptionLength,
            format!(
                "Meta description is {} characters long; keep it between {} and {} characters",
                description_len,
                DESCRIPTION_LENGTH.start(),
                DESCRIPTION_LENGTH.end()
            ),
        ));
    }

    // 不一致时不扣分也不提示
    if !metadata.slug.is_empty() && metadata.slug == metadata.seo_slug {
        points += SLUG_MATCH_POINTS;
    }

    let h2_count = find_tags(&document.html, "h2").len();
    points += POINTS_PER_H2 * h2_count as u32;
    if h2_count >= MIN_H2 {
        points += H2_BONUS_POINTS;
    } else {
        recommendations.push(Recommendation::new(
            SeoRule::HeadingCount,
            format!("Add at least {} H2 tags (found {})", MIN_H2, h2_count),
        ));
    }

    let images = find_tags(&document.html, "img");
    let missing_alt = images
        .iter()
        .filter(|img| img.attr("alt").map(|alt| alt.trim().is_empty()).unwrap_or(true))
        .count();
    if images.is_empty() {
        recommendations.push(Recommendation::new(
            SeoRule::ImageAlt,
            "Add at least one image with descriptive alt text",
        ));
    } else if missing_alt > 0 {
        recommendations.push(Recommendation::new(
            SeoRule::ImageAlt,
            format!(
                "Add alt text to {} of {} images",
                missing_alt,
                images.len()
            ),
        ));
    } else {
        points += IMAGE_ALT_POINTS;
    }

    let text = strip_tags(&document.html).to_lowercase();
    let keywords: Vec<&str> = metadata
        .keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    let missing: Vec<&str> = keywords
        .iter()
        .copied()
        .filter(|k| !text.contains(&k.to_lowercase()))
        .collect();
    if !keywords.is_empty() && missing.len() < keywords.len() {
        points += KEYWORD_POINTS;
    } else {
        recommendations.push(Recommendation::new(
            SeoRule::KeywordPresence,
            "Use at least one of your target keywords in the content",
        ));
    }
    for keyword in missing {
        recommendations.push(Recommendation::new(
            SeoRule::MissingKeyword,
            format!("Keyword \"{}\" does not appear in the content", keyword),
        ));
    }

    let hrefs: Vec<String> = find_tags(&document.html, "a")
        .iter()
        .filter_map(|a| a.attr("href"))
        .map(|href| href.trim().to_string())
        .collect();

    if hrefs.iter().any(|href| is_internal(href)) {
        points += INTERNAL_LINK_POINTS;
    } else {
        recommendations.push(Recommendation::new(
            SeoRule::InternalLink,
            "Add at least one internal link to another page on your site",
        ));
    }

    if hrefs
        .iter()
        .any(|href| is_external(href, &metadata.site_domain))
    {
        points += EXTERNAL_LINK_POINTS;
    } else {
        recommendations.push(Recommendation::new(
            SeoRule::ExternalLink,
            "Add at least one external link to an authoritative source",
        ));
    }

    SeoReport {
        score: points.min(MAX_SCORE),
        recommendations,
    }
}

fn is_internal(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}

fn is_external(href: &str, site_domain: &str) -> bool {
    if !href.to_ascii_lowercase().starts_with("http") {
        return false;
    }
    match (host_of(href), normalize_domain(site_domain)) {
        (Some(host), Some(site)) => host != site && !host.ends_with(&format!(".{}", site)),
        (Some(_), None) => true,
        (None, _) => false,
    }
}

fn host_of(href: &str) -> Option<String> {
    let (_, rest) = href.split_once("://")?;
    let host = rest
        .split(['/', '?', '#'])
        .next()?
        .rsplit('@')
        .next()?
        .split(':')
        .next()?;
    normalize_domain(host)
}

fn normalize_domain(domain: &str) -> Option<String> {
    let domain = domain.trim().to_ascii_lowercase();
    let domain = domain.strip_prefix("www.").unwrap_or(&domain).to_string();
    if domain.is_empty() { None } else { Some(domain) }
}
