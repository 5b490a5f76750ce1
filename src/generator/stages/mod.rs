//! 各向导阶段的生成器

mod description;
mod faq;
mod outline;
mod section;
mod slug;
mod tags;
mod title;

pub use description::{DescriptionGenerator, DescriptionInput};
pub use faq::{FaqGenerator, FaqInput};
pub use outline::{OutlineGenerator, OutlineInput};
pub use section::{SectionGenerator, SectionInput};
pub use slug::{SlugCandidate, SlugGenerator, SlugInput, SlugPair, seo_slug_for, slugify};
pub use tags::{TagSet, TagsGenerator, TagsInput};
pub use title::{TitleGenerator, TitleInput};

/// prompt中的主题描述
fn topic_line(topic: &str, destination: Option<&str>) -> String {
    match destination {
        Some(destination) => format!("Topic: {}\nDestination: {}", topic.trim(), destination.trim()),
        None => format!("Topic: {}", topic.trim()),
    }
}
