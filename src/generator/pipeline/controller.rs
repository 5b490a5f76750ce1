use std::collections::HashSet;
use std::sync::Arc;

use crate::draft::{Draft, DraftStore, Faq, OutlineSection, SectionStatus, normalize_heading};
use crate::error::{PipelineError, PipelineResult, ValidationFailure};
use crate::generator::outlet::{AssembledDocument, DocumentAssembler, PostId, PublishRequest};
use crate::generator::pipeline::stage::{
    GenerationTarget, Stage, check_exit, furthest_reachable,
};
use crate::generator::types::{StageCandidates, StageOutput, StageRequest};
use crate::i18n::TargetLanguage;
use crate::memory::Memory;
use crate::seo::{SeoMetadata, SeoReport};

/// 候选结果在会话内存中的作用域
pub const CANDIDATE_SCOPE: &str = "candidates";

/// 一次进行中的生成，完成时凭票据回写结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket {
    pub target: GenerationTarget,
    pub epoch: u64,
}

/// 生成结果的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationApplied {
    Applied,
    /// 结果返回时用户已经离开该阶段，结果被丢弃
    Discarded,
}

/// 用户手动输入的字段值
#[derive(Debug, Clone, PartialEq)]
pub enum DraftEdit {
    Topic {
        topic: String,
        destination: Option<String>,
    },
    Title(String),
    Description(String),
    Slugs {
        slug: String,
        seo_slug: String,
    },
    Tags {
        tags: Vec<String>,
        keywords: Vec<String>,
    },
    Outline(Vec<OutlineSection>),
    SectionContent {
        index: usize,
        html: String,
    },
    Faqs(Vec<Faq>),
}

impl DraftEdit {
    fn stage(&self) -> Stage {
        match self {
            DraftEdit::Topic { .. } | DraftEdit::Title(_) => Stage::Title,
            DraftEdit::Description(_) => Stage::Description,
            DraftEdit::Slugs { .. } => Stage::Slug,
            DraftEdit::Tags { .. } => Stage::Tags,
            DraftEdit::Outline(_) => Stage::Outline,
            DraftEdit::SectionContent { .. } => Stage::Content,
            DraftEdit::Faqs(_) => Stage::Faqs,
        }
    }
}

fn required(value: &str) -> Result<String, ValidationFailure> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationFailure::EmptyValue)
    } else {
        Ok(value.to_string())
    }
}

fn required_list(values: &[String]) -> Result<Vec<String>, ValidationFailure> {
    let list: Vec<String> = values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if list.is_empty() {
        Err(ValidationFailure::EmptyValue)
    } else {
        Ok(list)
    }
}

/// 向导状态机
///
/// 独占一个会话的草稿，每次修改后都写入 [`DraftStore`]。本身不做任何外部调用，
/// 生成通过 `begin_generation` / `complete_generation` 两步完成。
pub struct PipelineController {
    draft: Draft,
    store: Arc<dyn DraftStore>,
    candidates: Memory,
    in_flight: HashSet<GenerationTarget>,
    epoch: u64,
    language: TargetLanguage,
}

impl PipelineController {
    /// 打开会话，存储中有草稿时恢复
    pub fn open(store: Arc<dyn DraftStore>, language: TargetLanguage) -> PipelineResult<Self> {
        let loaded = store.load().map_err(PipelineError::Store)?;
        let mut controller = Self {
            draft: Draft::new(),
            store,
            candidates: Memory::new(),
            in_flight: HashSet::new(),
            epoch: 0,
            language,
        };

        if let Some(draft) = loaded {
            controller.draft = draft;
            if controller.normalize_resumed() {
                controller.persist()?;
            }
            tracing::info!(stage = %controller.draft.current_stage, "已恢复草稿");
        }
        Ok(controller)
    }

    /// 恢复的草稿可能停在依赖不满足的阶段或带着中断的生成状态
    fn normalize_resumed(&mut self) -> bool {
        let mut changed = false;

        let reachable = furthest_reachable(&self.draft);
        if self.draft.current_stage > reachable {
            tracing::warn!(
                saved = %self.draft.current_stage,
                reachable = %reachable,
                "草稿阶段超出依赖允许的范围，已回退"
            );
            self.draft.current_stage = reachable;
            changed = true;
        }

        for section in &mut self.draft.outline {
            if section.status == SectionStatus::Generating {
                section.status = if section.has_content() {
                    SectionStatus::Done
                } else {
                    SectionStatus::Pending
                };
                changed = true;
            }
        }
        changed
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn stage(&self) -> Stage {
        self.draft.current_stage
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn language(&self) -> &TargetLanguage {
        &self.language
    }

    /// 指定阶段当前的候选结果
    pub fn candidates(&self, stage: Stage) -> Option<StageCandidates> {
        self.candidates.get(CANDIDATE_SCOPE, stage.key())
    }

    pub fn is_in_flight(&self, target: &GenerationTarget) -> bool {
        self.in_flight.contains(target)
    }

    fn persist(&mut self) -> PipelineResult<()> {
        self.draft.touch();
        self.store.save(&self.draft).map_err(PipelineError::Store)
    }

    fn ensure_stage(&self, expected: Stage) -> Result<(), ValidationFailure> {
        if self.draft.current_stage == expected {
            Ok(())
        } else {
            Err(ValidationFailure::WrongStage {
                expected,
                current: self.draft.current_stage,
            })
        }
    }

    fn navigate(&mut self, stage: Stage) -> PipelineResult<()> {
        let from = self.draft.current_stage;
        self.draft.current_stage = stage;
        self.epoch += 1;
        self.persist()?;
        tracing::info!(from = %from, to = %stage, "切换阶段");
        Ok(())
    }

    /// 设置主题，只能在第一个阶段
    pub fn start(&mut self, topic: &str, destination: Option<String>) -> PipelineResult<()> {
        self.ensure_stage(Stage::Title)?;
        let topic = required(topic)?;
        self.draft.topic = topic;
        self.draft.destination = destination
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.persist()
    }

    /// 前进到下一阶段，当前阶段的出口条件不满足时拒绝
    pub fn advance(&mut self) -> PipelineResult<Stage> {
        let current = self.draft.current_stage;
        check_exit(current, &self.draft)?;
        let next = current.next().ok_or(ValidationFailure::NoNextStage)?;
        self.navigate(next)?;
        Ok(next)
    }

    /// 回退到更早的阶段，已填写的下游字段全部保留
    pub fn retreat(&mut self, target: Stage) -> PipelineResult<()> {
        let current = self.draft.current_stage;
        if target >= current {
            return Err(ValidationFailure::InvalidRetreat { current, target }.into());
        }
        self.navigate(target)
    }

    /// 登记一次生成，返回票据和生成请求
    pub fn begin_generation(
        &mut self,
        target: GenerationTarget,
    ) -> PipelineResult<(GenerationTicket, StageRequest)> {
        self.ensure_stage(target.stage)?;
        if self.in_flight.contains(&target) {
            return Err(ValidationFailure::AlreadyInFlight(target).into());
        }

        let request = StageRequest::from_draft(target, &self.draft)?;

        if let Some(index) = target.section {
            if let Some(section) = self.draft.outline.get_mut(index) {
                section.status = SectionStatus::Generating;
            }
            self.persist()?;
        }

        self.in_flight.insert(target);
        tracing::debug!(target = %target, epoch = self.epoch, "登记生成请求");
        Ok((
            GenerationTicket {
                target,
                epoch: self.epoch,
            },
            request,
        ))
    }

    fn is_stale(&self, ticket: &GenerationTicket) -> bool {
        ticket.epoch != self.epoch || ticket.target.stage != self.draft.current_stage
    }

    /// 回写生成结果；票据过期时丢弃结果
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: PipelineResult<StageOutput>,
    ) -> PipelineResult<GenerationApplied> {
        self.in_flight.remove(&ticket.target);

        if self.is_stale(&ticket) {
            tracing::info!(
                event = "stale_response_discarded",
                target = %ticket.target,
                ticket_epoch = ticket.epoch,
                epoch = self.epoch,
                "生成结果已过期，丢弃"
            );
            if let Some(index) = ticket.target.section {
                if let Some(section) = self.draft.outline.get_mut(index) {
                    if section.status == SectionStatus::Generating {
                        section.status = if section.has_content() {
                            SectionStatus::Done
                        } else {
                            SectionStatus::Pending
                        };
                        self.persist()?;
                    }
                }
            }
            return Ok(GenerationApplied::Discarded);
        }

        match result {
            Ok(StageOutput::Candidates(candidates)) => {
                let stage = candidates.stage();
                self.candidates
                    .store(CANDIDATE_SCOPE, stage.key(), &candidates)
                    .map_err(PipelineError::Store)?;
                tracing::info!(stage = %stage, count = candidates.len(), "候选结果已更新");
                Ok(GenerationApplied::Applied)
            }
            Ok(StageOutput::SectionContent { index, html }) => {
                let len = self.draft.outline.len();
                let section = self
                    .draft
                    .outline
                    .get_mut(index)
                    .ok_or(ValidationFailure::SectionOutOfRange { index, len })?;
                section.content = Some(html);
                section.status = SectionStatus::Done;
                self.persist()?;
                Ok(GenerationApplied::Applied)
            }
            Err(e) => {
                if let Some(index) = ticket.target.section {
                    if let Some(section) = self.draft.outline.get_mut(index) {
                        section.status = SectionStatus::Failed;
                    }
                    self.persist()?;
                }
                Err(e)
            }
        }
    }

    /// 采用当前阶段的某个候选
    pub fn select(&mut self, index: usize) -> PipelineResult<()> {
        let stage = self.draft.current_stage;
        let candidates = self
            .candidates(stage)
            .ok_or(ValidationFailure::NoCandidates(stage))?;
        let len = candidates.len();
        if index >= len {
            return Err(ValidationFailure::CandidateOutOfRange { index, len }.into());
        }

        match candidates {
            StageCandidates::Titles(mut items) => self.draft.selected_title = items.swap_remove(index),
            StageCandidates::Descriptions(mut items) => {
                self.draft.selected_description = items.swap_remove(index)
            }
            StageCandidates::Slugs(candidate) => {
                self.draft.slug = candidate.pair.slug;
                self.draft.seo_slug = candidate.pair.seo_slug;
            }
            StageCandidates::Tags(set) => {
                self.draft.tags = set.tags;
                self.draft.keywords = set.keywords;
            }
            StageCandidates::Outline(sections) => self.draft.replace_outline(sections),
            StageCandidates::Faqs(faqs) => self.draft.faqs = faqs,
        }
        tracing::debug!(stage = %stage, index, "已采用候选");
        self.persist()
    }

    /// 手动填写当前阶段的字段
    pub fn edit(&mut self, edit: DraftEdit) -> PipelineResult<()> {
        self.ensure_stage(edit.stage())?;
        match edit {
            DraftEdit::Topic { topic, destination } => {
                return self.start(&topic, destination);
            }
            DraftEdit::Title(title) => self.draft.selected_title = required(&title)?,
            DraftEdit::Description(description) => {
                self.draft.selected_description = required(&description)?
            }
            DraftEdit::Slugs { slug, seo_slug } => {
                let slug = required(&slug)?;
                let seo_slug = required(&seo_slug)?;
                self.draft.slug = slug;
                self.draft.seo_slug = seo_slug;
            }
            DraftEdit::Tags { tags, keywords } => {
                let tags = required_list(&tags)?;
                let keywords = required_list(&keywords)?;
                self.draft.tags = tags;
                self.draft.keywords = keywords;
            }
            DraftEdit::Outline(sections) => {
                if sections.is_empty() || sections.iter().any(|s| s.heading.trim().is_empty()) {
                    return Err(ValidationFailure::EmptyValue.into());
                }
                let duplicates = duplicate_headings(&[], &sections);
                if !duplicates.is_empty() {
                    return Err(ValidationFailure::DuplicateHeadings(duplicates).into());
                }
                self.draft.replace_outline(sections);
            }
            DraftEdit::SectionContent { index, html } => {
                let target = GenerationTarget::section(index);
                if self.in_flight.contains(&target) {
                    return Err(ValidationFailure::AlreadyInFlight(target).into());
                }
                let html = required(&html)?;
                let len = self.draft.outline.len();
                let section = self
                    .draft
                    .outline
                    .get_mut(index)
                    .ok_or(ValidationFailure::SectionOutOfRange { index, len })?;
                section.content = Some(html);
                section.status = SectionStatus::Done;
            }
            DraftEdit::Faqs(faqs) => {
                let faqs: Vec<Faq> = faqs
                    .into_iter()
                    .map(|f| Faq::new(f.question.trim(), f.answer.trim()))
                    .filter(|f| !f.question.is_empty() && !f.answer.is_empty())
                    .collect();
                if faqs.is_empty() {
                    return Err(ValidationFailure::EmptyValue.into());
                }
                self.draft.faqs = faqs;
            }
        }
        self.persist()
    }

    /// 把用户自定义的章节追加到大纲末尾，标题重复时整体拒绝
    pub fn merge_custom_outline(&mut self, custom: Vec<OutlineSection>) -> PipelineResult<()> {
        self.ensure_stage(Stage::Outline)?;
        if custom.is_empty() || custom.iter().any(|s| s.heading.trim().is_empty()) {
            return Err(ValidationFailure::EmptyValue.into());
        }

        let duplicates = duplicate_headings(&self.draft.outline, &custom);
        if !duplicates.is_empty() {
            return Err(ValidationFailure::DuplicateHeadings(duplicates).into());
        }

        self.draft.outline.extend(custom.into_iter().map(|section| {
            OutlineSection::new(section.heading.trim(), section.subheadings)
        }));
        self.persist()
    }

    /// 放弃草稿，回到第一个阶段
    pub fn discard(&mut self) -> PipelineResult<()> {
        self.reset();
        self.store.clear().map_err(PipelineError::Store)?;
        tracing::info!("草稿已放弃");
        Ok(())
    }

    fn reset(&mut self) {
        self.draft = Draft::new();
        self.candidates.clear_scope(CANDIDATE_SCOPE);
        self.in_flight.clear();
        self.epoch += 1;
    }

    pub fn assemble(&self) -> PipelineResult<AssembledDocument> {
        Ok(DocumentAssembler::new(self.language.clone()).assemble(&self.draft)?)
    }

    /// 对当前草稿做SEO检查
    pub fn seo_report(&self, site_domain: &str) -> PipelineResult<SeoReport> {
        let document = self.assemble()?;
        let metadata = SeoMetadata::from_document(&document, site_domain);
        Ok(crate::seo::score(&document, &metadata))
    }

    /// 构建发布请求，只能在审阅阶段
    pub fn prepare_publication(
        &self,
        category_id: &str,
        destination_id: &str,
    ) -> PipelineResult<PublishRequest> {
        self.ensure_stage(Stage::Review)?;
        check_exit(Stage::Review, &self.draft)?;
        let document = self.assemble()?;
        Ok(PublishRequest::new(document, category_id, destination_id))
    }

    /// 发布成功后清空草稿
    pub fn finish_publication(&mut self, post_id: &PostId) -> PipelineResult<()> {
        tracing::info!(post_id = %post_id, slug = %self.draft.slug, "发布成功");
        self.reset();
        self.store.clear().map_err(PipelineError::Store)
    }
}

/// 与已有章节或彼此之间重复的标题
fn duplicate_headings(existing: &[OutlineSection], custom: &[OutlineSection]) -> Vec<String> {
    let mut seen: HashSet<String> = existing.iter().map(|s| s.heading_key()).collect();
    custom
        .iter()
        .filter(|section| !seen.insert(normalize_heading(&section.heading)))
        .map(|section| section.heading.trim().to_string())
        .collect()
}
