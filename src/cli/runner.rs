//! 命令执行：交互式向导、自动模式与一次性命令

use anyhow::{Context, Result, bail};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::Command;
use crate::cli::commands::{HELP, WizardCommand, split_list};
use crate::config::Config;
use crate::draft::{DraftStore, Faq, FileDraftStore, OutlineSection};
use crate::error::{PipelineResult, ValidationFailure};
use crate::generator::context::GeneratorContext;
use crate::generator::outlet::{DiskPublisher, PersistenceGateway, PostId};
use crate::generator::pipeline::{
    DraftEdit, GenerationApplied, PipelineController, PipelineSession, Stage,
};
use crate::generator::stages::seo_slug_for;
use crate::seo::SeoReport;

/// 自动模式的参数
#[derive(Debug, Clone, PartialEq)]
pub struct AutoOptions {
    pub topic: String,
    pub destination_qualifier: Option<String>,
    pub category: String,
    pub destination: String,
}

/// 交互式向导，把命令转换为会话操作并返回要显示的文本
pub struct Wizard {
    session: PipelineSession,
    publisher: Arc<dyn PersistenceGateway>,
    site_domain: String,
}

impl Wizard {
    pub fn new(
        session: PipelineSession,
        publisher: Arc<dyn PersistenceGateway>,
        site_domain: impl Into<String>,
    ) -> Self {
        Self {
            session,
            publisher,
            site_domain: site_domain.into(),
        }
    }

    pub fn session(&self) -> &PipelineSession {
        &self.session
    }

    pub async fn handle(&self, command: WizardCommand) -> PipelineResult<Vec<String>> {
        let lines = match command {
            WizardCommand::Topic { topic, destination } => {
                self.session
                    .controller()
                    .await
                    .edit(DraftEdit::Topic { topic, destination })?;
                vec!["Topic saved. Type `gen` for title suggestions.".to_string()]
            }
            WizardCommand::Generate => {
                let applied = self.session.regenerate().await?;
                self.generation_reply(applied).await
            }
            WizardCommand::GenerateSection(index) => {
                let applied = self.session.generate_section(index).await?;
                match applied {
                    GenerationApplied::Applied => {
                        vec![format!("✅ Section {} written.", index + 1)]
                    }
                    GenerationApplied::Discarded => vec![discarded_message()],
                }
            }
            WizardCommand::GenerateAll => {
                let results = self.session.generate_all_sections().await;
                if results.is_empty() {
                    vec!["Nothing to generate.".to_string()]
                } else {
                    results
                        .into_iter()
                        .map(|(index, result)| match result {
                            Ok(_) => format!("✅ Section {} written.", index + 1),
                            Err(e) => format!(
                                "❌ Section {} failed: {} (retry with `gen {}`)",
                                index + 1,
                                e,
                                index + 1
                            ),
                        })
                        .collect()
                }
            }
            WizardCommand::Pick(index) => {
                self.session.controller().await.select(index)?;
                vec![format!("Accepted option {}. Type `next` to continue.", index + 1)]
            }
            WizardCommand::Set(value) => {
                let mut controller = self.session.controller().await;
                let edit = manual_edit(controller.stage(), &value)?;
                controller.edit(edit)?;
                vec!["Saved.".to_string()]
            }
            WizardCommand::AddSection {
                heading,
                subheadings,
            } => {
                self.session
                    .controller()
                    .await
                    .merge_custom_outline(vec![OutlineSection::new(heading, subheadings)])?;
                vec!["Section added to the outline.".to_string()]
            }
            WizardCommand::Next => {
                let stage = self.session.controller().await.advance()?;
                vec![format!("➡️  Now at {}.", stage)]
            }
            WizardCommand::Back(stage) => {
                self.session.controller().await.retreat(stage)?;
                vec![format!("⬅️  Back at {}. Accepted values are kept.", stage)]
            }
            WizardCommand::Show => describe(&*self.session.controller().await),
            WizardCommand::Score => {
                let report = self
                    .session
                    .controller()
                    .await
                    .seo_report(&self.site_domain)?;
                render_report(&report)
            }
            WizardCommand::Publish {
                category,
                destination,
            } => {
                let post_id = self
                    .session
                    .publish(self.publisher.as_ref(), &category, &destination)
                    .await?;
                vec![format!("🎉 Published as {}. The draft has been cleared.", post_id)]
            }
            WizardCommand::Discard => {
                self.session.controller().await.discard()?;
                vec!["Draft discarded.".to_string()]
            }
            WizardCommand::Help => HELP.lines().map(str::to_string).collect(),
            WizardCommand::Quit => Vec::new(),
        };
        Ok(lines)
    }

    async fn generation_reply(&self, applied: GenerationApplied) -> Vec<String> {
        match applied {
            GenerationApplied::Applied => {
                let controller = self.session.controller().await;
                candidate_lines(&controller, controller.stage())
            }
            GenerationApplied::Discarded => vec![discarded_message()],
        }
    }
}

fn discarded_message() -> String {
    "The result arrived after you moved on and was discarded.".to_string()
}

/// 把 `set` 的输入按当前阶段转换为编辑
fn manual_edit(stage: Stage, value: &str) -> Result<DraftEdit, ValidationFailure> {
    let value = value.trim();
    let edit = match stage {
        Stage::Title => DraftEdit::Title(value.to_string()),
        Stage::Description => DraftEdit::Description(value.to_string()),
        Stage::Slug => {
            let mut parts = value.split_whitespace();
            let slug = parts.next().unwrap_or_default().to_string();
            let seo_slug = parts
                .next()
                .map(str::to_string)
                .unwrap_or_else(|| seo_slug_for(&slug));
            DraftEdit::Slugs { slug, seo_slug }
        }
        Stage::Tags => {
            let (tags, keywords) = value.split_once('|').unwrap_or((value, ""));
            DraftEdit::Tags {
                tags: split_list(tags),
                keywords: split_list(keywords),
            }
        }
        Stage::Outline => DraftEdit::Outline(
            value
                .split('|')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(|h| OutlineSection::new(h, vec![]))
                .collect(),
        ),
        Stage::Content => {
            let (index, html) = value.split_once(char::is_whitespace).unwrap_or((value, ""));
            let index = index
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .ok_or(ValidationFailure::EmptyValue)?;
            DraftEdit::SectionContent {
                index,
                html: html.to_string(),
            }
        }
        Stage::Faqs => DraftEdit::Faqs(
            value
                .split('|')
                .filter_map(|pair| pair.split_once('='))
                .map(|(q, a)| Faq::new(q.trim(), a.trim()))
                .collect(),
        ),
        Stage::Review => return Err(ValidationFailure::NothingToGenerate(Stage::Review)),
    };
    Ok(edit)
}

fn candidate_lines(controller: &PipelineController, stage: Stage) -> Vec<String> {
    match controller.candidates(stage) {
        Some(candidates) => {
            let mut lines = vec![format!("Options for {}:", stage)];
            lines.extend(
                candidates
                    .display_lines()
                    .into_iter()
                    .enumerate()
                    .map(|(i, line)| format!("  [{}] {}", i + 1, line)),
            );
            lines.push("Type `pick <n>` to accept one, or `gen` for new options.".to_string());
            lines
        }
        None => Vec::new(),
    }
}

/// 草稿概览
pub fn describe(controller: &PipelineController) -> Vec<String> {
    let draft = controller.draft();
    let or_dash = |value: &str| {
        if value.trim().is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    };

    let mut lines = vec![
        format!("📍 Stage: {}", draft.current_stage),
        format!(
            "Topic: {}{}",
            or_dash(&draft.topic),
            draft
                .destination
                .as_deref()
                .map(|d| format!(" @ {}", d))
                .unwrap_or_default()
        ),
        format!("Title: {}", or_dash(&draft.selected_title)),
        format!("Description: {}", or_dash(&draft.selected_description)),
        format!("Slug: {} | SEO slug: {}", or_dash(&draft.slug), or_dash(&draft.seo_slug)),
        format!("Tags: {}", or_dash(&draft.tags.join(", "))),
        format!("Keywords: {}", or_dash(&draft.keywords.join(", "))),
    ];
    if !draft.outline.is_empty() {
        lines.push("Outline:".to_string());
        lines.extend(
            draft
                .outline
                .iter()
                .enumerate()
                .map(|(i, s)| format!("  {}. {} [{}]", i + 1, s.heading, s.status)),
        );
    }
    lines.push(format!("FAQs: {}", draft.faqs.len()));
    lines.extend(candidate_lines(controller, draft.current_stage));
    lines
}

fn render_report(report: &SeoReport) -> Vec<String> {
    let mut lines = vec![format!("📊 SEO score: {}/100", report.score)];
    lines.extend(report.messages().into_iter().map(|m| format!("  • {}", m)));
    lines
}

/// 从头自动跑完所有阶段，每一步采用第一个候选，最后发布
pub async fn run_auto(
    session: &PipelineSession,
    options: &AutoOptions,
    gateway: &dyn PersistenceGateway,
) -> PipelineResult<PostId> {
    session.controller().await.edit(DraftEdit::Topic {
        topic: options.topic.clone(),
        destination: options.destination_qualifier.clone(),
    })?;

    loop {
        let stage = session.controller().await.stage();
        tracing::info!(stage = %stage, "自动模式执行阶段");
        match stage {
            Stage::Review => break,
            Stage::Content => {
                for (_, result) in session.generate_all_sections().await {
                    result?;
                }
            }
            _ => {
                session.regenerate().await?;
                session.controller().await.select(0)?;
            }
        }
        session.controller().await.advance()?;
    }

    session
        .publish(gateway, &options.category, &options.destination)
        .await
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn open_controller(config: &Config) -> Result<PipelineController> {
    let store: Arc<dyn DraftStore> = Arc::new(FileDraftStore::new(&config.draft_path));
    PipelineController::open(store, config.target_language.clone()).with_context(|| {
        format!(
            "无法加载草稿 {:?}，可运行 `travelpen discard` 放弃它",
            config.draft_path
        )
    })
}

/// 执行一个子命令
pub async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Status => print_lines(&describe(&open_controller(&config)?)),
        Command::Score => {
            let report = open_controller(&config)?.seo_report(&config.site.domain)?;
            print_lines(&render_report(&report));
        }
        Command::Discard => {
            // 不解析草稿，损坏的草稿文件也能放弃
            FileDraftStore::new(&config.draft_path).clear()?;
            tracing::info!(path = ?config.draft_path, "草稿已放弃");
            println!("Draft discarded.");
        }
        Command::Wizard => {
            let controller = open_controller(&config)?;
            let site_domain = config.site.domain.clone();
            let publisher = Arc::new(DiskPublisher::new(&config.output_path));
            let context = GeneratorContext::new(config)?;
            let wizard = Wizard::new(PipelineSession::new(controller, context), publisher, site_domain);
            run_wizard(&wizard).await?;
        }
        Command::Auto {
            topic,
            destination_qualifier,
            category,
            destination,
        } => {
            let controller = open_controller(&config)?;
            if !controller.draft().is_blank() {
                bail!("an unfinished draft exists; publish it or run `travelpen discard` first");
            }
            let publisher = DiskPublisher::new(&config.output_path);
            let context = GeneratorContext::new(config)?;
            let session = PipelineSession::new(controller, context);
            let options = AutoOptions {
                topic,
                destination_qualifier,
                category,
                destination,
            };
            let post_id = run_auto(&session, &options, &publisher).await?;
            let stats = session.context().cache_manager.stats();
            tracing::info!(
                hits = stats.hits,
                misses = stats.misses,
                writes = stats.writes,
                "调研缓存统计"
            );
            println!(
                "🎉 Published as {} under {}",
                post_id,
                publisher.output_dir().display()
            );
        }
    }
    Ok(())
}

async fn run_wizard(wizard: &Wizard) -> Result<()> {
    print_lines(&describe(&*wizard.session().controller().await));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("travelpen> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<WizardCommand>() {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        if command == WizardCommand::Quit {
            break;
        }

        match wizard.handle(command).await {
            Ok(output) => print_lines(&output),
            Err(e) if e.is_retryable() => println!("❌ {} (type `gen` to retry)", e),
            Err(e) => println!("❌ {}", e),
        }
    }
    Ok(())
}
