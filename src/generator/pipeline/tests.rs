#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::draft::{Draft, DraftStore, Faq, MemoryDraftStore, OutlineSection, SectionStatus};
    use crate::error::{PersistenceFailure, PipelineError, ProviderError, ValidationFailure};
    use crate::generator::context::GeneratorContext;
    use crate::generator::outlet::DiskPublisher;
    use crate::generator::pipeline::{
        DraftEdit, GenerationApplied, GenerationTarget, PipelineController, PipelineSession, Stage,
    };
    use crate::generator::types::StageCandidates;
    use crate::i18n::TargetLanguage;
    use crate::test_harness::{
        FailingResearchProvider, GatedGenerationProvider, ScriptedGenerationProvider,
        StaticResearchProvider, test_config,
    };

    const OUTLINE_JSON: &str = r#"{"outline": [
        {"h2": "When to Visit", "h3": ["Peak foliage"]},
        {"h2": "Where to Stay", "h3": []},
        {"h2": "What to Eat", "h3": ["Kaiseki"]}
    ]}"#;

    fn create_test_session(
        temp_dir: &TempDir,
        store: Arc<MemoryDraftStore>,
        provider: Arc<ScriptedGenerationProvider>,
    ) -> PipelineSession {
        let context = GeneratorContext::with_providers(
            test_config(temp_dir.path()),
            provider,
            Arc::new(StaticResearchProvider::with_snippet(
                "Kyoto is best in November.",
                "Tofuku-ji is crowded at peak foliage.",
            )),
        );
        let controller = PipelineController::open(store, TargetLanguage::English).unwrap();
        PipelineSession::new(controller, context)
    }

    /// 停在正文阶段、三个章节都待生成的草稿
    fn draft_at_content() -> Draft {
        let mut draft = Draft::new();
        draft.current_stage = Stage::Content;
        draft.topic = "Kyoto in autumn".to_string();
        draft.selected_title = "Kyoto in Autumn: Temples, Maples and Quiet Gardens".to_string();
        draft.selected_description = "Plan an autumn trip to Kyoto.".to_string();
        draft.slug = "kyoto-in-autumn".to_string();
        draft.seo_slug = "kyoto-in-autumn-travel-guide".to_string();
        draft.tags = vec!["japan".to_string()];
        draft.keywords = vec!["kyoto autumn".to_string()];
        draft.outline = vec![
            OutlineSection::new("When to Visit", vec![]),
            OutlineSection::new("Where to Stay", vec![]),
            OutlineSection::new("What to Eat", vec![]),
        ];
        draft
    }

    fn draft_at_review() -> Draft {
        let mut draft = draft_at_content();
        draft.current_stage = Stage::Review;
        for section in &mut draft.outline {
            section.content = Some(format!("<p>About {}.</p>", section.heading));
            section.status = SectionStatus::Done;
        }
        draft.faqs = vec![
            Faq::new("Is it crowded?", "Yes, on weekends."),
            Faq::new("Do I need a rail pass?", "Not for Kyoto alone."),
            Faq::new("When do leaves peak?", "Late November."),
        ];
        draft
    }

    fn validation(err: PipelineError) -> ValidationFailure {
        match err {
            PipelineError::Validation(failure) => failure,
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_title_stage_requires_selection_before_advance() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryDraftStore::new());
        let provider = Arc::new(ScriptedGenerationProvider::new());
        provider.push("title", "1. Kyoto in Autumn\n2. Maple Season in Kyoto\n3. Kyoto's Quiet Temples");
        let session = create_test_session(&temp_dir, store.clone(), provider.clone());

        session
            .controller()
            .await
            .start("Kyoto in autumn", Some("Japan".to_string()))
            .unwrap();

        let err = session.controller().await.advance().unwrap_err();
        assert_eq!(validation(err), ValidationFailure::MissingTitle);

        assert_eq!(session.regenerate().await.unwrap(), GenerationApplied::Applied);
        let mut controller = session.controller().await;
        match controller.candidates(Stage::Title) {
            Some(StageCandidates::Titles(titles)) => assert_eq!(titles.len(), 3),
            other => panic!("unexpected candidates {:?}", other),
        }

        controller.select(1).unwrap();
        assert_eq!(controller.draft().selected_title, "Maple Season in Kyoto");
        assert_eq!(controller.advance().unwrap(), Stage::Description);
        assert_eq!(
            store.snapshot().unwrap().current_stage,
            Stage::Description
        );
        assert_eq!(provider.call_count("title"), 1);
    }

    #[tokio::test]
    async fn test_start_rejects_blank_topic_and_generation_needs_topic() {
        let temp_dir = TempDir::new().unwrap();
        let session = create_test_session(
            &temp_dir,
            Arc::new(MemoryDraftStore::new()),
            Arc::new(ScriptedGenerationProvider::new()),
        );

        let err = session.controller().await.start("   ", None).unwrap_err();
        assert_eq!(validation(err), ValidationFailure::EmptyValue);

        let err = session.regenerate().await.unwrap_err();
        assert_eq!(validation(err), ValidationFailure::MissingTopic);
        assert!(!session
            .controller()
            .await
            .is_in_flight(&GenerationTarget::stage(Stage::Title)));
    }

    #[tokio::test]
    async fn test_retreat_keeps_downstream_fields() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryDraftStore::with_draft(draft_at_review()));
        let session = create_test_session(
            &temp_dir,
            store.clone(),
            Arc::new(ScriptedGenerationProvider::new()),
        );

        let mut controller = session.controller().await;
        controller.retreat(Stage::Description).unwrap();
        assert_eq!(controller.stage(), Stage::Description);
        assert_eq!(controller.draft().slug, "kyoto-in-autumn");
        assert_eq!(controller.draft().faqs.len(), 3);
        assert!(controller.draft().incomplete_sections().is_empty());

        let err = controller.retreat(Stage::Slug).unwrap_err();
        assert_eq!(
            validation(err),
            ValidationFailure::InvalidRetreat {
                current: Stage::Description,
                target: Stage::Slug
            }
        );

        assert_eq!(controller.advance().unwrap(), Stage::Slug);
    }

    #[tokio::test]
    async fn test_advance_from_review_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let session = create_test_session(
            &temp_dir,
            Arc::new(MemoryDraftStore::with_draft(draft_at_review())),
            Arc::new(ScriptedGenerationProvider::new()),
        );

        let err = session.controller().await.advance().unwrap_err();
        assert_eq!(validation(err), ValidationFailure::NoNextStage);
    }

    #[tokio::test]
    async fn test_regenerate_replaces_only_current_stage_candidates() {
        let temp_dir = TempDir::new().unwrap();
        let mut draft = draft_at_content();
        draft.current_stage = Stage::Tags;
        draft.tags.clear();
        draft.keywords.clear();
        draft.outline.clear();
        let provider = Arc::new(ScriptedGenerationProvider::new());
        provider
            .push("tags", r##"{"tags": ["#japan", "autumn"], "keywords": ["kyoto autumn"]}"##)
            .push("tags", r#"{"tags": ["temples"], "keywords": ["kyoto maple season"]}"#);
        let session = create_test_session(
            &temp_dir,
            Arc::new(MemoryDraftStore::with_draft(draft)),
            provider.clone(),
        );

        session.regenerate().await.unwrap();
        {
            let controller = session.controller().await;
            match controller.candidates(Stage::Tags) {
                Some(StageCandidates::Tags(set)) => {
                    assert_eq!(set.tags, vec!["japan", "autumn"]);
                }
                other => panic!("unexpected candidates {:?}", other),
            }
            assert!(controller.draft().tags.is_empty());
        }

        session.regenerate().await.unwrap();
        let mut controller = session.controller().await;
        controller.select(0).unwrap();
        assert_eq!(controller.draft().tags, vec!["temples"]);
        assert_eq!(controller.draft().keywords, vec!["kyoto maple season"]);
        assert!(controller.candidates(Stage::Title).is_none());

        let err = controller.select(3).unwrap_err();
        assert_eq!(
            validation(err),
            ValidationFailure::CandidateOutOfRange { index: 3, len: 1 }
        );
    }

    #[tokio::test]
    async fn test_outline_selection_and_custom_merge() {
        let temp_dir = TempDir::new().unwrap();
        let mut draft = draft_at_content();
        draft.current_stage = Stage::Outline;
        draft.outline.clear();
        let provider = Arc::new(ScriptedGenerationProvider::new());
        provider.push("outline", OUTLINE_JSON);
        let session = create_test_session(
            &temp_dir,
            Arc::new(MemoryDraftStore::with_draft(draft)),
            provider.clone(),
        );

        session.regenerate().await.unwrap();
        let prompt = provider.requests()[0].user_text();
        assert!(prompt.contains("Tofuku-ji is crowded at peak foliage."));

        let mut controller = session.controller().await;
        controller.select(0).unwrap();
        assert_eq!(controller.draft().outline.len(), 3);

        let err = controller
            .merge_custom_outline(vec![
                OutlineSection::new("Day Trips", vec![]),
                OutlineSection::new("where to  STAY", vec![]),
            ])
            .unwrap_err();
        assert_eq!(
            validation(err),
            ValidationFailure::DuplicateHeadings(vec!["where to  STAY".to_string()])
        );
        assert_eq!(controller.draft().outline.len(), 3);

        controller
            .merge_custom_outline(vec![OutlineSection::new(" Day Trips ", vec![])])
            .unwrap();
        let headings = controller.draft().headings();
        assert_eq!(headings.last().map(String::as_str), Some("Day Trips"));
        assert_eq!(controller.draft().outline[3].status, SectionStatus::Pending);
    }

    #[tokio::test]
    async fn test_failed_section_blocks_advance_until_regenerated() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryDraftStore::with_draft(draft_at_content()));
        let provider = Arc::new(ScriptedGenerationProvider::new());
        provider
            .push("section", "<h2>When to Visit</h2><p>November is best.</p>")
            .push_error("section", ProviderError::Timeout(60))
            .push("section", "<p>Try yudofu near Nanzen-ji.</p>")
            .push("section", "<p>Ryokan in Gion.</p>");
        let session = create_test_session(&temp_dir, store.clone(), provider.clone());

        let results = session.generate_all_sections().await;
        assert_eq!(results.len(), 3);
        assert!(results[0].1.is_ok());
        assert!(matches!(
            results[1].1,
            Err(PipelineError::Generation {
                stage: Stage::Content,
                ..
            })
        ));
        assert!(results[2].1.is_ok());

        {
            let mut controller = session.controller().await;
            let outline = &controller.draft().outline;
            assert_eq!(outline[0].content.as_deref(), Some("<p>November is best.</p>"));
            assert_eq!(outline[1].status, SectionStatus::Failed);
            assert_eq!(outline[2].status, SectionStatus::Done);

            let err = controller.advance().unwrap_err();
            assert_eq!(
                validation(err),
                ValidationFailure::SectionsIncomplete { pending: vec![1] }
            );
        }

        assert_eq!(
            store.snapshot().unwrap().outline[1].status,
            SectionStatus::Failed
        );

        session.generate_section(1).await.unwrap();
        let mut controller = session.controller().await;
        assert_eq!(controller.draft().outline[1].status, SectionStatus::Done);
        assert_eq!(controller.advance().unwrap(), Stage::Faqs);
        assert_eq!(provider.call_count("section"), 4);
    }

    #[tokio::test]
    async fn test_slug_fallback_when_model_returns_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let mut draft = draft_at_content();
        draft.current_stage = Stage::Slug;
        draft.selected_title = "Tokyo Food Guide".to_string();
        draft.slug.clear();
        draft.seo_slug.clear();
        let provider = Arc::new(ScriptedGenerationProvider::new());
        provider.push("slug", "Sure! Here is your slug: tokyo food");
        let session = create_test_session(
            &temp_dir,
            Arc::new(MemoryDraftStore::with_draft(draft)),
            provider,
        );

        assert_eq!(session.regenerate().await.unwrap(), GenerationApplied::Applied);
        let mut controller = session.controller().await;
        match controller.candidates(Stage::Slug) {
            Some(StageCandidates::Slugs(candidate)) => assert!(candidate.fallback_applied),
            other => panic!("unexpected candidates {:?}", other),
        }
        controller.select(0).unwrap();
        assert_eq!(controller.draft().slug, "tokyo-food-guide");
        assert_eq!(controller.draft().seo_slug, "tokyo-food-guide-travel-guide");
        assert_eq!(controller.advance().unwrap(), Stage::Tags);
    }

    #[tokio::test]
    async fn test_slug_fallback_when_provider_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut draft = draft_at_content();
        draft.current_stage = Stage::Slug;
        let provider = Arc::new(ScriptedGenerationProvider::new());
        provider.push_error(
            "slug",
            ProviderError::Status {
                status: 500,
                body: "boom".to_string(),
            },
        );
        let session = create_test_session(
            &temp_dir,
            Arc::new(MemoryDraftStore::with_draft(draft)),
            provider,
        );

        session.regenerate().await.unwrap();
        let controller = session.controller().await;
        assert!(matches!(
            controller.candidates(Stage::Slug),
            Some(StageCandidates::Slugs(candidate)) if candidate.fallback_applied
        ));
    }

    #[tokio::test]
    async fn test_failed_stage_generation_keeps_previous_candidates() {
        let temp_dir = TempDir::new().unwrap();
        let provider = Arc::new(ScriptedGenerationProvider::new());
        provider
            .push("title", "Kyoto in Autumn")
            .push_error("title", ProviderError::Timeout(60));
        let session = create_test_session(&temp_dir, Arc::new(MemoryDraftStore::new()), provider);
        session.controller().await.start("Kyoto", None).unwrap();

        session.regenerate().await.unwrap();
        let err = session.regenerate().await.unwrap_err();
        assert!(err.is_retryable());

        let controller = session.controller().await;
        assert_eq!(
            controller.candidates(Stage::Title),
            Some(StageCandidates::Titles(vec!["Kyoto in Autumn".to_string()]))
        );
        assert!(!controller.is_in_flight(&GenerationTarget::stage(Stage::Title)));
    }

    #[tokio::test]
    async fn test_response_after_navigation_is_discarded() {
        let temp_dir = TempDir::new().unwrap();
        let gated = Arc::new(GatedGenerationProvider::new());
        gated
            .script()
            .push("description", "A late description that nobody asked for anymore.");
        let mut draft = draft_at_content();
        draft.current_stage = Stage::Description;
        draft.selected_description.clear();
        let context = GeneratorContext::with_providers(
            test_config(temp_dir.path()),
            gated.clone(),
            Arc::new(StaticResearchProvider::default()),
        );
        let controller = PipelineController::open(
            Arc::new(MemoryDraftStore::with_draft(draft)),
            TargetLanguage::English,
        )
        .unwrap();
        let session = PipelineSession::new(controller, context);

        let background = session.clone();
        let handle = tokio::spawn(async move { background.regenerate().await });
        gated.wait_started().await;

        {
            let mut controller = session.controller().await;
            assert!(controller.is_in_flight(&GenerationTarget::stage(Stage::Description)));
            controller.retreat(Stage::Title).unwrap();
        }
        gated.release();

        let applied = handle.await.unwrap().unwrap();
        assert_eq!(applied, GenerationApplied::Discarded);
        let controller = session.controller().await;
        assert_eq!(controller.stage(), Stage::Title);
        assert!(controller.candidates(Stage::Description).is_none());
        assert!(controller.draft().selected_description.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_in_flight_request_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let gated = Arc::new(GatedGenerationProvider::new());
        gated.script().push("section", "<p>Ryokan in Gion.</p>");
        let context = GeneratorContext::with_providers(
            test_config(temp_dir.path()),
            gated.clone(),
            Arc::new(StaticResearchProvider::default()),
        );
        let controller = PipelineController::open(
            Arc::new(MemoryDraftStore::with_draft(draft_at_content())),
            TargetLanguage::English,
        )
        .unwrap();
        let session = PipelineSession::new(controller, context);

        let background = session.clone();
        let handle = tokio::spawn(async move { background.generate_section(1).await });
        gated.wait_started().await;

        let err = session.generate_section(1).await.unwrap_err();
        assert_eq!(
            validation(err),
            ValidationFailure::AlreadyInFlight(GenerationTarget::section(1))
        );
        assert_eq!(
            session.controller().await.draft().outline[1].status,
            SectionStatus::Generating
        );

        gated.release();
        assert_eq!(handle.await.unwrap().unwrap(), GenerationApplied::Applied);
        let controller = session.controller().await;
        assert_eq!(controller.draft().outline[1].status, SectionStatus::Done);
        assert_eq!(gated.script().call_count("section"), 1);
    }

    #[tokio::test]
    async fn test_manual_content_rejected_while_section_generates() {
        let temp_dir = TempDir::new().unwrap();
        let gated = Arc::new(GatedGenerationProvider::new());
        gated.script().push("section", "<p>AI text</p>");
        let context = GeneratorContext::with_providers(
            test_config(temp_dir.path()),
            gated.clone(),
            Arc::new(StaticResearchProvider::default()),
        );
        let controller = PipelineController::open(
            Arc::new(MemoryDraftStore::with_draft(draft_at_content())),
            TargetLanguage::English,
        )
        .unwrap();
        let session = PipelineSession::new(controller, context);

        let background = session.clone();
        let handle = tokio::spawn(async move { background.generate_section(0).await });
        gated.wait_started().await;

        let err = session
            .controller()
            .await
            .edit(DraftEdit::SectionContent {
                index: 0,
                html: "<p>my manual text</p>".to_string(),
            })
            .unwrap_err();
        assert_eq!(
            validation(err),
            ValidationFailure::AlreadyInFlight(GenerationTarget::section(0))
        );

        gated.release();
        assert_eq!(handle.await.unwrap().unwrap(), GenerationApplied::Applied);

        // 生成结束后手动编辑照常生效
        let mut controller = session.controller().await;
        assert_eq!(
            controller.draft().outline[0].content.as_deref(),
            Some("<p>AI text</p>")
        );
        controller
            .edit(DraftEdit::SectionContent {
                index: 0,
                html: "<p>my manual text</p>".to_string(),
            })
            .unwrap();
        assert_eq!(
            controller.draft().outline[0].content.as_deref(),
            Some("<p>my manual text</p>")
        );
    }

    fn create_failing_research_session(
        temp_dir: &TempDir,
        draft: Draft,
        provider: Arc<ScriptedGenerationProvider>,
    ) -> PipelineSession {
        let context = GeneratorContext::with_providers(
            test_config(temp_dir.path()),
            provider,
            Arc::new(FailingResearchProvider),
        );
        let controller = PipelineController::open(
            Arc::new(MemoryDraftStore::with_draft(draft)),
            TargetLanguage::English,
        )
        .unwrap();
        PipelineSession::new(controller, context)
    }

    #[tokio::test]
    async fn test_research_failure_marks_section_failed() {
        let temp_dir = TempDir::new().unwrap();
        let provider = Arc::new(ScriptedGenerationProvider::new());
        provider.push("section", "<p>Never used.</p>");
        let mut draft = draft_at_content();
        draft.outline[1].content = Some("<p>Machiya stays.</p>".to_string());
        draft.outline[1].status = SectionStatus::Done;
        let session = create_failing_research_session(&temp_dir, draft.clone(), provider.clone());

        let err = session.generate_section(0).await.unwrap_err();
        assert!(matches!(err, PipelineError::Research(ProviderError::Status { status: 502, .. })));
        assert!(err.is_retryable());
        assert_eq!(provider.call_count("section"), 0);

        let controller = session.controller().await;
        let outline = &controller.draft().outline;
        assert_eq!(outline[0].status, SectionStatus::Failed);
        assert!(outline[0].content.is_none());
        assert_eq!(outline[1], draft.outline[1]);
        assert_eq!(outline[2], draft.outline[2]);
        assert_eq!(controller.draft().selected_title, draft.selected_title);
        assert_eq!(controller.stage(), Stage::Content);
    }

    #[tokio::test]
    async fn test_research_failure_leaves_outline_and_faqs_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let provider = Arc::new(ScriptedGenerationProvider::new());
        provider.push("outline", OUTLINE_JSON).push("faqs", "[]");

        let mut draft = draft_at_content();
        draft.current_stage = Stage::Outline;
        let session = create_failing_research_session(&temp_dir, draft.clone(), provider.clone());
        let err = session.regenerate().await.unwrap_err();
        assert!(matches!(err, PipelineError::Research(_)));
        assert!(err.is_retryable());
        {
            let controller = session.controller().await;
            assert!(controller.candidates(Stage::Outline).is_none());
            assert_eq!(controller.draft(), &draft);
        }

        let mut draft = draft_at_review();
        draft.current_stage = Stage::Faqs;
        let session = create_failing_research_session(&temp_dir, draft.clone(), provider.clone());
        let err = session.regenerate().await.unwrap_err();
        assert!(matches!(err, PipelineError::Research(_)));
        assert!(err.is_retryable());
        assert_eq!(session.controller().await.draft(), &draft);

        assert_eq!(provider.call_count("outline"), 0);
        assert_eq!(provider.call_count("faqs"), 0);
    }

    #[tokio::test]
    async fn test_generation_for_other_stage_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let session = create_test_session(
            &temp_dir,
            Arc::new(MemoryDraftStore::with_draft(draft_at_review())),
            Arc::new(ScriptedGenerationProvider::new()),
        );

        let err = session.generate_section(0).await.unwrap_err();
        assert_eq!(
            validation(err),
            ValidationFailure::WrongStage {
                expected: Stage::Content,
                current: Stage::Review
            }
        );
        assert!(session.generate_all_sections().await.is_empty());

        let err = session.regenerate().await.unwrap_err();
        assert_eq!(
            validation(err),
            ValidationFailure::NothingToGenerate(Stage::Review)
        );
    }

    #[tokio::test]
    async fn test_resume_clamps_stage_and_resets_interrupted_sections() {
        let mut draft = draft_at_content();
        draft.current_stage = Stage::Review;
        draft.outline[0].content = Some("<p>Done.</p>".to_string());
        draft.outline[0].status = SectionStatus::Generating;
        draft.outline[1].status = SectionStatus::Generating;
        let store = Arc::new(MemoryDraftStore::with_draft(draft));

        let controller = PipelineController::open(store.clone(), TargetLanguage::English).unwrap();
        assert_eq!(controller.stage(), Stage::Content);
        assert_eq!(controller.draft().outline[0].status, SectionStatus::Done);
        assert_eq!(controller.draft().outline[1].status, SectionStatus::Pending);

        let saved = store.snapshot().unwrap();
        assert_eq!(saved.current_stage, Stage::Content);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_publish_failure_keeps_draft() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryDraftStore::with_draft(draft_at_review()));
        let session = create_test_session(
            &temp_dir,
            store.clone(),
            Arc::new(ScriptedGenerationProvider::new()),
        );
        let publisher = DiskPublisher::new(temp_dir.path().join("posts"));

        let err = session.publish(&publisher, "", "dest-kyoto").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Persistence(PersistenceFailure::MissingCategory)
        ));
        assert_eq!(session.controller().await.stage(), Stage::Review);
        assert!(store.snapshot().is_some());

        let post_id = session
            .publish(&publisher, "cat-travel", "dest-kyoto")
            .await
            .unwrap();
        let record = publisher.load("kyoto-in-autumn").await.unwrap().unwrap();
        assert_eq!(record.id, post_id);
        assert!(store.snapshot().is_none());

        let controller = session.controller().await;
        assert_eq!(controller.stage(), Stage::Title);
        assert!(controller.draft().is_blank());
    }

    #[tokio::test]
    async fn test_publish_requires_review_stage() {
        let temp_dir = TempDir::new().unwrap();
        let session = create_test_session(
            &temp_dir,
            Arc::new(MemoryDraftStore::with_draft(draft_at_content())),
            Arc::new(ScriptedGenerationProvider::new()),
        );
        let publisher = DiskPublisher::new(temp_dir.path().join("posts"));

        let err = session.publish(&publisher, "c", "d").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Validation(ValidationFailure::WrongStage { .. })
        ));
        assert!(!publisher.output_dir().exists());
    }

    #[tokio::test]
    async fn test_discard_resets_everything() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryDraftStore::with_draft(draft_at_review()));
        let session = create_test_session(
            &temp_dir,
            store.clone(),
            Arc::new(ScriptedGenerationProvider::new()),
        );

        let mut controller = session.controller().await;
        let epoch = controller.epoch();
        controller.discard().unwrap();
        assert_eq!(controller.stage(), Stage::Title);
        assert!(controller.draft().is_blank());
        assert!(controller.epoch() > epoch);
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_manual_edits_are_validated() {

        let temp_dir = TempDir::new().unwrap();
        let mut draft = draft_at_content();
        draft.current_stage = Stage::Faqs;
        let session = create_test_session(
            &temp_dir,
            Arc::new(MemoryDraftStore::with_draft(draft)),
            Arc::new(ScriptedGenerationProvider::new()),
        );
        let mut controller = session.controller().await;

        let err = controller
            .edit(DraftEdit::Title("New title".to_string()))
            .unwrap_err();
        assert!(matches!(
            validation(err),
            ValidationFailure::WrongStage { .. }
        ));

        let err = controller
            .edit(DraftEdit::Faqs(vec![Faq::new(" ", "answer")]))
            .unwrap_err();
        assert_eq!(validation(err), ValidationFailure::EmptyValue);

        controller
            .edit(DraftEdit::Faqs(vec![
                Faq::new("Q1", "A1"),
                Faq::new("Q2", "A2"),
            ]))
            .unwrap();
        let err = controller.advance().unwrap_err();
        assert_eq!(
            validation(err),
            ValidationFailure::NotEnoughFaqs { have: 2, need: 3 }
        );
    }
}
