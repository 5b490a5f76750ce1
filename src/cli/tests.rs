#[cfg(test)]
mod tests {
    use crate::cli::{Args, Command, Wizard, WizardCommand, run};
    use crate::config::LLMProvider;
    use crate::draft::MemoryDraftStore;
    use crate::generator::context::GeneratorContext;
    use crate::generator::outlet::DiskPublisher;
    use crate::generator::pipeline::{PipelineController, PipelineSession, Stage};
    use crate::i18n::TargetLanguage;
    use crate::test_harness::{ScriptedGenerationProvider, StaticResearchProvider, test_config};
    use clap::Parser;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_args_default_values() {
        let args = Args::try_parse_from(["travelpen"]).unwrap();

        assert_eq!(args.command(), Command::Wizard);
        assert!(args.config.is_none());
        assert!(args.draft_path.is_none());
        assert!(!args.verbose);
        assert!(!args.no_cache);
    }

    #[test]
    fn test_args_global_options_after_subcommand() {
        let args = Args::try_parse_from([
            "travelpen",
            "status",
            "--draft-path",
            "/tmp/draft.json",
            "-o",
            "/tmp/posts",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.command(), Command::Status);
        assert_eq!(args.draft_path, Some(PathBuf::from("/tmp/draft.json")));
        assert_eq!(args.output_path, Some(PathBuf::from("/tmp/posts")));
        assert!(args.verbose);
    }

    #[test]
    fn test_args_auto_command() {
        let args = Args::try_parse_from([
            "travelpen",
            "auto",
            "--topic",
            "Kyoto in autumn",
            "--destination-qualifier",
            "Japan",
            "--category",
            "cat-1",
            "--destination",
            "dest-9",
        ])
        .unwrap();

        assert_eq!(
            args.command(),
            Command::Auto {
                topic: "Kyoto in autumn".to_string(),
                destination_qualifier: Some("Japan".to_string()),
                category: "cat-1".to_string(),
                destination: "dest-9".to_string(),
            }
        );
    }

    #[test]
    fn test_args_auto_requires_relations() {
        assert!(Args::try_parse_from(["travelpen", "auto", "--topic", "Kyoto"]).is_err());
    }

    #[test]
    fn test_into_config_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("travelpen.toml");
        std::fs::write(
            &config_path,
            "[llm]\nmodel = \"from-file\"\n[site]\ndomain = \"file.blog\"\n",
        )
        .unwrap();

        let args = Args::try_parse_from([
            "travelpen",
            "--config",
            config_path.to_str().unwrap(),
            "--llm-provider",
            "deepseek",
            "--model",
            "deepseek-chat",
            "--llm-api-key",
            "test-key",
            "--target-language",
            "fr",
            "--site-domain",
            "wanderlust.blog",
            "--no-cache",
        ])
        .unwrap();
        let config = args.into_config().unwrap();

        assert_eq!(config.llm.provider, LLMProvider::DeepSeek);
        assert_eq!(config.llm.model, "deepseek-chat");
        assert_eq!(config.llm.api_key, "test-key");
        assert_eq!(config.target_language, TargetLanguage::French);
        assert_eq!(config.site.domain, "wanderlust.blog");
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_into_config_rejects_unknown_provider_and_missing_file() {
        let args = Args::try_parse_from(["travelpen", "--llm-provider", "gemini"]).unwrap();
        assert!(args.into_config().is_err());

        let args =
            Args::try_parse_from(["travelpen", "--config", "/nonexistent/travelpen.toml"]).unwrap();
        assert!(args.into_config().is_err());
    }

    #[test]
    fn test_parse_wizard_commands() {
        let parse = |line: &str| line.parse::<WizardCommand>();

        assert_eq!(
            parse("topic Kyoto in autumn @ Japan").unwrap(),
            WizardCommand::Topic {
                topic: "Kyoto in autumn".to_string(),
                destination: Some("Japan".to_string()),
            }
        );
        assert_eq!(
            parse("topic Lisbon trams").unwrap(),
            WizardCommand::Topic {
                topic: "Lisbon trams".to_string(),
                destination: None,
            }
        );
        assert_eq!(parse("gen").unwrap(), WizardCommand::Generate);
        assert_eq!(parse("gen all").unwrap(), WizardCommand::GenerateAll);
        assert_eq!(parse("gen 2").unwrap(), WizardCommand::GenerateSection(1));
        assert_eq!(parse(" PICK 1 ").unwrap(), WizardCommand::Pick(0));
        assert_eq!(parse("next").unwrap(), WizardCommand::Next);
        assert_eq!(parse("back slug").unwrap(), WizardCommand::Back(Stage::Slug));
        assert_eq!(parse("back 5").unwrap(), WizardCommand::Back(Stage::Outline));
        assert_eq!(
            parse("publish cat-1 dest-2").unwrap(),
            WizardCommand::Publish {
                category: "cat-1".to_string(),
                destination: "dest-2".to_string(),
            }
        );
        assert_eq!(
            parse("add Day Trips; Nara, Uji").unwrap(),
            WizardCommand::AddSection {
                heading: "Day Trips".to_string(),
                subheadings: vec!["Nara".to_string(), "Uji".to_string()],
            }
        );
        assert_eq!(parse("quit").unwrap(), WizardCommand::Quit);
    }

    #[test]
    fn test_parse_wizard_command_errors() {
        for line in ["", "topic", "pick 0", "pick x", "back 9", "publish only-one", "dance"] {
            assert!(line.parse::<WizardCommand>().is_err(), "{:?}", line);
        }
    }

    fn create_test_wizard(temp_dir: &TempDir, provider: Arc<ScriptedGenerationProvider>) -> Wizard {
        let config = test_config(temp_dir.path());
        let publisher = Arc::new(DiskPublisher::new(&config.output_path));
        let context = GeneratorContext::with_providers(
            config,
            provider,
            Arc::new(StaticResearchProvider::default()),
        );
        let controller = PipelineController::open(
            Arc::new(MemoryDraftStore::new()),
            TargetLanguage::English,
        )
        .unwrap();
        Wizard::new(
            PipelineSession::new(controller, context),
            publisher,
            "wanderlust.blog",
        )
    }

    #[tokio::test]
    async fn test_wizard_title_flow() {
        let temp_dir = TempDir::new().unwrap();
        let provider = Arc::new(ScriptedGenerationProvider::new());
        provider.push("title", "- Kyoto in Autumn\n- Maple Season in Kyoto");
        let wizard = create_test_wizard(&temp_dir, provider);

        wizard
            .handle("topic Kyoto in autumn".parse().unwrap())
            .await
            .unwrap();
        let lines = wizard.handle(WizardCommand::Generate).await.unwrap();
        assert!(lines.iter().any(|l| l.contains("[2] Maple Season in Kyoto")));

        assert!(wizard.handle(WizardCommand::Next).await.is_err());
        wizard.handle(WizardCommand::Pick(1)).await.unwrap();
        wizard.handle(WizardCommand::Next).await.unwrap();

        let show = wizard.handle(WizardCommand::Show).await.unwrap();
        assert!(show.iter().any(|l| l.contains("Description(2)")));
        assert!(show.iter().any(|l| l == "Title: Maple Season in Kyoto"));
    }

    #[tokio::test]
    async fn test_wizard_manual_slug_entry() {
        let temp_dir = TempDir::new().unwrap();
        let wizard = create_test_wizard(&temp_dir, Arc::new(ScriptedGenerationProvider::new()));

        wizard
            .handle(WizardCommand::Set("   ".to_string()))
            .await
            .unwrap_err();
        wizard
            .handle("topic Tokyo ramen".parse().unwrap())
            .await
            .unwrap();
        wizard
            .handle(WizardCommand::Set("Tokyo Ramen Crawl".to_string()))
            .await
            .unwrap();
        wizard.handle(WizardCommand::Next).await.unwrap();
        wizard
            .handle(WizardCommand::Set("A night of ramen in Tokyo.".to_string()))
            .await
            .unwrap();
        wizard.handle(WizardCommand::Next).await.unwrap();
        wizard
            .handle(WizardCommand::Set("tokyo-ramen".to_string()))
            .await
            .unwrap();

        let controller = wizard.session().controller().await;
        assert_eq!(controller.draft().slug, "tokyo-ramen");
        assert_eq!(controller.draft().seo_slug, "tokyo-ramen-travel-guide");
    }

    #[tokio::test]
    async fn test_discard_removes_corrupt_draft() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        std::fs::write(&config.draft_path, "{not json").unwrap();

        let err = run(Command::Status, config.clone()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("travelpen discard"));
        assert!(config.draft_path.exists());

        run(Command::Discard, config.clone()).await.unwrap();
        assert!(!config.draft_path.exists());

        // 没有草稿时放弃也成功
        run(Command::Discard, config).await.unwrap();
    }
}
