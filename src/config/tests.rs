#[cfg(test)]
mod tests {
    use crate::config::{
        AssetsConfig, CheckpointBackend, CheckpointConfig, CommitPolicy, Config, LLMConfig,
        LLMProvider, ServerConfig, StorageConfig,
    };
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn complete_storage() -> StorageConfig {
        StorageConfig {
            account_id: "acc".to_string(),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "bucket".to_string(),
            public_base_url: "https://pub.example.dev".to_string(),
            ..StorageConfig::default()
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
        assert!(!config.verbose);
        assert_eq!(config.checkpoint.backend, CheckpointBackend::Memory);
        assert_eq!(config.checkpoint.commit, CommitPolicy::OnSuccess);
    }

    #[test]
    fn test_llm_provider_default() {
        let provider = LLMProvider::default();
        assert_eq!(provider, LLMProvider::OpenAI);
    }

    #[test]
    fn test_llm_provider_from_str() {
        assert_eq!(
            "openai".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenAI
        );
        assert_eq!(
            "OpenRouter".parse::<LLMProvider>().unwrap(),
            LLMProvider::OpenRouter
        );
        assert_eq!(
            "anthropic".parse::<LLMProvider>().unwrap(),
            LLMProvider::Anthropic
        );
        assert_eq!(
            "deepseek".parse::<LLMProvider>().unwrap(),
            LLMProvider::DeepSeek
        );
        assert_eq!(
            "ollama".parse::<LLMProvider>().unwrap(),
            LLMProvider::Ollama
        );

        assert!("invalid".parse::<LLMProvider>().is_err());
    }

    #[test]
    fn test_llm_provider_display_roundtrip() {
        for provider in [
            LLMProvider::OpenAI,
            LLMProvider::OpenRouter,
            LLMProvider::Anthropic,
            LLMProvider::DeepSeek,
            LLMProvider::Ollama,
        ] {
            assert_eq!(provider.to_string().parse::<LLMProvider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_only_ollama_runs_without_api_key() {
        assert!(LLMProvider::OpenAI.requires_api_key());
        assert!(LLMProvider::Anthropic.requires_api_key());
        assert!(!LLMProvider::Ollama.requires_api_key());
    }

    #[test]
    fn test_llm_config_default() {
        let config = LLMConfig::default();

        assert_eq!(config.provider, LLMProvider::OpenAI);
        // api_key may be empty if env var is not set
        assert!(!config.api_base_url.is_empty());
        assert_eq!(config.model_efficient, "gpt-4o-mini");
        assert!(!config.model_powerful.is_empty());
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay_ms, 2000);
        assert_eq!(config.timeout_seconds, 300);
    }

    #[test]
    fn test_server_config_default_origins() {
        let config = ServerConfig::default();
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000", "http://localhost:4200"]
        );
    }

    #[test]
    fn test_storage_missing_fields_reports_every_gap() {
        let config = StorageConfig {
            account_id: String::new(),
            access_key_id: String::new(),
            secret_access_key: "  ".to_string(),
            bucket_name: String::new(),
            public_base_url: String::new(),
            ..StorageConfig::default()
        };

        assert_eq!(
            config.missing_fields(),
            vec![
                "account_id",
                "access_key_id",
                "secret_access_key",
                "bucket_name",
                "public_base_url"
            ]
        );
    }

    #[test]
    fn test_storage_complete_config_has_no_gaps() {
        assert!(complete_storage().missing_fields().is_empty());
    }

    #[test]
    fn test_storage_endpoint_defaults_to_r2() {
        let config = complete_storage();
        assert_eq!(
            config.resolved_endpoint(),
            "https://acc.r2.cloudflarestorage.com"
        );
        assert_eq!(config.region, "auto");
    }

    #[test]
    fn test_storage_endpoint_override_replaces_account_id() {
        let config = StorageConfig {
            account_id: String::new(),
            endpoint_url: Some("http://localhost:9000".to_string()),
            ..complete_storage()
        };

        assert!(config.missing_fields().is_empty());
        assert_eq!(config.resolved_endpoint(), "http://localhost:9000");
    }

    #[test]
    fn test_checkpoint_config_default() {
        let config = CheckpointConfig::default();
        assert_eq!(config.dir, PathBuf::from(".genui/checkpoints"));
        assert_eq!(config.max_sessions, 1000);
        assert_eq!(config.expire_hours, 24);
    }

    #[test]
    fn test_assets_paths() {
        let config = AssetsConfig {
            dir: PathBuf::from("/srv/assets"),
            ..AssetsConfig::default()
        };

        assert_eq!(
            config.dataset_path(),
            PathBuf::from("/srv/assets/mock_dataset.json")
        );
        assert_eq!(
            config.component_library_path(),
            PathBuf::from("/srv/assets/component_library.json")
        );
        assert_eq!(
            config.design_tokens_path(),
            PathBuf::from("/srv/assets/styles.css")
        );
    }

    #[test]
    fn test_from_file_partial_toml_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("genui.toml");

        let content = r#"
verbose = true

[server]
port = 9100

[llm]
provider = "anthropic"
api_key = "sk-test"
model_efficient = "claude-haiku"

[checkpoint]
backend = "file"
commit = "every_node"
"#;
        std::fs::write(&config_path, content).unwrap();

        let config = Config::from_file(&config_path).unwrap();

        assert!(config.verbose);
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.llm.provider, LLMProvider::Anthropic);
        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.model_efficient, "claude-haiku");
        assert_eq!(config.llm.retry_attempts, 3);
        assert_eq!(config.checkpoint.backend, CheckpointBackend::File);
        assert_eq!(config.checkpoint.commit, CommitPolicy::EveryNode);
    }

    #[test]
    fn test_sample_config_parses() {
        let sample = include_str!("../../genui.example.toml");
        let config: Config = toml::from_str(sample).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.storage.bucket_name, "genui-artifacts");
        assert_eq!(config.checkpoint.backend, CheckpointBackend::File);
        assert_eq!(config.assets.dataset_file, "mock_dataset.json");
    }

    #[test]
    fn test_from_file_missing_file() {
        let result = Config::from_file(&PathBuf::from("/nonexistent/genui.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("genui.toml");
        std::fs::write(&config_path, "[server\nport = ").unwrap();

        assert!(Config::from_file(&config_path).is_err());
    }
}
