#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use crate::config::{CheckpointBackend, LLMProvider};
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_args_default_values() {
        let args = Args::try_parse_from(["genui-rs"]).unwrap();

        assert!(args.config.is_none());
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(!args.verbose);
        assert!(args.assets_dir.is_none());
        assert!(args.checkpoint_dir.is_none());
    }

    #[test]
    fn test_args_short_options() {
        let args = Args::try_parse_from(["genui-rs", "-p", "9000", "-v"]).unwrap();

        assert_eq!(args.port, Some(9000));
        assert!(args.verbose);
    }

    #[test]
    fn test_args_llm_options() {
        let args = Args::try_parse_from([
            "genui-rs",
            "--llm-provider",
            "deepseek",
            "--llm-api-key",
            "test-key",
            "--llm-api-base-url",
            "https://api.deepseek.com",
            "--model-efficient",
            "deepseek-chat",
            "--model-powerful",
            "deepseek-reasoner",
        ])
        .unwrap();

        assert_eq!(args.llm_provider, Some("deepseek".to_string()));
        assert_eq!(args.llm_api_key, Some("test-key".to_string()));
        assert_eq!(
            args.llm_api_base_url,
            Some("https://api.deepseek.com".to_string())
        );
        assert_eq!(args.model_efficient, Some("deepseek-chat".to_string()));
        assert_eq!(args.model_powerful, Some("deepseek-reasoner".to_string()));
    }

    #[test]
    fn test_args_invalid_port() {
        assert!(Args::try_parse_from(["genui-rs", "--port", "not-a-port"]).is_err());
    }

    #[test]
    fn test_into_config_applies_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        std::fs::write(&config_path, "[server]\nport = 7000\n").unwrap();

        let args = Args::try_parse_from([
            "genui-rs",
            "--config",
            config_path.to_str().unwrap(),
            "--host",
            "0.0.0.0",
            "--llm-provider",
            "ollama",
            "--llm-api-key",
            "k",
            "--assets-dir",
            "/srv/assets",
            "--checkpoint-dir",
            "/tmp/ckpt",
            "--verbose",
        ])
        .unwrap();

        let config = args.into_config().unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.llm.provider, LLMProvider::Ollama);
        assert_eq!(config.llm.api_key, "k");
        assert_eq!(config.assets.dir, PathBuf::from("/srv/assets"));
        assert_eq!(config.checkpoint.dir, PathBuf::from("/tmp/ckpt"));
        assert_eq!(config.checkpoint.backend, CheckpointBackend::File);
        assert!(config.verbose);
    }

    #[test]
    fn test_into_config_unknown_provider_keeps_default() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.toml");
        std::fs::write(&config_path, "").unwrap();

        let args = Args::try_parse_from([
            "genui-rs",
            "--config",
            config_path.to_str().unwrap(),
            "--llm-provider",
            "mistral",
        ])
        .unwrap();

        let config = args.into_config().unwrap();
        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
    }

    #[test]
    fn test_into_config_missing_explicit_file_is_error() {
        let args =
            Args::try_parse_from(["genui-rs", "--config", "/nonexistent/genui.toml"]).unwrap();

        assert!(args.into_config().is_err());
    }
}
