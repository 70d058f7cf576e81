use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "ollama")]
    Ollama,
}

impl LLMProvider {
    /// 该Provider是否需要API KEY
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LLMProvider::Ollama)
    }
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// HTTP服务配置
    pub server: ServerConfig,

    /// LLM模型配置
    pub llm: LLMConfig,

    /// 对象存储配置
    pub storage: StorageConfig,

    /// 会话检查点配置
    pub checkpoint: CheckpointConfig,

    /// 静态参考数据配置
    pub assets: AssetsConfig,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// HTTP服务配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// 允许跨域访问的前端地址
    pub cors_origins: Vec<String>,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 高能效模型，优先用于常规生成任务
    pub model_efficient: String,

    /// 高质量模型，用于长prompt，以及作为efficient失效情况下的兜底
    pub model_powerful: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 温度
    pub temperature: f64,

    /// 重试次数
    pub retry_attempts: u32,

    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,
}

/// 对象存储配置（S3兼容，默认指向Cloudflare R2）
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub account_id: String,

    pub access_key_id: String,

    pub secret_access_key: String,

    pub bucket_name: String,

    /// 用于拼接返回链接的公开访问地址
    pub public_base_url: String,

    /// 自定义S3兼容端点，为空时使用R2端点
    pub endpoint_url: Option<String>,

    pub region: String,

    /// 单个对象上传的重试次数
    pub retry_attempts: u32,

    /// 重试间隔（毫秒）
    pub retry_delay_ms: u64,
}

/// 检查点存储后端
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointBackend {
    #[default]
    Memory,
    File,
}

/// 检查点提交策略
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// 整个工作流成功结束后一次性提交
    #[default]
    OnSuccess,
    /// 每个节点完成后立即提交
    EveryNode,
}

/// 会话检查点配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CheckpointConfig {
    pub backend: CheckpointBackend,

    /// file后端使用的目录
    pub dir: PathBuf,

    pub commit: CommitPolicy,

    /// memory后端最多保留的会话快照数
    pub max_sessions: usize,

    /// memory后端快照过期时间（小时）
    pub expire_hours: u64,
}

/// 静态参考数据配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AssetsConfig {
    pub dir: PathBuf,

    /// 默认数据集（JSON）
    pub dataset_file: String,

    /// UI组件描述目录（JSON）
    pub component_library_file: String,

    /// 设计系统CSS
    pub design_tokens_file: String,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// HTTP服务监听地址
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl StorageConfig {
    /// 列出缺失的必填项，返回空列表表示配置完整
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.account_id.trim().is_empty() && self.endpoint_url.is_none() {
            missing.push("account_id");
        }
        if self.access_key_id.trim().is_empty() {
            missing.push("access_key_id");
        }
        if self.secret_access_key.trim().is_empty() {
            missing.push("secret_access_key");
        }
        if self.bucket_name.trim().is_empty() {
            missing.push("bucket_name");
        }
        if self.public_base_url.trim().is_empty() {
            missing.push("public_base_url");
        }
        missing
    }

    /// 实际使用的S3端点
    pub fn resolved_endpoint(&self) -> String {
        match &self.endpoint_url {
            Some(url) => url.clone(),
            None => format!("https://{}.r2.cloudflarestorage.com", self.account_id),
        }
    }
}

impl AssetsConfig {
    pub fn dataset_path(&self) -> PathBuf {
        self.dir.join(&self.dataset_file)
    }

    pub fn component_library_path(&self) -> PathBuf {
        self.dir.join(&self.component_library_file)
    }

    pub fn design_tokens_path(&self) -> PathBuf {
        self.dir.join(&self.design_tokens_file)
    }
}

fn env_or_default(key: &str) -> String {
    std::env::var(key).unwrap_or_default()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 8000,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:4200".to_string(),
            ],
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        let api_key = std::env::var("GENUI_LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .unwrap_or_default();
        Self {
            provider: LLMProvider::default(),
            api_key,
            api_base_url: String::from("https://api.openai.com/v1"),
            model_efficient: String::from("gpt-4o-mini"),
            model_powerful: String::from("gpt-4o"),
            max_tokens: 16384,
            temperature: 0.2,
            retry_attempts: 3,
            retry_delay_ms: 2000,
            timeout_seconds: 300,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            account_id: env_or_default("CLOUDFLARE_ACCOUNT_ID"),
            access_key_id: env_or_default("CLOUDFLARE_R2_ACCESS_KEY_ID"),
            secret_access_key: env_or_default("CLOUDFLARE_R2_SECRET_ACCESS_KEY"),
            bucket_name: env_or_default("CLOUDFLARE_R2_BUCKET_NAME"),
            public_base_url: env_or_default("CLOUDFLARE_R2_PUBLIC_URL"),
            endpoint_url: None,
            region: String::from("auto"),
            retry_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            backend: CheckpointBackend::default(),
            dir: PathBuf::from(".genui/checkpoints"),
            commit: CommitPolicy::default(),
            max_sessions: 1000,
            expire_hours: 24,
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            dataset_file: String::from("mock_dataset.json"),
            component_library_file: String::from("component_library.json"),
            design_tokens_file: String::from("styles.css"),
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
