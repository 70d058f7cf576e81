//! 静态参考数据：默认数据集、UI组件描述目录、设计系统CSS

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

use crate::config::AssetsConfig;

#[derive(Debug, Clone)]
pub struct StaticAssets {
    /// 请求未附带数据时使用的数据集
    pub dataset: Value,
    /// UI组件描述目录
    pub component_library: Value,
    /// 设计系统CSS
    pub design_tokens: String,
}

impl Default for StaticAssets {
    fn default() -> Self {
        Self {
            dataset: Value::Array(Vec::new()),
            component_library: Value::Array(Vec::new()),
            design_tokens: String::new(),
        }
    }
}

impl StaticAssets {
    /// 从配置目录加载，单个文件缺失或损坏时记录警告并使用空值
    pub fn load(config: &AssetsConfig) -> Self {
        let defaults = Self::default();

        let dataset = read_json(&config.dataset_path()).unwrap_or_else(|e| {
            warn!("⚠️ 无法加载默认数据集，使用空数据集: {:#}", e);
            defaults.dataset.clone()
        });
        let component_library =
            read_json(&config.component_library_path()).unwrap_or_else(|e| {
                warn!("⚠️ 无法加载组件描述目录，使用空目录: {:#}", e);
                defaults.component_library.clone()
            });
        let design_tokens = read_text(&config.design_tokens_path()).unwrap_or_else(|e| {
            warn!("⚠️ 无法加载设计系统CSS: {:#}", e);
            defaults.design_tokens.clone()
        });

        info!("📦 静态参考数据已加载: {:?}", config.dir);
        Self {
            dataset,
            component_library,
            design_tokens,
        }
    }

    pub fn dataset_json(&self) -> String {
        self.dataset.to_string()
    }

    pub fn component_library_json(&self) -> String {
        serde_json::to_string_pretty(&self.component_library).unwrap_or_default()
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).context(format!("Failed to read {:?}", path))
}

fn read_json(path: &Path) -> Result<Value> {
    let content = read_text(path)?;
    serde_json::from_str(&content).context(format!("Failed to parse {:?}", path))
}
