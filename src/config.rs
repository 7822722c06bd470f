//! 推送配置解析
//!
//! 按以下优先级查找配置值：
//! 1. 调用方显式设置的覆盖表（override）
//! 2. 打包的配置文件（JSON 格式，与应用一起分发）
//! 3. 不存在
//!
//! 空字符串视为不存在。

use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// 配置键
pub mod keys {
    pub const SERVER_URL: &str = "serverURL";
    pub const VARIANT_ID: &str = "variantID";
    pub const VARIANT_SECRET: &str = "variantSecret";
}

/// 打包的静态配置
///
/// 对应一个扁平的 JSON 对象，例如：
///
/// ```json
/// {
///   "serverURL": "https://push.example.com/ag-push",
///   "variantID": "8bd6e6a3-df6a-41ee-9f53-ff4e1a5f6a0f",
///   "variantSecret": "1c9a6066-e0e5-4bcb-ab30-6d6cb4b9fb3a"
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BundledConfig {
    values: HashMap<String, String>,
}

impl BundledConfig {
    /// 从 JSON 文件加载配置
    ///
    /// 非字符串的值会被忽略
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json(&content)?;
        debug!("loaded bundled config from {} ({} keys)", path.display(), config.values.len());
        Ok(config)
    }

    /// 从 JSON 字符串解析配置
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;

        let mut values = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            match value {
                serde_json::Value::String(s) => {
                    values.insert(key, s);
                }
                other => warn!("ignoring non-string config value for '{}': {}", key, other),
            }
        }

        Ok(Self { values })
    }

    /// 从键值对构造配置
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// 配置解析器
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    overrides: Option<HashMap<String, String>>,
    bundle: Option<BundledConfig>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置打包配置
    pub fn with_bundle(mut self, bundle: BundledConfig) -> Self {
        self.bundle = Some(bundle);
        self
    }

    /// 设置覆盖表
    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// 替换覆盖表
    pub fn set_overrides(&mut self, overrides: HashMap<String, String>) {
        self.overrides = Some(overrides);
    }

    /// 解析配置值
    ///
    /// 覆盖表中存在该键时直接采用（即便为空），不再查找打包配置
    pub fn resolve(&self, key: &str) -> Option<String> {
        let value = match self.overrides.as_ref().and_then(|o| o.get(key)) {
            Some(value) => Some(value.as_str()),
            None => self.bundle.as_ref().and_then(|b| b.get(key)),
        };

        value.filter(|v| !v.is_empty()).map(str::to_string)
    }
}
