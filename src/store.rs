//! 本地持久化状态
//!
//! 保存最近一次注册的身份信息（设备令牌、variant 凭证、服务器地址），
//! 供之后的推送统计请求使用。值会一直保留直到下一次注册覆盖。

use crate::error::StoreError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::debug;

/// 持久化键
pub mod keys {
    pub const DEVICE_TOKEN: &str = "deviceToken";
    pub const VARIANT_ID: &str = "variantID";
    pub const VARIANT_SECRET: &str = "variantSecret";
    pub const SERVER_URL: &str = "serverURL";
}

/// 键值存储 trait
///
/// 每个键的写入是整体替换，最后写入者生效
pub trait PersistedState: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// 推送统计所需的身份信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedIdentity {
    pub variant_id: String,
    pub variant_secret: String,
    pub server_url: String,
}

impl PersistedIdentity {
    /// 读取身份信息，任一字段缺失（或为空）时返回 None
    pub fn load(state: &dyn PersistedState) -> Option<Self> {
        let read = |key: &str| state.get(key).filter(|v| !v.is_empty());

        Some(Self {
            variant_id: read(keys::VARIANT_ID)?,
            variant_secret: read(keys::VARIANT_SECRET)?,
            server_url: read(keys::SERVER_URL)?,
        })
    }
}

/// 内存存储，进程退出即丢失
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistedState for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON 文件存储
///
/// 打开时加载整个文件，每次 `set` 先写临时文件再重命名，保证文件内容完整
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// 打开存储文件，文件不存在时视为空
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let values = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => HashMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!("opened state file {} ({} keys)", path.display(), values.len());

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PersistedState for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        self.flush(&values)
    }
}
