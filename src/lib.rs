// 声明所有模块
pub mod config;
pub mod error;
pub mod metrics;
pub mod profile;
pub mod registration;
pub mod store;
pub mod transport;
pub mod utils;

/// 重新导出thiserror错误类型
pub use crate::error::{
    ConfigError, MetricsError, RegistrationError, RegistrationResult, StoreError, TransportError,
};

/// 主要API重新导出，简化使用
pub use crate::config::{BundledConfig, ConfigResolver};
pub use crate::metrics::{ApplicationState, PushAnalytics, PUSH_MESSAGE_ID_KEY};
pub use crate::profile::DeviceProfile;
pub use crate::registration::DeviceRegistration;
pub use crate::store::{FileStore, MemoryStore, PersistedState};
pub use crate::transport::{HttpTransport, RedirectPolicy, Transport};

use std::sync::Arc;

/// push-sdk库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 便捷函数：创建使用默认 HTTP 传输的注册客户端
///
/// `server_url` 为 None 时从配置（override / 打包配置）中读取
pub fn create_registration(
    server_url: Option<&str>,
    store: Arc<dyn PersistedState>,
) -> Result<DeviceRegistration, RegistrationError> {
    let transport = Arc::new(HttpTransport::new()?);
    let registration = DeviceRegistration::new(store, transport);

    match server_url {
        Some(url) => {
            let url = url::Url::parse(url).map_err(RegistrationError::InvalidServerUrl)?;
            Ok(registration.with_server_url(url))
        }
        None => Ok(registration),
    }
}

/// 便捷函数：创建使用默认 HTTP 传输的统计上报客户端
pub fn create_analytics(store: Arc<dyn PersistedState>) -> Result<PushAnalytics, TransportError> {
    Ok(PushAnalytics::new(store, Arc::new(HttpTransport::new()?)))
}
