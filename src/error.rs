use thiserror::Error;

/// 传输层错误（reqwest 请求失败、URL 无效等）
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// 设备注册操作的Result类型别名
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// 设备注册相关错误类型
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// 未提供配置回调
    #[error("configuration block not set")]
    ConfigurationMissing,

    /// 必填字段缺失
    #[error("'token' should be set")]
    MissingToken,

    #[error("'variantID' should be set")]
    MissingVariantId,

    #[error("'variantSecret' should be set")]
    MissingVariantSecret,

    #[error("'serverURL' should be set")]
    MissingServerUrl,

    #[error("invalid server URL: {0}")]
    InvalidServerUrl(#[source] url::ParseError),

    #[error("failed to serialize registration body: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 本地持久化失败
    #[error("failed to persist registration state: {0}")]
    Storage(#[from] StoreError),

    /// 网络相关错误
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// 服务器返回非 200 状态
    #[error("server rejected registration: {status_code} {status_text}")]
    ServerRejected { status_code: u16, status_text: String },
}

impl RegistrationError {
    /// 判断错误是否可恢复（可用于重试逻辑）
    pub fn is_recoverable(&self) -> bool {
        match self {
            RegistrationError::Network(_) => true,
            RegistrationError::Storage(_) => true,
            RegistrationError::ServerRejected { status_code, .. } => *status_code >= 500,
            RegistrationError::ConfigurationMissing
            | RegistrationError::Serialization(_)
            | RegistrationError::MissingToken
            | RegistrationError::MissingVariantId
            | RegistrationError::MissingVariantSecret
            | RegistrationError::MissingServerUrl
            | RegistrationError::InvalidServerUrl(_) => false,
        }
    }

    /// 获取标准错误代码，用于日志分析和监控
    pub fn error_code(&self) -> &'static str {
        match self {
            RegistrationError::ConfigurationMissing => "CONFIGURATION_MISSING",
            RegistrationError::MissingToken => "MISSING_TOKEN",
            RegistrationError::MissingVariantId => "MISSING_VARIANT_ID",
            RegistrationError::MissingVariantSecret => "MISSING_VARIANT_SECRET",
            RegistrationError::MissingServerUrl => "MISSING_SERVER_URL",
            RegistrationError::InvalidServerUrl(_) => "INVALID_SERVER_URL",
            RegistrationError::Serialization(_) => "SERIALIZATION_ERROR",
            RegistrationError::Storage(_) => "STORAGE_ERROR",
            RegistrationError::Network(_) => "NETWORK_ERROR",
            RegistrationError::ServerRejected { .. } => "SERVER_REJECTED",
        }
    }

    /// 获取HTTP状态码（如果有）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RegistrationError::ServerRejected { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    pub(crate) fn server_rejected(status_code: u16, status_text: impl Into<String>) -> Self {
        RegistrationError::ServerRejected {
            status_code,
            status_text: status_text.into(),
        }
    }
}

/// 推送统计相关错误类型
#[derive(Error, Debug)]
pub enum MetricsError {
    /// 尚未注册：本地没有 variantID / variantSecret / serverURL
    #[error("Registration should be done prior to metrics collection")]
    NotRegistered,

    #[error("invalid server URL: {0}")]
    InvalidServerUrl(#[source] url::ParseError),

    #[error("network error: {0}")]
    Network(#[from] TransportError),

    #[error("server rejected metrics: {status_code} {status_text}")]
    ServerRejected { status_code: u16, status_text: String },
}

impl MetricsError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            MetricsError::Network(_) => true,
            MetricsError::ServerRejected { status_code, .. } => *status_code >= 500,
            MetricsError::NotRegistered | MetricsError::InvalidServerUrl(_) => false,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            MetricsError::NotRegistered => "NOT_REGISTERED",
            MetricsError::InvalidServerUrl(_) => "INVALID_SERVER_URL",
            MetricsError::Network(_) => "NETWORK_ERROR",
            MetricsError::ServerRejected { .. } => "SERVER_REJECTED",
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            MetricsError::ServerRejected { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}
