/// 工具函数模块
///
/// 认证头、设备令牌编码、URL 拼接以及日志初始化

use base64::{engine::general_purpose::STANDARD, Engine};
use url::Url;

/// 生成 HTTP Basic 认证头
///
/// # 参数
/// * `variant_id` - Variant ID（用户名）
/// * `variant_secret` - Variant Secret（密码）
///
/// # 示例
/// ```rust
/// use push_sdk::utils::basic_auth_header;
///
/// assert_eq!(basic_auth_header("V", "S"), "Basic VjpT");
/// ```
pub fn basic_auth_header(variant_id: &str, variant_secret: &str) -> String {
    let credentials = format!("{}:{}", variant_id, variant_secret);
    format!("Basic {}", STANDARD.encode(credentials.as_bytes()))
}

/// 将设备令牌编码为小写十六进制字符串
pub fn encode_token(token: &[u8]) -> String {
    hex::encode(token)
}

/// 解析十六进制设备令牌，格式无效时返回 None
pub fn decode_token(hex_token: &str) -> Option<Vec<u8>> {
    if hex_token.is_empty() {
        return None;
    }
    hex::decode(hex_token).ok()
}

/// 在服务器 URL 后追加路径段
///
/// 保留服务器 URL 中已有的上下文路径（如 `http://host/ag-push`），
/// 每个段都会被单独转义。
pub fn append_path(base: &Url, segments: &[&str]) -> Result<Url, url::ParseError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// 初始化日志
///
/// `level` 无法解析时回退到 INFO；重复初始化会被忽略
pub fn initialize_logging(level: &str) {
    let level = level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
