/// Transport 模块
///
/// 负责把注册和统计请求发送到推送服务器
///
/// ## 组成
///
/// - `Transport` trait: 发送一个 `PushRequest`，返回最终的 `PushResponse`
/// - `HttpTransport`: 基于 reqwest 的实现
/// - `RedirectPolicy`: 重定向策略，作为参数传给 `HttpTransport`
///
/// ## 使用示例
///
/// ```rust,no_run
/// use push_sdk::transport::*;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), push_sdk::TransportError> {
/// let config = HttpTransportConfig::default()
///     .with_redirect_policy(RedirectPolicy::Resubmit { max_hops: 3 })
///     .with_timeout(Duration::from_secs(30));
///
/// let transport = HttpTransport::with_config(config)?;
/// # Ok(())
/// # }
/// ```

mod http;
mod redirect;
mod traits;

// 导出公共接口
pub use http::{HttpTransport, HttpTransportConfig};
pub use redirect::{RedirectAction, RedirectPolicy, DEFAULT_MAX_HOPS};
pub use traits::{PushRequest, PushResponse, Transport};
