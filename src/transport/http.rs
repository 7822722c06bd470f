/// 基于 reqwest 的 HTTP 传输实现
///
/// reqwest 自身的重定向跟随被关闭，由 `RedirectPolicy` 统一处理
use super::redirect::{RedirectAction, RedirectPolicy};
use super::traits::{PushRequest, PushResponse, Transport};
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

/// HTTP 传输配置
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// 重定向策略
    pub redirect_policy: RedirectPolicy,

    /// 请求超时，None 表示使用 reqwest 默认值
    pub timeout: Option<Duration>,

    /// User-Agent字符串
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            redirect_policy: RedirectPolicy::default(),
            timeout: None,
            user_agent: format!("push-sdk/{}", crate::VERSION),
        }
    }
}

impl HttpTransportConfig {
    pub fn with_redirect_policy(mut self, policy: RedirectPolicy) -> Self {
        self.redirect_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP 传输
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    policy: RedirectPolicy,
}

impl HttpTransport {
    /// 使用默认配置创建
    pub fn new() -> Result<Self, TransportError> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// 使用自定义配置创建
    pub fn with_config(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            policy: config.redirect_policy,
        })
    }

    pub fn redirect_policy(&self) -> RedirectPolicy {
        self.policy
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: PushRequest) -> Result<PushResponse, TransportError> {
        let mut url = request.url.clone();
        let mut hops = 0;

        loop {
            debug!("{} {} (hop {})", request.method, url, hops);

            let mut builder = self.client.request(request.method.clone(), url.clone());
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            let response = builder.send().await?;
            let status = response.status();
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            match self
                .policy
                .next_hop(&url, status.as_u16(), location.as_deref(), hops)?
            {
                RedirectAction::Follow(next) => {
                    info!(
                        "redirect {} -> {}, resubmitting {}",
                        status, next, request.method
                    );
                    url = next;
                    hops += 1;
                }
                RedirectAction::Stop => {
                    if status.is_redirection() {
                        warn!("stopped at redirect response {} after {} hops", status, hops);
                    }

                    return Ok(PushResponse {
                        status: status.as_u16(),
                        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                        url,
                    });
                }
            }
        }
    }
}
