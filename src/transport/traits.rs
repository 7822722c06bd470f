/// Transport traits 定义
///
/// 注册和统计请求都通过 `Transport` 发送，便于在测试中替换
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Method;
use url::Url;

/// 待发送的请求
///
/// 重定向时整个请求（方法、头、请求体）原样发往新地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl PushRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// 添加请求头
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// 设置请求体
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// 查找请求头（忽略大小写）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// 最终响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushResponse {
    /// HTTP 状态码
    pub status: u16,

    /// 状态描述（如 "Unauthorized"）
    pub status_text: String,

    /// 实际响应的地址（经过重定向后可能与请求地址不同）
    pub url: Url,
}

impl PushResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// 传输层 trait
#[async_trait]
pub trait Transport: Send + Sync {
    /// 发送请求并返回最终响应
    ///
    /// # 返回
    /// - `Ok(PushResponse)`: 收到 HTTP 响应（任何状态码）
    /// - `Err`: 连接失败、超时等传输层错误
    async fn send(&self, request: PushRequest) -> Result<PushResponse, TransportError>;
}
