//! 推送统计
//!
//! 应用因推送通知启动或从后台唤醒时，向推送服务器报告消息已被打开
//! （`PUT {serverURL}/rest/registry/device/pushMessage/{messageId}`）。
//! 身份信息来自最近一次注册保存的状态，因此必须先注册。

use crate::error::MetricsError;
use crate::store::{PersistedIdentity, PersistedState};
use crate::transport::{PushRequest, Transport};
use crate::utils::{append_path, basic_auth_header};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

/// 推送消息中携带消息 ID 的字段
pub const PUSH_MESSAGE_ID_KEY: &str = "aerogear-push-id";

/// 应用当前状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationState {
    Active,
    Inactive,
    Background,
}

/// 推送统计上报
pub struct PushAnalytics {
    store: Arc<dyn PersistedState>,
    transport: Arc<dyn Transport>,
}

impl PushAnalytics {
    pub fn new(store: Arc<dyn PersistedState>, transport: Arc<dyn Transport>) -> Self {
        Self { store, transport }
    }

    /// 应用因推送通知启动时上报
    ///
    /// `launch_payload` 为 None 或不含消息 ID 时不是推送启动，直接返回成功
    pub async fn send_metrics_when_app_launched(
        &self,
        launch_payload: Option<&Value>,
    ) -> Result<(), MetricsError> {
        match launch_payload.and_then(extract_message_id) {
            Some(message_id) => self.send_metrics(message_id).await,
            None => {
                debug!("launch not triggered by a push message, skipping metrics");
                Ok(())
            }
        }
    }

    /// 应用从后台被推送通知唤醒时上报
    ///
    /// 只在应用处于 `Inactive` 或 `Background` 状态时上报
    pub async fn send_metrics_when_app_awoken(
        &self,
        state: ApplicationState,
        payload: &Value,
    ) -> Result<(), MetricsError> {
        if state == ApplicationState::Active {
            debug!("application already active, skipping metrics");
            return Ok(());
        }

        match extract_message_id(payload) {
            Some(message_id) => self.send_metrics(message_id).await,
            None => {
                debug!("wake payload has no {}, skipping metrics", PUSH_MESSAGE_ID_KEY);
                Ok(())
            }
        }
    }

    /// 上报消息已打开
    pub async fn send_metrics(&self, message_id: &str) -> Result<(), MetricsError> {
        let identity = PersistedIdentity::load(self.store.as_ref()).ok_or_else(|| {
            warn!("metrics requested before registration");
            MetricsError::NotRegistered
        })?;

        let endpoint = Url::parse(&identity.server_url)
            .and_then(|base| {
                append_path(&base, &["rest", "registry", "device", "pushMessage", message_id])
            })
            .map_err(MetricsError::InvalidServerUrl)?;

        let request = PushRequest::new(Method::PUT, endpoint.clone())
            .with_header("Content-Type", "application/json")
            .with_header(
                "Authorization",
                basic_auth_header(&identity.variant_id, &identity.variant_secret),
            );

        info!("sending metrics for message {} to {}", message_id, endpoint);

        let response = self.transport.send(request).await.map_err(|e| {
            error!("sending metrics failed: {}", e);
            MetricsError::Network(e)
        })?;

        if response.is_ok() {
            debug!("metrics accepted for message {}", message_id);
            Ok(())
        } else {
            warn!("metrics rejected: {} {}", response.status, response.status_text);
            Err(MetricsError::ServerRejected {
                status_code: response.status,
                status_text: response.status_text,
            })
        }
    }
}

/// 从推送数据中读取消息 ID
pub fn extract_message_id(payload: &Value) -> Option<&str> {
    payload
        .get(PUSH_MESSAGE_ID_KEY)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}
