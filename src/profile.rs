//! 设备注册信息
//!
//! 每次注册由调用方通过构建器生成新的 `DeviceProfile`，交给注册客户端后不再修改。

use crate::utils::encode_token;
use serde::Serialize;
use std::collections::BTreeSet;

/// 设备注册信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceProfile {
    /// 推送服务下发的设备令牌（原始字节）
    pub device_token: Option<Vec<u8>>,

    pub variant_id: Option<String>,

    pub variant_secret: Option<String>,

    /// 设备别名（如用户名、邮箱）
    pub alias: Option<String>,

    /// 订阅的分类
    pub categories: Option<BTreeSet<String>>,

    pub operating_system: Option<String>,

    pub os_version: Option<String>,

    /// 设备类型（如 "iPhone"、"iPad"）
    pub device_type: Option<String>,
}

impl DeviceProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置设备令牌
    pub fn with_device_token(mut self, token: impl Into<Vec<u8>>) -> Self {
        self.device_token = Some(token.into());
        self
    }

    pub fn with_variant_id(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    pub fn with_variant_secret(mut self, variant_secret: impl Into<String>) -> Self {
        self.variant_secret = Some(variant_secret.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// 设置分类，重复项会被合并
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_operating_system(mut self, operating_system: impl Into<String>) -> Self {
        self.operating_system = Some(operating_system.into());
        self
    }

    pub fn with_os_version(mut self, os_version: impl Into<String>) -> Self {
        self.os_version = Some(os_version.into());
        self
    }

    pub fn with_device_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = Some(device_type.into());
        self
    }
}

/// 注册请求体
///
/// `deviceToken` 以小写十六进制发送，未设置的可选字段不会出现在 JSON 中
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegistrationBody<'a> {
    device_token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    alias: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<&'a BTreeSet<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    operating_system: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    os_version: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    device_type: Option<&'a str>,
}

impl<'a> RegistrationBody<'a> {
    pub(crate) fn new(profile: &'a DeviceProfile, device_token: &[u8]) -> Self {
        Self {
            device_token: encode_token(device_token),
            alias: profile.alias.as_deref(),
            categories: profile.categories.as_ref(),
            operating_system: profile.operating_system.as_deref(),
            os_version: profile.os_version.as_deref(),
            device_type: profile.device_type.as_deref(),
        }
    }
}
