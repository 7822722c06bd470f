/// 设备注册客户端
///
/// 将设备注册到推送服务器（`POST {serverURL}/rest/registry/device`）
use crate::config::{keys as config_keys, ConfigResolver};
use crate::error::{RegistrationError, RegistrationResult};
use crate::profile::{DeviceProfile, RegistrationBody};
use crate::store::{keys as store_keys, PersistedState};
use crate::transport::{PushRequest, Transport};
use crate::utils::{append_path, basic_auth_header, decode_token, encode_token};
use reqwest::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

/// 注册接口路径
pub const REGISTRY_PATH: [&str; 3] = ["rest", "registry", "device"];

/// 设备注册客户端
pub struct DeviceRegistration {
    /// 显式指定的服务器地址，优先于配置
    server_url: Option<Url>,

    /// 配置解析器
    resolver: ConfigResolver,

    /// 本地持久化
    store: Arc<dyn PersistedState>,

    transport: Arc<dyn Transport>,
}

/// 校验通过后的注册信息
struct ResolvedRegistration {
    profile: DeviceProfile,
    device_token: Vec<u8>,
    variant_id: String,
    variant_secret: String,
    server_url: String,
    endpoint: Url,
}

impl DeviceRegistration {
    /// 创建新的注册客户端
    ///
    /// # 参数
    /// - `store`: 保存注册身份信息的存储
    /// - `transport`: 发送请求的传输层
    pub fn new(store: Arc<dyn PersistedState>, transport: Arc<dyn Transport>) -> Self {
        Self {
            server_url: None,
            resolver: ConfigResolver::new(),
            store,
            transport,
        }
    }

    /// 设置服务器地址
    pub fn with_server_url(mut self, server_url: Url) -> Self {
        self.server_url = Some(server_url);
        self
    }

    /// 设置配置解析器
    pub fn with_config(mut self, resolver: ConfigResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// 覆盖配置项（serverURL / variantID / variantSecret）
    pub fn override_properties(&mut self, properties: HashMap<String, String>) {
        debug!("override properties: {:?}", properties.keys().collect::<Vec<_>>());
        self.resolver.set_overrides(properties);
    }

    /// 执行注册
    ///
    /// `configure` 接收一个空的 `DeviceProfile`，返回填好的信息。
    /// 未填写的 variantID / variantSecret / serverURL 从配置中读取，
    /// 未填写的设备令牌沿用上一次注册保存的令牌。
    ///
    /// # 返回
    /// - `Ok(())`: 服务器返回 200
    /// - `Err(ConfigurationMissing)`: 未提供 `configure`
    /// - `Err(Missing*)`: 必填字段缺失，不会发送请求
    /// - `Err(Network)` / `Err(ServerRejected)`: 请求失败
    pub async fn register<F>(&self, configure: Option<F>) -> RegistrationResult<()>
    where
        F: FnOnce(DeviceProfile) -> DeviceProfile,
    {
        let configure = configure.ok_or(RegistrationError::ConfigurationMissing)?;
        let profile = configure(DeviceProfile::default());
        self.register_profile(profile).await
    }

    /// 使用已构造好的 `DeviceProfile` 注册
    pub async fn register_profile(&self, profile: DeviceProfile) -> RegistrationResult<()> {
        let resolved = self.resolve(profile)?;

        // 在发送请求前保存，注册失败时也会覆盖上一次的身份信息
        self.persist(&resolved)?;

        let body = serde_json::to_vec(&RegistrationBody::new(
            &resolved.profile,
            &resolved.device_token,
        ))?;

        let request = PushRequest::new(Method::POST, resolved.endpoint.clone())
            .with_header("Content-Type", "application/json")
            .with_header(
                "Authorization",
                basic_auth_header(&resolved.variant_id, &resolved.variant_secret),
            )
            .with_body(body);

        info!("registering device with {}", resolved.endpoint);
        debug!("variantID: {}", resolved.variant_id);

        let response = self.transport.send(request).await.map_err(|e| {
            error!("device registration failed: {}", e);
            RegistrationError::Network(e)
        })?;

        if response.is_ok() {
            info!("device registered: {} {}", response.status, response.status_text);
            Ok(())
        } else {
            warn!(
                "device registration rejected: {} {}",
                response.status, response.status_text
            );
            Err(RegistrationError::server_rejected(
                response.status,
                response.status_text,
            ))
        }
    }

    /// 补全并校验注册信息
    ///
    /// 校验顺序：令牌、variantID、variantSecret、serverURL，遇到第一个缺失即返回
    fn resolve(&self, mut profile: DeviceProfile) -> RegistrationResult<ResolvedRegistration> {
        if is_blank(profile.variant_id.as_deref()) {
            profile.variant_id = self.resolver.resolve(config_keys::VARIANT_ID);
        }
        if is_blank(profile.variant_secret.as_deref()) {
            profile.variant_secret = self.resolver.resolve(config_keys::VARIANT_SECRET);
        }

        let server_url = match &self.server_url {
            Some(url) => Some(url.as_str().to_string()),
            None => self.resolver.resolve(config_keys::SERVER_URL),
        };

        let device_token = match profile.device_token.clone().filter(|t| !t.is_empty()) {
            Some(token) => Some(token),
            None => {
                let stored = self
                    .store
                    .get(store_keys::DEVICE_TOKEN)
                    .and_then(|t| decode_token(&t));
                if stored.is_some() {
                    debug!("reusing device token from previous registration");
                }
                stored
            }
        };

        let device_token = device_token.ok_or(RegistrationError::MissingToken)?;
        let variant_id = profile
            .variant_id
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or(RegistrationError::MissingVariantId)?;
        let variant_secret = profile
            .variant_secret
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or(RegistrationError::MissingVariantSecret)?;
        let server_url = server_url
            .filter(|v| !v.is_empty())
            .ok_or(RegistrationError::MissingServerUrl)?;

        let endpoint = Url::parse(&server_url)
            .and_then(|base| append_path(&base, &REGISTRY_PATH))
            .map_err(RegistrationError::InvalidServerUrl)?;

        Ok(ResolvedRegistration {
            profile,
            device_token,
            variant_id,
            variant_secret,
            server_url,
            endpoint,
        })
    }

    fn persist(&self, resolved: &ResolvedRegistration) -> RegistrationResult<()> {
        self.store
            .set(store_keys::DEVICE_TOKEN, &encode_token(&resolved.device_token))?;
        self.store.set(store_keys::VARIANT_ID, &resolved.variant_id)?;
        self.store
            .set(store_keys::VARIANT_SECRET, &resolved.variant_secret)?;
        self.store.set(store_keys::SERVER_URL, &resolved.server_url)?;
        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}
