/// 重定向策略
///
/// 3xx 响应带 `Location` 时，原请求（方法、头、请求体不变）重新发往新地址，
/// 301/302/303 之后 POST 不得降级为 GET。
use url::Url;

/// 默认最大重定向次数
pub const DEFAULT_MAX_HOPS: usize = 5;

/// 重定向策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// 不跟随重定向，直接返回 3xx 响应
    None,

    /// 以原始方法、头和请求体重新发送到新地址
    Resubmit {
        /// 最大跳转次数，超过后返回最后一个 3xx 响应
        max_hops: usize,
    },
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        RedirectPolicy::Resubmit {
            max_hops: DEFAULT_MAX_HOPS,
        }
    }
}

/// 对一次响应的处理决定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectAction {
    /// 重新发送到新地址
    Follow(Url),

    /// 将当前响应作为最终响应
    Stop,
}

impl RedirectPolicy {
    /// 根据响应决定下一步
    ///
    /// # 参数
    /// - `current`: 当前请求地址，相对 `Location` 以此为基准解析
    /// - `status`: 响应状态码
    /// - `location`: 响应中的 `Location` 头
    /// - `hops`: 已经跟随的次数
    pub fn next_hop(
        &self,
        current: &Url,
        status: u16,
        location: Option<&str>,
        hops: usize,
    ) -> Result<RedirectAction, url::ParseError> {
        let max_hops = match self {
            RedirectPolicy::None => return Ok(RedirectAction::Stop),
            RedirectPolicy::Resubmit { max_hops } => *max_hops,
        };

        if !(300..400).contains(&status) {
            return Ok(RedirectAction::Stop);
        }

        let Some(location) = location.filter(|l| !l.is_empty()) else {
            return Ok(RedirectAction::Stop);
        };

        if hops >= max_hops {
            return Ok(RedirectAction::Stop);
        }

        Ok(RedirectAction::Follow(current.join(location)?))
    }
}
