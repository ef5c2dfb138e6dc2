//! 服务注册中心接口与服务 URL
//!
//! 注册中心的内部协议对本库不可见，只以 `register` 能力的形式消费。

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use url::Url;

use crate::error::{RegistrarError, RegistrarResult};
use crate::registration::ServiceType;

/// 服务 URL（`scheme://host:port/path`）
///
/// scheme 取自服务类型的具体类型名，构造时通过 `url` 校验整体合法性。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrl {
    /// 服务类型
    pub service_type: ServiceType,
    /// 主机名或 IP
    pub host: String,
    /// 端口
    pub port: u16,
    /// URL 路径
    pub path: String,
}

impl ServiceUrl {
    /// 构造并校验服务 URL
    pub fn new(
        service_type: ServiceType,
        host: &str,
        port: u16,
        path: &str,
    ) -> RegistrarResult<Self> {
        let raw = format!(
            "{}://{}:{}{}",
            service_type.concrete_type_name(),
            host,
            port,
            path
        );
        Url::parse(&raw)
            .map_err(|e| RegistrarError::MalformedServiceUrl(format!("{}: {}", raw, e)))?;

        Ok(Self {
            service_type,
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}:{}{}",
            self.service_type.concrete_type_name(),
            self.host,
            self.port,
            self.path
        )
    }
}

/// 服务注册中心能力
///
/// 由外部服务发现系统实现。假定 `register` 快速返回；
/// 每条注册声明在每次启动事件中恰好触发一次调用，失败时由调用方记录日志。
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// 注册一个服务实例
    ///
    /// # 参数
    /// * `service` - 完整的服务 URL
    /// * `properties` - 该服务声明时附带的属性
    async fn register(
        &self,
        service: &ServiceUrl,
        properties: &HashMap<String, String>,
    ) -> RegistrarResult<()>;
}
