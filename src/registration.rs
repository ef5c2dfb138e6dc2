//! 服务注册声明
//!
//! `Registration` 是配置期声明的发布意图，一经创建不可变。
//! 声明只描述“发布什么”，真实地址在服务器启动后才由注册器解析。

use std::collections::HashMap;
use std::fmt;

use crate::endpoint::EndpointClass;
use crate::error::{RegistrarError, RegistrarResult};

/// 服务类型
///
/// 具体类型名会作为发布 URL 的 scheme（如 `http`）。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceType(String);

impl ServiceType {
    /// 创建服务类型，类型名不能为空
    pub fn new(concrete_type_name: impl Into<String>) -> RegistrarResult<Self> {
        let name = concrete_type_name.into();
        if name.is_empty() {
            return Err(RegistrarError::Config(
                "service type must not be empty".to_string(),
            ));
        }
        Ok(ServiceType(name))
    }

    /// 具体类型名
    pub fn concrete_type_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 服务注册声明
///
/// 构造时完成归一化：
/// - `url_path` 为 None 或空字符串时默认为 `/`，缺少前导 `/` 时自动补全
/// - `properties` 为 None 时使用空映射
#[derive(Debug, Clone)]
pub struct Registration {
    /// 端点类别
    pub endpoint: EndpointClass,
    /// 服务类型
    pub service_type: ServiceType,
    /// URL 路径（总是以 `/` 开头）
    pub url_path: String,
    /// 服务属性，发布时原样转发给注册中心
    pub properties: HashMap<String, String>,
}

impl Registration {
    /// 创建注册声明
    ///
    /// # 参数
    /// * `endpoint` - 端点类别
    /// * `service_type` - 服务类型
    /// * `url_path` - URL 路径（可选）
    /// * `properties` - 服务属性（可选）
    pub fn new(
        endpoint: EndpointClass,
        service_type: ServiceType,
        url_path: Option<String>,
        properties: Option<HashMap<String, String>>,
    ) -> Self {
        let url_path = match url_path {
            None => "/".to_string(),
            Some(p) if p.is_empty() => "/".to_string(),
            Some(p) if !p.starts_with('/') => format!("/{}", p),
            Some(p) => p,
        };

        Self {
            endpoint,
            service_type,
            url_path,
            properties: properties.unwrap_or_default(),
        }
    }
}

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Registration[{}:{}:{}]",
            self.service_type, self.endpoint, self.url_path
        )
    }
}
