//! 端点分类与地址解析
//!
//! 服务器完成监听绑定后，把监听器快照归类为 Main / Internal 两类端点，
//! 并为匹配的监听器解析出对外可达的真实地址。
//! 临时端口（配置为 0）在这里被替换为实际绑定的端口。

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::error::{RegistrarError, RegistrarResult};

/// 端点类别
///
/// 封闭集合：新增类别需要同时新增变体与对应的匹配规则。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointClass {
    /// 对外主端点
    Main,
    /// 内部管理端点
    Internal,
}

impl EndpointClass {
    /// 判断监听器是否属于该类别（按名称精确匹配，区分大小写）
    pub fn matches(&self, listener: &ListenerInfo) -> bool {
        match self {
            EndpointClass::Main => listener.name == "main",
            EndpointClass::Internal => listener.name == "internal",
        }
    }

    /// 类别名称
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointClass::Main => "main",
            EndpointClass::Internal => "internal",
        }
    }
}

impl fmt::Display for EndpointClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointClass {
    type Err = RegistrarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(EndpointClass::Main),
            "internal" => Ok(EndpointClass::Internal),
            other => Err(RegistrarError::Config(format!(
                "unknown endpoint class: {}",
                other
            ))),
        }
    }
}

/// 监听器快照
///
/// 由服务器生命周期在绑定完成后注入，注册器不做任何全局状态查询。
#[derive(Debug, Clone)]
pub struct ListenerInfo {
    /// 监听器名称（用于端点分类）
    pub name: String,
    /// 配置的监听地址（为空表示未指定）
    pub configured_host: String,
    /// 配置的监听端口（0 表示临时端口）
    pub configured_port: u16,
    /// 实际绑定的本地端口
    pub bound_port: u16,
    /// 已连接传输端点的本地地址（如果有）
    pub connected_addr: Option<SocketAddr>,
}

impl ListenerInfo {
    /// 创建监听器快照
    pub fn new(
        name: impl Into<String>,
        configured_host: impl Into<String>,
        configured_port: u16,
        bound_port: u16,
    ) -> Self {
        Self {
            name: name.into(),
            configured_host: configured_host.into(),
            configured_port,
            bound_port,
            connected_addr: None,
        }
    }

    /// 附加已连接传输端点的本地地址
    pub fn with_connected_addr(mut self, addr: SocketAddr) -> Self {
        self.connected_addr = Some(addr);
        self
    }

    /// 从配置与实际绑定地址构造快照
    pub fn from_bound(
        name: &str,
        configured_host: &str,
        configured_port: u16,
        local_addr: SocketAddr,
    ) -> Self {
        Self::new(name, configured_host, configured_port, local_addr.port())
    }
}

/// 解析后的端点地址
///
/// 只在一次启动回调内部使用，不做持久化。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    /// 主机名或 IP
    pub host: String,
    /// 端口
    pub port: u16,
}

/// 获取本机规范主机名
pub fn canonical_hostname() -> RegistrarResult<String> {
    let name = hostname::get().map_err(|e| {
        RegistrarError::HostResolution(format!("cannot determine local hostname: {}", e))
    })?;
    let name = name.to_string_lossy().to_string();
    if name.is_empty() {
        return Err(RegistrarError::HostResolution(
            "local hostname is empty".to_string(),
        ));
    }
    Ok(name)
}

/// 解析监听器对外可达的地址
///
/// 解析顺序：
/// 1. 已连接传输端点存在时，直接取其本地地址和端口
/// 2. 否则使用配置的 host/port；配置端口为 0 时替换为实际绑定端口
/// 3. host 为空时替换为本机规范主机名
///
/// 既无已连接端点也无可用端口时返回 `ListenerUnbound`。
pub fn resolve_endpoint(listener: &ListenerInfo) -> RegistrarResult<ResolvedEndpoint> {
    if let Some(addr) = listener.connected_addr {
        return Ok(ResolvedEndpoint {
            host: addr.ip().to_string(),
            port: addr.port(),
        });
    }

    let port = if listener.configured_port == 0 {
        listener.bound_port
    } else {
        listener.configured_port
    };
    if port == 0 {
        return Err(RegistrarError::ListenerUnbound(format!(
            "no connected endpoint and no usable port on listener {}",
            listener.name
        )));
    }

    let host = if listener.configured_host.is_empty() {
        canonical_hostname()?
    } else {
        listener.configured_host.clone()
    };

    Ok(ResolvedEndpoint { host, port })
}

/// 判断主机字符串是否为通配地址（0.0.0.0 / ::）
pub(crate) fn is_wildcard_host(host: &str) -> bool {
    host.parse::<IpAddr>()
        .map(|ip| ip.is_unspecified())
        .unwrap_or(false)
}
