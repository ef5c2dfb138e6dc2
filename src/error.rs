//! 注册器错误类型定义

use thiserror::Error;

use crate::endpoint::EndpointClass;

/// 注册器错误类型
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// 主机名解析失败
    #[error("Host resolution failed: {0}")]
    HostResolution(String),

    /// 服务 URL 非法
    #[error("Malformed service URL: {0}")]
    MalformedServiceUrl(String),

    /// 声明的端点类别没有匹配的监听器
    #[error("No matching listener for endpoint class: {0}")]
    NoMatchingListener(EndpointClass),

    /// 注册中心拒绝注册
    #[error("Registry rejected registration: {0}")]
    RegistryRejection(String),

    /// 监听器未绑定（既无已连接端点，也无可用的配置地址）
    #[error("Listener not bound: {0}")]
    ListenerUnbound(String),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(String),
}

/// 注册器结果类型
pub type RegistrarResult<T> = Result<T, RegistrarError>;
