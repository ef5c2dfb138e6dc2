//! Flare Registrar 延迟服务注册库
//!
//! 将服务端点的声明与发布解耦：
//! - 配置期向注册器追加注册声明（此时监听端口可能还是临时端口 0）
//! - 服务器完成全部监听绑定后发出一次性启动信号
//! - 注册器解析监听器的真实地址，构造服务 URL 并发布到注册中心

pub mod config;
pub mod endpoint;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod registrar;
pub mod registration;
pub mod registry;
pub mod tracing;

pub use config::{
    ListenerConfig, LoggingConfig, RegistrarAppConfig, RegistrationConfig, ServerConfig,
    app_config, load_config,
};
pub use endpoint::{
    EndpointClass, ListenerInfo, ResolvedEndpoint, canonical_hostname, resolve_endpoint,
};
pub use error::{RegistrarError, RegistrarResult};
pub use lifecycle::{StartupNotifier, StartupSignal, bind_listeners, startup_channel};
pub use registrar::ServiceRegistrar;
pub use registration::{Registration, ServiceType};
pub use registry::{ServiceRegistry, ServiceUrl};
