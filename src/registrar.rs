//! 启动触发的服务注册器
//!
//! 配置期收集注册声明，服务器监听绑定完成后做一次性的分类、
//! 地址解析与批量发布。Main 端点解析失败会中止整个发布过程；
//! Internal 端点按尽力而为处理。

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::endpoint::{
    EndpointClass, ListenerInfo, ResolvedEndpoint, canonical_hostname, is_wildcard_host,
    resolve_endpoint,
};
use crate::error::{RegistrarError, RegistrarResult};
use crate::metrics::registrar_metrics;
use crate::registration::Registration;
use crate::registry::{ServiceRegistry, ServiceUrl};

/// 延迟服务注册器
///
/// 持有注册声明序列与注册中心能力。声明只应在服务器启动前追加，
/// `server_started` 在每次启动事件中只应被调用一次。
pub struct ServiceRegistrar {
    registrations: Vec<Registration>,
    registry: Arc<dyn ServiceRegistry>,
}

impl ServiceRegistrar {
    /// 创建注册器
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self {
            registrations: Vec::new(),
            registry,
        }
    }

    /// 追加一条注册声明
    ///
    /// 重复声明是允许的，每条声明都会独立触发一次发布。
    pub fn add(&mut self, registration: Registration) {
        self.registrations.push(registration);
    }

    /// 已声明的注册序列（按追加顺序）
    pub fn declared(&self) -> &[Registration] {
        &self.registrations
    }

    /// 服务器启动完成回调
    ///
    /// 对监听器快照做端点分类与地址解析，然后按声明顺序逐条发布。
    /// Main 端点解析失败时中止本次启动事件的全部发布并返回错误；
    /// Internal 端点解析失败只记录日志，Main 类别的声明仍然发布。
    pub async fn server_started(&self, listeners: &[ListenerInfo]) -> RegistrarResult<()> {
        let _timer = registrar_metrics().pass_duration_seconds.start_timer();

        let main_listener = Self::classify(EndpointClass::Main, listeners);
        let internal_listener = Self::classify(EndpointClass::Internal, listeners);

        // Main 端点是必需的：解析失败时本次启动事件不发布任何注册
        let main = match main_listener {
            Some(listener) => match resolve_endpoint(listener) {
                Ok(endpoint) => Some(endpoint),
                Err(e) => {
                    error!(
                        listener = %listener.name,
                        error = %e,
                        "cannot determine main endpoint address"
                    );
                    return Err(e);
                }
            },
            None => None,
        };

        // Internal 端点按尽力而为处理：解析失败只记录日志
        let internal = match internal_listener {
            Some(listener) => match resolve_endpoint(listener) {
                Ok(endpoint) => Some(endpoint),
                Err(e) => {
                    error!(
                        listener = %listener.name,
                        error = %e,
                        "cannot determine internal endpoint address"
                    );
                    None
                }
            },
            None => None,
        };

        self.dispatch(main.as_ref(), internal.as_ref()).await;
        Ok(())
    }

    /// 为指定类别挑选监听器
    ///
    /// 同类多个监听器时取第一个匹配，其余忽略。
    fn classify<'a>(
        class: EndpointClass,
        listeners: &'a [ListenerInfo],
    ) -> Option<&'a ListenerInfo> {
        listeners.iter().find(|listener| class.matches(listener))
    }

    /// 按声明顺序逐条发布
    ///
    /// 单条声明的失败（URL 非法、注册中心拒绝）不影响其余声明。
    async fn dispatch(
        &self,
        main: Option<&ResolvedEndpoint>,
        internal: Option<&ResolvedEndpoint>,
    ) {
        for registration in &self.registrations {
            let endpoint = match registration.endpoint {
                EndpointClass::Main => main,
                EndpointClass::Internal => internal,
            };

            // 该类别没有解析出的端点：跳过这条声明而不是失败
            let Some(endpoint) = endpoint else {
                let reason = RegistrarError::NoMatchingListener(registration.endpoint);
                warn!(registration = %registration, "{}, skipping", reason);
                registrar_metrics()
                    .registrations_skipped_total
                    .with_label_values(&[registration.endpoint.as_str()])
                    .inc();
                continue;
            };

            if let Err(e) = self.publish(endpoint, registration).await {
                error!(
                    registration = %registration,
                    error = %e,
                    "failed to register service"
                );
                registrar_metrics()
                    .registration_failures_total
                    .with_label_values(&[registration.endpoint.as_str()])
                    .inc();
            }
        }
    }

    /// 发布单条注册声明
    async fn publish(
        &self,
        endpoint: &ResolvedEndpoint,
        registration: &Registration,
    ) -> RegistrarResult<()> {
        // 通配地址对外不可达，替换为本机规范主机名
        let host = if is_wildcard_host(&endpoint.host) {
            canonical_hostname()?
        } else {
            endpoint.host.clone()
        };

        let service = ServiceUrl::new(
            registration.service_type.clone(),
            &host,
            endpoint.port,
            &registration.url_path,
        )?;

        info!(service = %service, "Registering service");
        self.registry
            .register(&service, &registration.properties)
            .await?;

        registrar_metrics()
            .registrations_published_total
            .with_label_values(&[
                registration.endpoint.as_str(),
                registration.service_type.concrete_type_name(),
            ])
            .inc();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::registration::ServiceType;

    /// 记录注册调用的测试注册中心
    #[derive(Default)]
    struct RecordingRegistry {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ServiceRegistry for RecordingRegistry {
        async fn register(
            &self,
            service: &ServiceUrl,
            _properties: &HashMap<String, String>,
        ) -> RegistrarResult<()> {
            self.calls.lock().unwrap().push(service.to_string());
            Ok(())
        }
    }

    fn registration(endpoint: EndpointClass, scheme: &str, path: &str) -> Registration {
        Registration::new(
            endpoint,
            ServiceType::new(scheme).unwrap(),
            Some(path.to_string()),
            None,
        )
    }

    #[test]
    fn test_classification_first_match_wins() {
        let listeners = vec![
            ListenerInfo::new("main", "10.0.0.5", 8080, 8080),
            ListenerInfo::new("main", "10.0.0.6", 9090, 9090),
        ];
        let picked = ServiceRegistrar::classify(EndpointClass::Main, &listeners).unwrap();
        assert_eq!(picked.configured_host, "10.0.0.5");
    }

    #[tokio::test]
    async fn test_main_resolution_failure_aborts_pass() {
        let registry = Arc::new(RecordingRegistry::default());
        let mut registrar = ServiceRegistrar::new(registry.clone());
        registrar.add(registration(EndpointClass::Main, "http", "/a"));
        registrar.add(registration(EndpointClass::Internal, "http", "/b"));

        // Main 监听器完全未绑定，解析必然失败
        let listeners = vec![
            ListenerInfo::new("main", "10.0.0.5", 0, 0),
            ListenerInfo::new("internal", "127.0.0.1", 8081, 8081),
        ];

        let result = registrar.server_started(&listeners).await;
        assert!(matches!(result, Err(RegistrarError::ListenerUnbound(_))));
        assert!(registry.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_internal_resolution_failure_keeps_main_registrations() {
        let registry = Arc::new(RecordingRegistry::default());
        let mut registrar = ServiceRegistrar::new(registry.clone());
        registrar.add(registration(EndpointClass::Main, "http", "/a"));
        registrar.add(registration(EndpointClass::Internal, "http", "/b"));

        let listeners = vec![
            ListenerInfo::new("main", "10.0.0.5", 8080, 8080),
            ListenerInfo::new("internal", "127.0.0.1", 0, 0),
        ];

        registrar.server_started(&listeners).await.unwrap();

        let calls = registry.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), ["http://10.0.0.5:8080/a"]);
    }

    #[tokio::test]
    async fn test_unmatched_class_is_skipped() {
        let registry = Arc::new(RecordingRegistry::default());
        let mut registrar = ServiceRegistrar::new(registry.clone());
        registrar.add(registration(EndpointClass::Internal, "http", "/b"));

        // 快照中只有 main 监听器，internal 声明被跳过
        let listeners = vec![ListenerInfo::new("main", "10.0.0.5", 8080, 8080)];

        registrar.server_started(&listeners).await.unwrap();
        assert!(registry.calls.lock().unwrap().is_empty());
    }
}
