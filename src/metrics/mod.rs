//! # Prometheus 指标收集模块
//!
//! 为注册发布流程提供统一的 Prometheus 指标收集能力。

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounterVec, Opts, Registry};

/// 全局指标注册表
pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// 服务注册指标
pub struct RegistrarMetrics {
    /// 成功发布的注册总数
    pub registrations_published_total: IntCounterVec,
    /// 因端点未解析而跳过的注册总数
    pub registrations_skipped_total: IntCounterVec,
    /// 发布失败的注册总数
    pub registration_failures_total: IntCounterVec,
    /// 单次注册发布过程耗时（秒）
    pub pass_duration_seconds: Histogram,
}

impl RegistrarMetrics {
    pub fn new() -> Self {
        let registrations_published_total = IntCounterVec::new(
            Opts::new(
                "registrations_published_total",
                "Total number of service registrations published",
            ),
            &["endpoint_class", "service_type"],
        )
        .expect("Failed to create registrations_published_total metric");

        let registrations_skipped_total = IntCounterVec::new(
            Opts::new(
                "registrations_skipped_total",
                "Total number of registrations skipped because no endpoint resolved",
            ),
            &["endpoint_class"],
        )
        .expect("Failed to create registrations_skipped_total metric");

        let registration_failures_total = IntCounterVec::new(
            Opts::new(
                "registration_failures_total",
                "Total number of registrations that failed to publish",
            ),
            &["endpoint_class"],
        )
        .expect("Failed to create registration_failures_total metric");

        let pass_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "registration_pass_duration_seconds",
                "Registration pass duration in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )
        .expect("Failed to create registration_pass_duration_seconds metric");

        // 注册指标，忽略重复注册错误（测试中可能会重复创建）
        let _ = REGISTRY.register(Box::new(registrations_published_total.clone()));
        let _ = REGISTRY.register(Box::new(registrations_skipped_total.clone()));
        let _ = REGISTRY.register(Box::new(registration_failures_total.clone()));
        let _ = REGISTRY.register(Box::new(pass_duration_seconds.clone()));

        Self {
            registrations_published_total,
            registrations_skipped_total,
            registration_failures_total,
            pass_duration_seconds,
        }
    }
}

impl Default for RegistrarMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// 全局注册指标实例
static METRICS: Lazy<RegistrarMetrics> = Lazy::new(RegistrarMetrics::new);

/// 获取全局注册指标
pub fn registrar_metrics() -> &'static RegistrarMetrics {
    &METRICS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_counters_increment() {
        let metrics = registrar_metrics();
        let before = metrics
            .registrations_published_total
            .with_label_values(&["main", "http"])
            .get();
        metrics
            .registrations_published_total
            .with_label_values(&["main", "http"])
            .inc();
        let after = metrics
            .registrations_published_total
            .with_label_values(&["main", "http"])
            .get();
        assert_eq!(after, before + 1);
    }
}
