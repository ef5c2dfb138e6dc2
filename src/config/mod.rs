//! Flare Registrar 配置模块
//!
//! 该模块提供应用配置管理功能，包括：
//! - 配置文件加载和解析（TOML）
//! - 监听器与注册声明的配置化定义
//! - 日志配置

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

use crate::endpoint::EndpointClass;
use crate::error::{RegistrarError, RegistrarResult};
use crate::registration::{Registration, ServiceType};

/// 全局应用配置实例，使用 OnceLock 确保只初始化一次
static APP_CONFIG: OnceLock<RegistrarAppConfig> = OnceLock::new();

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 是否输出 target
    #[serde(default)]
    pub with_target: bool,
    /// 是否输出线程 ID
    #[serde(default)]
    pub with_thread_ids: bool,
    /// 是否输出文件名
    #[serde(default)]
    pub with_file: bool,
    /// 是否输出行号
    #[serde(default)]
    pub with_line_number: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            with_target: false,
            with_thread_ids: false,
            with_file: false,
            with_line_number: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 监听器配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListenerConfig {
    /// 监听器名称（用于端点分类，如 "main" / "internal"）
    pub name: String,
    /// 监听地址（为空时表示未指定，发布时替换为本机规范主机名）
    #[serde(default)]
    pub address: String,
    /// 监听端口（0 表示由操作系统分配临时端口）
    #[serde(default)]
    pub port: u16,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServerConfig {
    /// 监听器列表
    #[serde(default)]
    pub listeners: Vec<ListenerConfig>,
}

/// 注册声明配置
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
    /// 端点类别（"main" / "internal"）
    pub endpoint: String,
    /// 服务类型（发布 URL 的 scheme）
    pub service_type: String,
    /// URL 路径
    #[serde(default)]
    pub url_path: Option<String>,
    /// 服务属性
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl RegistrationConfig {
    /// 转换为注册声明
    pub fn to_registration(&self) -> RegistrarResult<Registration> {
        let endpoint: EndpointClass = self.endpoint.parse()?;
        let service_type = ServiceType::new(self.service_type.clone())?;
        let properties = if self.properties.is_empty() {
            None
        } else {
            Some(self.properties.clone())
        };
        Ok(Registration::new(
            endpoint,
            service_type,
            self.url_path.clone(),
            properties,
        ))
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RegistrarAppConfig {
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 注册声明列表
    #[serde(default)]
    pub registrations: Vec<RegistrationConfig>,
}

impl RegistrarAppConfig {
    /// 从 TOML 文本解析配置
    pub fn from_toml(text: &str) -> RegistrarResult<Self> {
        toml::from_str(text)
            .map_err(|e| RegistrarError::Config(format!("invalid config format: {}", e)))
    }

    /// 按声明顺序构造全部注册声明
    pub fn declared_registrations(&self) -> RegistrarResult<Vec<Registration>> {
        self.registrations
            .iter()
            .map(RegistrationConfig::to_registration)
            .collect()
    }
}

/// 从文件加载配置
fn load_from_file(path: &Path) -> anyhow::Result<RegistrarAppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read config file: {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("invalid config format: {}", path.display()))?;
    Ok(config)
}

/// 依次尝试候选路径加载配置，全部失败时回退到默认配置
fn load_with_fallback(candidates: &[PathBuf]) -> RegistrarAppConfig {
    for candidate in candidates {
        if candidate.exists() {
            match load_from_file(candidate) {
                Ok(config) => return config,
                Err(e) => warn!("failed to load config {}: {}", candidate.display(), e),
            }
        }
    }
    warn!("no config file found, using default configuration");
    RegistrarAppConfig::default()
}

/// 加载配置
///
/// 路径优先级：
/// 1. 显式传入的路径
/// 2. 环境变量 FLARE_REGISTRAR_CONFIG
/// 3. 默认候选路径 config.toml / config/registrar.toml
pub fn load_config(path: Option<&str>) -> &'static RegistrarAppConfig {
    let candidates: Vec<PathBuf> = match path {
        Some(p) => vec![PathBuf::from(p)],
        None => match env::var("FLARE_REGISTRAR_CONFIG") {
            Ok(p) => vec![PathBuf::from(p)],
            Err(_) => vec![
                PathBuf::from("config.toml"),
                PathBuf::from("config/registrar.toml"),
            ],
        },
    };

    APP_CONFIG.get_or_init(|| load_with_fallback(&candidates))
}

/// 获取全局配置
///
/// 未显式加载时按默认候选路径加载。
pub fn app_config() -> &'static RegistrarAppConfig {
    match APP_CONFIG.get() {
        Some(config) => config,
        None => load_config(None),
    }
}
