//! 服务器生命周期对接
//!
//! 启动通知建模为一次性信号：服务器生命周期在全部监听器绑定完成后
//! 发送监听器快照，注册器收到后执行唯一一次注册发布。
//! 多次触发不在契约内，通道被消费后自然失效。

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::config::ListenerConfig;
use crate::endpoint::ListenerInfo;
use crate::error::{RegistrarError, RegistrarResult};
use crate::registrar::ServiceRegistrar;

/// 启动信号发送端（由服务器生命周期持有）
pub struct StartupNotifier {
    tx: oneshot::Sender<Vec<ListenerInfo>>,
}

impl StartupNotifier {
    /// 发送启动通知
    ///
    /// 消费自身，保证信号只能发送一次。
    pub fn notify(self, listeners: Vec<ListenerInfo>) {
        if self.tx.send(listeners).is_err() {
            warn!("startup signal receiver dropped, registrations will not be published");
        }
    }
}

/// 启动信号接收端（由注册发布任务持有）
pub struct StartupSignal {
    rx: oneshot::Receiver<Vec<ListenerInfo>>,
}

/// 创建一次性启动信号通道
pub fn startup_channel() -> (StartupNotifier, StartupSignal) {
    let (tx, rx) = oneshot::channel();
    (StartupNotifier { tx }, StartupSignal { rx })
}

impl ServiceRegistrar {
    /// 等待启动信号并执行注册发布
    ///
    /// 发布过程中的致命错误（Main 端点解析失败）只记录日志，不向外传播：
    /// 注册失败不应中断服务器运行，需要重试时由运维重启进程。
    pub async fn run_on_startup(&self, signal: StartupSignal) {
        match signal.rx.await {
            Ok(listeners) => {
                if let Err(e) = self.server_started(&listeners).await {
                    error!(error = %e, "service registration pass aborted");
                } else {
                    info!("✅ 服务注册发布完成");
                }
            }
            Err(_) => {
                warn!("startup notifier dropped before server start, skipping registration");
            }
        }
    }
}

/// 按配置绑定监听器并生成快照
///
/// 端口 0 由操作系统分配实际端口，快照中记录绑定后的真实端口。
/// 返回的 `TcpListener` 交由服务器生命周期接管。
pub async fn bind_listeners(
    configs: &[ListenerConfig],
) -> RegistrarResult<Vec<(TcpListener, ListenerInfo)>> {
    let mut bound = Vec::with_capacity(configs.len());
    for config in configs {
        let bind_host = if config.address.is_empty() {
            "0.0.0.0"
        } else {
            config.address.as_str()
        };

        let listener = TcpListener::bind((bind_host, config.port))
            .await
            .map_err(|e| {
                RegistrarError::ListenerUnbound(format!(
                    "cannot bind listener {} on {}:{}: {}",
                    config.name, bind_host, config.port, e
                ))
            })?;
        let local_addr = listener.local_addr().map_err(|e| {
            RegistrarError::ListenerUnbound(format!(
                "cannot read local address of listener {}: {}",
                config.name, e
            ))
        })?;

        info!(listener = %config.name, addr = %local_addr, "✅ 监听器绑定完成");
        bound.push((
            listener,
            ListenerInfo::from_bound(&config.name, &config.address, config.port, local_addr),
        ));
    }
    Ok(bound)
}
