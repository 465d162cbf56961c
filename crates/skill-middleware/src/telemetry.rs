//! 全局日志订阅器的安装入口。

use std::sync::OnceLock;

use thiserror::Error;
use tracing::dispatcher;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

/// 未设置 `RUST_LOG` 时使用的过滤指令。
pub const DEFAULT_FILTER: &str = "info";

static INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, Error)]
pub enum TelemetryError {
    /// [`install`] 已被调用过。
    #[error("skill telemetry is already installed")]
    AlreadyInstalled,
    /// 宿主已经设置了其他全局订阅器。
    #[error("a global tracing subscriber has already been set")]
    SubscriberAlreadySet,
    #[error("failed to set the global tracing subscriber")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// 安装 `fmt + EnvFilter` 全局订阅器。
///
/// # 教案式说明
/// - **意图（Why）**：技能宿主大多只需要“把框架日志打到标准输出”，一次调用即可完成。
/// - **契约（What）**：
///   - 过滤指令取自 `RUST_LOG`，缺失或非法时退回 [`DEFAULT_FILTER`]；
///   - 重复调用返回 [`TelemetryError::AlreadyInstalled`]；
///   - 宿主已自行设置订阅器时返回 [`TelemetryError::SubscriberAlreadySet`]，不做覆盖。
pub fn install() -> Result<(), TelemetryError> {
    if INSTALLED.get().is_some() {
        return Err(TelemetryError::AlreadyInstalled);
    }
    if dispatcher::has_been_set() {
        return Err(TelemetryError::SubscriberAlreadySet);
    }

    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter())
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;
    INSTALLED.set(()).map_err(|_| TelemetryError::AlreadyInstalled)
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
