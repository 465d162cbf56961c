//! 可注入的单调时钟。
//!
//! 缓存的陈旧判定依赖“当前时间”，生产环境使用 [`SystemClock`]，测试使用 [`ManualClock`]
//! 手动推进时间，避免 `sleep` 带来的不确定性。

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

pub trait Clock: Send + Sync + 'static {
    /// 返回当前的单调时间点。
    fn now(&self) -> Instant;
}

/// 基于 [`Instant::now`] 的系统时钟。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 手动推进的测试时钟。
///
/// # 契约说明（What）
/// - 克隆共享同一时间线，测试代码保留一份句柄，缓存持有另一份；
/// - 时间只会通过 [`advance`](Self::advance) 前进，从不回退。
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<ManualState>,
}

#[derive(Debug)]
struct ManualState {
    origin: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ManualState {
                origin: Instant::now(),
                elapsed: Mutex::new(Duration::ZERO),
            }),
        }
    }

    pub fn advance(&self, delta: Duration) {
        let mut elapsed = self.inner.elapsed.lock();
        *elapsed = elapsed.saturating_add(delta);
    }

    pub fn elapsed(&self) -> Duration {
        *self.inner.elapsed.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.inner.origin + *self.inner.elapsed.lock()
    }
}
