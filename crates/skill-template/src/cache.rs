//! 有界模板缓存。
//!
//! ## 语义
//! - 容量以字节计，等于所持非陈旧条目的内容大小之和；
//! - 写入时若剩余容量不足，按插入顺序（最旧优先）逐个淘汰，直至放得下或缓存为空；
//!   单个条目大于总容量时，淘汰全部后丢弃该条目，计数回到 0；
//! - 读取时发现条目存活时间超过阈值，移除它并扣减计数，本次返回未命中；
//! - 所有读写都在同一把锁内完成，计数与条目集合不会被观察到不一致。

use std::time::{Duration, Instant};

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::content::TemplateContentData;

/// 默认容量：5,000,000 字节。
pub const DEFAULT_CAPACITY_BYTES: u64 = 5_000_000;
/// 默认存活时间：24 小时（毫秒）。
pub const DEFAULT_TIME_TO_LIVE_MS: u64 = 24 * 60 * 60 * 1000;

/// 模板缓存契约，加载器通过它共享已读取的模板。
pub trait TemplateCache: Send + Sync {
    fn get(&self, identifier: &str) -> Option<TemplateContentData>;

    fn put(&self, identifier: &str, template: TemplateContentData);
}

/// 缓存配置，可嵌入技能设置文件的 `[template_cache]` 段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateCacheConfig {
    pub capacity_bytes: u64,
    pub time_to_live_ms: u64,
}

impl TemplateCacheConfig {
    pub fn time_to_live(&self) -> Duration {
        Duration::from_millis(self.time_to_live_ms)
    }
}

impl Default for TemplateCacheConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
            time_to_live_ms: DEFAULT_TIME_TO_LIVE_MS,
        }
    }
}

#[derive(Debug)]
struct CachedTemplate {
    template: TemplateContentData,
    inserted_at: Instant,
    size: u64,
}

/// 锁内状态。`entries` 的迭代顺序即插入顺序。
#[derive(Debug, Default)]
struct CacheState {
    entries: IndexMap<String, CachedTemplate>,
    used_bytes: u64,
}

/// 容量与存活时间双重受限的并发模板缓存。
///
/// # 教案式说明
/// - **意图 (Why)**：模板文件在技能生命周期内几乎不变，缓存可避免每个请求都读磁盘；
///   容量上限防止大量 locale 变体撑爆内存，存活时间让热更新的模板最终生效。
/// - **契约 (What)**：
///   - 多线程共享安全，所有操作持有同一把 [`parking_lot::Mutex`]；
///   - 陈旧条目只在被读取或观察计数时移除，不存在后台清理；
///   - 同一标识重复写入时，先释放旧条目的容量，新条目排到插入顺序末尾。
/// - **风险 (Trade-offs)**：单锁在极高并发下会成为热点；模板读取频率远低于请求处理本身，
///   这一代价可以接受。
#[derive(Debug)]
pub struct BoundedTemplateCache<C: Clock = SystemClock> {
    capacity_bytes: u64,
    time_to_live: Duration,
    clock: C,
    state: Mutex<CacheState>,
}

impl BoundedTemplateCache<SystemClock> {
    pub fn new(config: TemplateCacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for BoundedTemplateCache<SystemClock> {
    fn default() -> Self {
        Self::new(TemplateCacheConfig::default())
    }
}

impl<C: Clock> BoundedTemplateCache<C> {
    pub fn with_clock(config: TemplateCacheConfig, clock: C) -> Self {
        Self {
            capacity_bytes: config.capacity_bytes,
            time_to_live: config.time_to_live(),
            clock,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    /// 当前占用的字节数。观察前先移除已陈旧的条目。
    pub fn current_capacity(&self) -> u64 {
        let now = self.clock.now();
        let mut state = self.state.lock();
        self.purge_stale(&mut state, now);
        state.used_bytes
    }

    /// 当前持有的非陈旧条目数。
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        let mut state = self.state.lock();
        self.purge_stale(&mut state, now);
        state.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按插入顺序列出当前标识，主要用于诊断与测试。
    pub fn identifiers(&self) -> Vec<String> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        self.purge_stale(&mut state, now);
        state.entries.keys().cloned().collect()
    }

    fn is_stale(&self, entry: &CachedTemplate, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) > self.time_to_live
    }

    fn purge_stale(&self, state: &mut CacheState, now: Instant) {
        let used_bytes = &mut state.used_bytes;
        state.entries.retain(|identifier, entry| {
            if self.is_stale(entry, now) {
                *used_bytes -= entry.size;
                debug!(identifier = %identifier, "template is out of date, removing");
                false
            } else {
                true
            }
        });
    }
}

impl<C: Clock> TemplateCache for BoundedTemplateCache<C> {
    fn get(&self, identifier: &str) -> Option<TemplateContentData> {
        let now = self.clock.now();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let entry = state.entries.get(identifier)?;
        if !self.is_stale(entry, now) {
            return Some(entry.template.clone());
        }

        if let Some(stale) = state.entries.shift_remove(identifier) {
            state.used_bytes -= stale.size;
        }
        debug!(identifier, "template is out of date, removing");
        None
    }

    fn put(&self, identifier: &str, template: TemplateContentData) {
        let size = template.size();
        let now = self.clock.now();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if let Some(previous) = state.entries.shift_remove(identifier) {
            state.used_bytes -= previous.size;
        }

        while state.used_bytes + size > self.capacity_bytes {
            let Some((evicted, entry)) = state.entries.shift_remove_index(0) else {
                break;
            };
            state.used_bytes -= entry.size;
            debug!(identifier = %evicted, size = entry.size, "evicting template to free capacity");
        }

        if size > self.capacity_bytes {
            warn!(
                identifier,
                size,
                capacity = self.capacity_bytes,
                "template is larger than the whole cache, not caching it"
            );
            return;
        }

        state.entries.insert(
            identifier.to_owned(),
            CachedTemplate {
                template,
                inserted_at: now,
                size,
            },
        );
        state.used_bytes += size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn template(identifier: &str, size: usize) -> TemplateContentData {
        TemplateContentData::new(identifier, vec![b'x'; size])
    }

    fn cache(capacity_bytes: u64, ttl_ms: u64) -> (BoundedTemplateCache<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let cache = BoundedTemplateCache::with_clock(
            TemplateCacheConfig {
                capacity_bytes,
                time_to_live_ms: ttl_ms,
            },
            clock.clone(),
        );
        (cache, clock)
    }

    #[test]
    fn defaults_match_documented_limits() {
        let config = TemplateCacheConfig::default();
        assert_eq!(config.capacity_bytes, 5_000_000);
        assert_eq!(config.time_to_live(), Duration::from_secs(24 * 60 * 60));
    }

    #[test]
    fn evicts_oldest_first_until_new_entry_fits() {
        let (cache, _clock) = cache(10, 60_000);
        cache.put("a", template("a", 4));
        cache.put("b", template("b", 4));
        cache.put("c", template("c", 4));

        assert_eq!(cache.identifiers(), vec!["b".to_owned(), "c".to_owned()]);
        assert_eq!(cache.current_capacity(), 8);
        assert!(cache.get("a").is_none(), "最旧条目应被淘汰");
    }

    #[test]
    fn oversized_entry_empties_cache_and_is_not_retained() {
        let (cache, _clock) = cache(10, 60_000);
        cache.put("a", template("a", 3));
        cache.put("b", template("b", 3));
        cache.put("huge", template("huge", 11));

        assert!(cache.is_empty(), "放不下的条目会先清空缓存");
        assert_eq!(cache.current_capacity(), 0);
        assert!(cache.get("huge").is_none());
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn stale_read_removes_entry_and_releases_its_size() {
        let (cache, clock) = cache(100, 1_000);
        cache.put("old", template("old", 7));
        clock.advance(Duration::from_millis(600));
        cache.put("young", template("young", 5));
        let before = 12;

        clock.advance(Duration::from_millis(500));
        assert!(cache.get("old").is_none(), "超过存活时间的条目应视为未命中");
        assert!(cache.get("old").is_none(), "再次读取仍未命中");
        assert_eq!(cache.current_capacity(), before - 7);
        assert!(cache.get("young").is_some(), "未过期条目不受影响");
    }

    #[test]
    fn reput_replaces_previous_size() {
        let (cache, _clock) = cache(100, 60_000);
        cache.put("a", template("a", 10));
        cache.put("b", template("b", 10));
        cache.put("a", template("a", 4));

        assert_eq!(cache.current_capacity(), 14);
        assert_eq!(cache.identifiers(), vec!["b".to_owned(), "a".to_owned()]);
        assert_eq!(cache.get("a").map(|t| t.size()), Some(4));
    }
}
