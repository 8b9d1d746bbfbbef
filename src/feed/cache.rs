use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

/// 时间源
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 手动推进的时钟，用于模拟过期
#[cfg(test)]
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    elapsed: Mutex<Duration>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(PoisonError::into_inner);
        *elapsed += by;
    }
}

#[cfg(test)]
impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// 带过期时间的内存缓存
///
/// 条目仅在 `now - stored_at < max_age` 时有效，过期条目在读取时或 [`TtlCache::cleanup`] 中被移除。
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    max_age: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// 默认缓存 5 分钟
    pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(5 * 60);

    pub fn new(max_age: Duration) -> Self {
        Self::with_clock(max_age, Arc::new(SystemClock))
    }

    pub fn with_clock(max_age: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_age,
            clock,
        }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// 写入缓存，覆盖同 key 的旧条目
    pub fn set(&self, key: K, value: V) {
        let stored_at = self.clock.now();
        self.lock().insert(key, CacheEntry { value, stored_at });
    }

    /// 读取未过期的值；过期条目会被顺带删除
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let fresh = match entries.get(key) {
            Some(entry) => self.is_fresh(entry, now),
            None => return None,
        };

        if fresh {
            entries.get(key).map(|entry| entry.value.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    /// 与 [`TtlCache::get`] 相同的有效性判断，但不取出值
    pub fn has(&self, key: &K) -> bool {
        let now = self.clock.now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if self.is_fresh(entry, now) => true,
            Some(_) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }

    /// 清理所有过期条目，返回清理数量
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) < self.max_age);
        before - entries.len()
    }

    /// 有效条目数量（先执行 cleanup）
    pub fn size(&self) -> usize {
        self.cleanup();
        self.lock().len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) < self.max_age
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Send + 'static,
    V: Clone + Send + 'static,
{
    /// 启动定期清理任务
    ///
    /// 任务只持有弱引用，缓存被释放后自动退出；也可以通过返回的句柄 abort。
    pub fn spawn_cleanup(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // 第一次 tick 立即返回
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let evicted = cache.cleanup();
                if evicted > 0 {
                    tracing::debug!("Evicted {} expired cache entries", evicted);
                }
            }
        })
    }
}
