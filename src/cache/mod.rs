use std::sync::Mutex;
use std::time::{Duration, Instant};

/// 进程内单槽缓存：{data, fetched_at} 作为整体在锁内更新
struct Slot<T> {
    data: Option<T>,
    fetched_at: Instant,
}

/// TTL cache for one logical key. Entries are never evicted: an expired
/// entry stays readable through [`TtlCache::get_stale`] as the designated
/// fallback value until the next successful fetch overwrites it.
pub struct TtlCache<T> {
    slot: Mutex<Slot<T>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(Slot {
                data: None,
                fetched_at: Instant::now(),
            }),
            ttl,
        }
    }

    /// 数据存在且未过期时返回，否则 None
    pub fn get_fresh(&self) -> Option<T> {
        let slot = self.slot.lock().unwrap();
        match &slot.data {
            Some(data) if slot.fetched_at.elapsed() < self.ttl => Some(data.clone()),
            _ => None,
        }
    }

    /// 无视 TTL 返回任何已缓存的数据（降级用）
    pub fn get_stale(&self) -> Option<T> {
        self.slot.lock().unwrap().data.clone()
    }

    pub fn set(&self, value: T) {
        let mut slot = self.slot.lock().unwrap();
        slot.data = Some(value);
        slot.fetched_at = Instant::now();
    }
}
