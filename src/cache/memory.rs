//! 测试用的内存键值存储，支持手动推进时钟和故障注入。

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

use crate::cache::{CacheError, KeyValueStore};

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, u64)>>,
    now: AtomicU64,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
}

fn injected(what: &'static str) -> CacheError {
    CacheError::Redis(redis::RedisError::from((redis::ErrorKind::IoError, what)))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 推进内部时钟，过期条目随后视为不存在
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    /// 让单个键立即过期
    pub fn expire_now(&self, key: &str) {
        let now = self.now.load(Ordering::SeqCst);
        if let Some(entry) = self.entries.lock().unwrap().get_mut(key) {
            entry.1 = now;
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        let now = self.now.load(Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .is_some_and(|(_, expires_at)| *expires_at > now)
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone())
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), u64::MAX));
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = self.now.load(Ordering::SeqCst);
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(value, _)| value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected("injected write failure"));
        }
        let expires_at = self.now.load(Ordering::SeqCst).saturating_add(ttl_secs);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(injected("injected delete failure"));
        }
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn incr_window(&self, key: &str, window_secs: u64) -> Result<u64, CacheError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(injected("injected write failure"));
        }
        let now = self.now.load(Ordering::SeqCst);
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| ("0".to_string(), now + window_secs));
        if entry.1 <= now {
            *entry = ("0".to_string(), now + window_secs);
        }
        let count = entry.0.parse::<u64>().unwrap_or(0) + 1;
        entry.0 = count.to_string();
        Ok(count)
    }
}
