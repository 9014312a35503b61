use crate::domain::model::{QueryKey, SkipOption};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// skip 資料來源（HTTP 或測試替身）
#[async_trait]
pub trait SkipSource: Send + Sync {
    async fn fetch_by_location(&self, key: &QueryKey) -> Result<Vec<SkipOption>>;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn timeout_ms(&self) -> u64;
    fn stale_time(&self) -> Duration;
    fn image_base_url(&self) -> &str;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// 手動推進的時鐘，讓快取過期可以在測試中重現
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.origin + offset
    }
}
